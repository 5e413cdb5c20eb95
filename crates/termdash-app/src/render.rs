//! Plain-text view rendering.
//!
//! Views are compiled once at startup (templates and data paths are parsed
//! then, so a broken view stops the dashboard from starting) and drawn to
//! any `Write` sink on request.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use serde_json::Value;
use termdash_eval::{PathEvaluator, TemplateEvaluator};
use termdash_terminal::AppContext;
use termdash_types::config::{PageConfig, ViewConfig};
use termdash_types::error::{DashError, Result};

/// Something that can draw a view from session state.
pub trait ViewRenderer {
    /// Draw the view with `view_id`. Unknown ids are ignored.
    fn draw_view(&mut self, view_id: &str, ctx: &dyn AppContext) -> io::Result<()>;

    /// Draw every view of `page`, preceded by a page banner.
    fn draw_page(&mut self, page: &PageConfig, ctx: &dyn AppContext) -> io::Result<()>;
}

struct Column {
    header: TemplateEvaluator,
    data: TemplateEvaluator,
}

struct FormField {
    label: TemplateEvaluator,
    value: TemplateEvaluator,
    vertical: bool,
}

enum ViewBody {
    Table {
        rows: Option<PathEvaluator>,
        columns: Vec<Column>,
        select: Option<TemplateEvaluator>,
    },
    Form(Vec<FormField>),
    Static(String),
    Placeholder,
}

struct CompiledView {
    title: String,
    body: ViewBody,
}

impl CompiledView {
    fn compile(view: &ViewConfig) -> Result<Self> {
        let body = if let Some(table) = view.table.as_ref().filter(|t| !t.columns.is_empty()) {
            let columns = table
                .columns
                .iter()
                .map(|c| {
                    Ok(Column {
                        header: TemplateEvaluator::new(&c.header_expression)?,
                        data: TemplateEvaluator::new(&c.data_expression)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ViewBody::Table {
                rows: view.data_path.as_deref().map(PathEvaluator::new).transpose()?,
                columns,
                select: table
                    .select_expression
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .map(TemplateEvaluator::new)
                    .transpose()?,
            }
        } else if let Some(form) = view.form.as_ref().filter(|f| !f.fields.is_empty()) {
            let fields = form
                .fields
                .iter()
                .map(|f| {
                    Ok(FormField {
                        label: TemplateEvaluator::new(&f.label_expression)?,
                        value: TemplateEvaluator::new(&f.value_expression)?,
                        vertical: f.orientation == "v",
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ViewBody::Form(fields)
        } else if let Some(text) = &view.static_text {
            ViewBody::Static(text.clone())
        } else {
            ViewBody::Placeholder
        };
        Ok(Self {
            title: format!("{} ({})", view.name, view.shortcut),
            body,
        })
    }
}

/// Renders views as text blocks: a title line, then table rows joined with
/// ` | ` or form fields.
pub struct TextRenderer<W: Write> {
    out: W,
    views: BTreeMap<String, CompiledView>,
    /// Rows of each table as last drawn, for row selection.
    rows: HashMap<String, Vec<Value>>,
}

impl<W: Write> TextRenderer<W> {
    /// Compile every view of every page.
    pub fn new(pages: &[PageConfig], out: W) -> Result<Self> {
        let mut views = BTreeMap::new();
        for view in pages.iter().flat_map(|p| &p.views) {
            let compiled = CompiledView::compile(view)
                .map_err(|e| DashError::Config(format!("view '{}': {e}", view.id)))?;
            views.insert(view.id.clone(), compiled);
        }
        Ok(Self {
            out,
            views,
            rows: HashMap::new(),
        })
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Render the select expression of `view_id` against its `index`-th row
    /// as last drawn. Returns the command line to dispatch.
    pub fn select_row(&self, view_id: &str, index: usize, ctx: &dyn AppContext) -> Option<String> {
        let view = self.views.get(view_id)?;
        let ViewBody::Table {
            select: Some(select),
            ..
        } = &view.body
        else {
            log::debug!("View [{view_id}] has no select expression");
            return None;
        };
        let row = self.rows.get(view_id)?.get(index)?;
        let line = select.render_with_row(row, ctx.data_map());
        log::debug!("Selected row {index} of [{view_id}]: [{line}]");
        Some(line).filter(|l| !l.trim().is_empty())
    }

    fn table_rows(rows: Option<&PathEvaluator>, ctx: &dyn AppContext) -> Vec<Value> {
        let Some(path) = rows else {
            return Vec::new();
        };
        match path.evaluate_with_context(ctx.data_map()) {
            Ok(Value::Array(items)) => items,
            Ok(Value::Null) => Vec::new(),
            Ok(item) => vec![item],
            Err(e) => {
                log::debug!("No rows for {}: {e}", path.expression());
                Vec::new()
            },
        }
    }
}

impl<W: Write> ViewRenderer for TextRenderer<W> {
    fn draw_view(&mut self, view_id: &str, ctx: &dyn AppContext) -> io::Result<()> {
        let Some(view) = self.views.get(view_id) else {
            log::warn!("No view [{view_id}] to draw");
            return Ok(());
        };
        let focused = ctx.focused_view().is_some_and(|v| v.id == view_id);
        writeln!(self.out, "{} {}", if focused { "*" } else { "-" }, view.title)?;

        let data = ctx.data_map();
        match &view.body {
            ViewBody::Table { rows, columns, .. } => {
                let headers: Vec<String> = columns
                    .iter()
                    .map(|c| c.header.render_with_context(data))
                    .collect();
                writeln!(self.out, "{}", headers.join(" | "))?;
                let items = Self::table_rows(rows.as_ref(), ctx);
                for (i, row) in items.iter().enumerate() {
                    let cells: Vec<String> = columns
                        .iter()
                        .map(|c| c.data.render_with_row(row, data))
                        .collect();
                    writeln!(self.out, "{i:>3}  {}", cells.join(" | "))?;
                }
                self.rows.insert(view_id.to_string(), items);
            },
            ViewBody::Form(fields) => {
                for field in fields {
                    let label = field.label.render_with_context(data);
                    let value = field.value.render_with_context(data);
                    if field.vertical {
                        writeln!(self.out, "{label}\n  {value}")?;
                    } else {
                        writeln!(self.out, "{label}  {value}")?;
                    }
                }
            },
            ViewBody::Static(text) => writeln!(self.out, "{text}")?,
            ViewBody::Placeholder => {},
        }
        self.out.flush()
    }

    fn draw_page(&mut self, page: &PageConfig, ctx: &dyn AppContext) -> io::Result<()> {
        writeln!(self.out, "== {} ({}) ==", page.name, page.shortcut)?;
        for view in &page.views {
            self.draw_view(&view.id, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termdash_terminal::Session;
    use termdash_types::config::ApplicationConfig;

    const CONFIG: &str = r#"
pages:
  - id: main
    name: Main
    shortcut: m
    views:
      - id: courses
        name: Courses
        shortcut: c
        dataPath: $.Data.courses
        table:
          columns:
            - headerExpression: Code
              dataExpression: "{{ Row.code }}"
            - headerExpression: Title
              dataExpression: "{{ Row.title }}"
          selectExpression: "show courses {{ Row.code }}"
      - id: summary
        name: Summary
        shortcut: s
        form:
          fields:
            - labelExpression: Selected
              valueExpression: "{{ Context.selected[0].code }}"
            - labelExpression: Count
              valueExpression: "{{ Context.courses | length }}"
              orientation: v
      - id: about
        name: About
        shortcut: a
        static: Course catalog
      - id: empty
        name: Empty
        shortcut: e
data:
  courses:
    - {code: ENG-256, title: Poetry}
    - {code: MAT-101, title: Algebra}
"#;

    fn setup() -> (TextRenderer<Vec<u8>>, Session) {
        let config = ApplicationConfig::from_yaml(CONFIG).unwrap();
        let renderer = TextRenderer::new(&config.pages, Vec::new()).unwrap();
        (renderer, Session::from_config(&config))
    }

    fn text(r: &TextRenderer<Vec<u8>>) -> String {
        String::from_utf8(r.output().clone()).unwrap()
    }

    #[test]
    fn table_draws_header_and_rows() {
        let (mut r, s) = setup();
        r.draw_view("courses", &s).unwrap();
        let out = text(&r);
        assert!(out.starts_with("- Courses (c)\n"));
        assert!(out.contains("Code | Title\n"));
        assert!(out.contains("  0  ENG-256 | Poetry\n"));
        assert!(out.contains("  1  MAT-101 | Algebra\n"));
    }

    #[test]
    fn focused_view_is_marked() {
        let (mut r, mut s) = setup();
        s.focus_on_view_id("courses");
        r.draw_view("courses", &s).unwrap();
        assert!(text(&r).starts_with("* Courses (c)"));
    }

    #[test]
    fn form_draws_fields() {
        let (mut r, mut s) = setup();
        s.register_data("selected", json!([{"code": "MAT-101"}]));
        r.draw_view("summary", &s).unwrap();
        let out = text(&r);
        assert!(out.contains("Selected  MAT-101\n"));
        assert!(out.contains("Count\n  2\n"));
    }

    #[test]
    fn form_with_missing_data_draws_blank_value() {
        let (mut r, s) = setup();
        r.draw_view("summary", &s).unwrap();
        assert!(text(&r).contains("Selected  \n"));
    }

    #[test]
    fn static_and_placeholder_views() {
        let (mut r, s) = setup();
        r.draw_view("about", &s).unwrap();
        r.draw_view("empty", &s).unwrap();
        let out = text(&r);
        assert!(out.contains("Course catalog\n"));
        assert!(out.ends_with("- Empty (e)\n"));
    }

    #[test]
    fn unknown_view_is_ignored() {
        let (mut r, s) = setup();
        r.draw_view("ghost", &s).unwrap();
        assert!(text(&r).is_empty());
    }

    #[test]
    fn page_draws_all_views() {
        let (mut r, s) = setup();
        let page = s.current_page().unwrap().clone();
        r.draw_page(&page, &s).unwrap();
        let out = text(&r);
        assert!(out.starts_with("== Main (m) ==\n"));
        assert!(out.contains("About (a)"));
    }

    #[test]
    fn select_row_renders_command() {
        let (mut r, s) = setup();
        assert!(r.select_row("courses", 1, &s).is_none());
        r.draw_view("courses", &s).unwrap();
        assert_eq!(
            r.select_row("courses", 1, &s).as_deref(),
            Some("show courses MAT-101")
        );
        assert!(r.select_row("courses", 9, &s).is_none());
        assert!(r.select_row("about", 0, &s).is_none());
    }

    #[test]
    fn broken_template_fails_compile() {
        let config = ApplicationConfig::from_yaml(
            "pages: [{id: p, views: [{id: v, form: {fields: [{labelExpression: '{{ x'}]}}]}]\n",
        )
        .unwrap();
        let err = TextRenderer::new(&config.pages, Vec::new()).err().unwrap();
        assert!(matches!(err, DashError::Config(_)));
    }

    #[test]
    fn broken_data_path_fails_compile() {
        let config = ApplicationConfig::from_yaml(
            "pages: [{id: p, views: [{id: v, dataPath: '$[', table: {columns: [{headerExpression: h}]}}]}]\n",
        )
        .unwrap();
        assert!(TextRenderer::new(&config.pages, Vec::new()).is_err());
    }
}
