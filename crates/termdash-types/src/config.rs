//! Dashboard configuration loaded from YAML.
//!
//! A dashboard is described by a master file plus optional sibling
//! directories:
//!
//! ```text
//! master.yml        name, pages, commands, data
//! pages/*.yaml      each file is a list of pages
//! commands/*.yaml   each file is a list of commands
//! data/*.{yaml,json} each file is one static dataset, keyed by file name
//! ```
//!
//! Directory contents are merged after the master file's own entries, in
//! sorted path order, so command registration order is reproducible.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DashError, Result};

/// Result type name that makes a command produce a JSON result.
pub const RESULT_TYPE_JSON: &str = "json";

/// Data key holding the current command arguments (`Context.args` in
/// templates). Reserved: no dataset or result may be stored under it.
pub const ARGS_KEY: &str = "args";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
    /// Static datasets registered into the session at startup.
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

/// A page: a named, shortcut-addressable group of views.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shortcut: String,
    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

/// A view on a page. Exactly one of `table`, `form` or `static_text` decides
/// how it is drawn; a view with none of them is a blank placeholder.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shortcut: String,
    /// JSONPath selecting the rows of a table view, evaluated against
    /// `{"Data": <session data>}`.
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub table: Option<TableConfig>,
    #[serde(default)]
    pub form: Option<FormConfig>,
    #[serde(default, rename = "static")]
    pub static_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default)]
    pub columns: Vec<TableColumnConfig>,
    /// Template rendered against the selected row; the output is dispatched
    /// as a command line.
    #[serde(default)]
    pub select_expression: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableColumnConfig {
    #[serde(default)]
    pub header_expression: String,
    #[serde(default)]
    pub data_expression: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    #[serde(default)]
    pub fields: Vec<FormFieldConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label_expression: String,
    #[serde(default)]
    pub value_expression: String,
    /// `v` for label above value, anything else for side by side.
    #[serde(default)]
    pub orientation: String,
}

/// Help text attached to a command.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HelpConfig {
    #[serde(default)]
    pub syntax: String,
    #[serde(default)]
    pub description: String,
}

/// A configured command. Exactly one of `shell_expression` and `source_id`
/// must be set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandConfig {
    pub name: String,
    pub regex: String,
    /// `"json"` to produce a JSON result, anything else for no result.
    #[serde(default)]
    pub result_type: String,
    /// Data key the result is stored under.
    #[serde(default)]
    pub result_key: String,
    #[serde(default)]
    pub filter_expression: Option<String>,
    /// Template producing the process command line.
    #[serde(default)]
    pub shell_expression: Option<String>,
    /// Data key read by pass-through commands.
    #[serde(default, alias = "passthruSourceId")]
    pub source_id: Option<String>,
    /// View refreshed and focused after the result is stored.
    #[serde(default)]
    pub view_id: Option<String>,
    /// Kill the shell process after this many milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub help: HelpConfig,
}

impl CommandConfig {
    /// Whether the command produces a JSON result.
    pub fn is_json_result(&self) -> bool {
        self.result_type == RESULT_TYPE_JSON
    }

    /// Check the structural rules a command definition must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DashError::Config("command without a name".into()));
        }
        if self.regex.is_empty() {
            return Err(DashError::Config(format!(
                "command '{}': missing regex",
                self.name
            )));
        }
        if self.is_json_result() && self.result_key.is_empty() {
            return Err(DashError::Config(format!(
                "command '{}': a json result needs a resultKey",
                self.name
            )));
        }
        if self.result_key == ARGS_KEY {
            return Err(DashError::Config(format!(
                "command '{}': resultKey '{ARGS_KEY}' is reserved",
                self.name
            )));
        }
        let shell = non_empty(&self.shell_expression);
        let source = non_empty(&self.source_id);
        match (shell, source) {
            (Some(_), Some(_)) => Err(DashError::Config(format!(
                "command '{}': shellExpression and sourceId are mutually exclusive",
                self.name
            ))),
            (None, None) => Err(DashError::Config(format!(
                "command '{}': needs a shellExpression or a sourceId",
                self.name
            ))),
            _ => Ok(()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl ApplicationConfig {
    /// Parse a single YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load the master file at `path` and merge the `pages/`, `commands/`
    /// and `data/` directories next to it.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading configuration {}", path.display());
        let text = read_file(path)?;
        let mut app = Self::from_yaml(&text)
            .map_err(|e| DashError::Config(format!("{}: {e}", path.display())))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));

        for file in config_files(&base.join("pages"), &["yaml", "yml"])? {
            let pages: Vec<PageConfig> = parse_yaml_file(&file)?;
            log::debug!("{} page(s) from {}", pages.len(), file.display());
            app.pages.extend(pages);
        }
        for file in config_files(&base.join("commands"), &["yaml", "yml"])? {
            let commands: Vec<CommandConfig> = parse_yaml_file(&file)?;
            log::debug!("{} command(s) from {}", commands.len(), file.display());
            app.commands.extend(commands);
        }
        for file in config_files(&base.join("data"), &["yaml", "yml", "json"])? {
            let key = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let value = load_data_file(&file)?;
            app.data.insert(key, value);
        }

        app.validate()?;
        log::info!(
            "Loaded '{}': {} page(s), {} command(s), {} dataset(s)",
            app.name,
            app.pages.len(),
            app.commands.len(),
            app.data.len()
        );
        Ok(app)
    }

    /// Check commands and the uniqueness of page and view ids.
    pub fn validate(&self) -> Result<()> {
        for cmd in &self.commands {
            cmd.validate()?;
        }
        if self.data.contains_key(ARGS_KEY) {
            return Err(DashError::Config(format!(
                "dataset '{ARGS_KEY}' is reserved for command arguments"
            )));
        }
        let mut page_ids = HashSet::new();
        let mut view_ids = HashSet::new();
        for page in &self.pages {
            if !page_ids.insert(page.id.as_str()) {
                return Err(DashError::Config(format!("duplicate page id '{}'", page.id)));
            }
            for view in &page.views {
                if !view_ids.insert(view.id.as_str()) {
                    return Err(DashError::Config(format!("duplicate view id '{}'", view.id)));
                }
            }
        }
        Ok(())
    }
}

/// Load a standalone dataset. `.json` files are parsed as JSON, everything
/// else as YAML.
pub fn load_data_file(path: &Path) -> Result<Value> {
    let text = read_file(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(serde_yaml::from_str(&text)?)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| DashError::Config(format!("{}: {e}", path.display())))
}

fn parse_yaml_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_file(path)?;
    serde_yaml::from_str(&text).map_err(|e| DashError::Config(format!("{}: {e}", path.display())))
}

/// Every file below `dir` (recursively) with one of `extensions`, sorted by
/// path. A missing directory yields no files.
fn config_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_files(dir, extensions, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, extensions: &[&str], out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, extensions, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e))
        {
            out.push(path);
        }
    }
    Ok(())
}
