//! Text templates over session data.
//!
//! Templates use MiniJinja syntax. The session data map is exposed as
//! `Context`, and row-level templates additionally see the item being drawn
//! as `Row`:
//!
//! ```text
//! cat ./data/{{ Context.args[0] }}
//! {{ Row.code }} - {{ Context["selected"][0].title }}
//! ```

use std::fmt;

use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;
use serde_json::Value;
use termdash_types::error::{DashError, Result};

use crate::DataMap;

const TEMPLATE_NAME: &str = "template";

/// A template compiled once from configuration and rendered many times.
pub struct TemplateEvaluator {
    source: String,
    env: Environment<'static>,
}

impl TemplateEvaluator {
    /// Compile `expression`. Syntax errors are configuration errors.
    pub fn new(expression: &str) -> Result<Self> {
        let mut env = Environment::new();
        // Missing keys must fail the render so they can be reported.
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template_owned(TEMPLATE_NAME, expression.to_string())
            .map_err(|e| DashError::Template(format!("{expression:?}: {e}")))?;
        Ok(Self {
            source: expression.to_string(),
            env,
        })
    }

    /// The template source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render with the session data bound to `Context`.
    pub fn render_with_context(&self, data: &DataMap) -> String {
        self.render(context! { Context => data })
    }

    /// Render a row-level template: `Row` is the current item and `Context`
    /// the session data.
    pub fn render_with_row(&self, row: &Value, data: &DataMap) -> String {
        self.render(context! { Context => data, Row => row })
    }

    /// Render against an arbitrary serializable root. Failures are logged and
    /// yield an empty string.
    pub fn render<S: Serialize>(&self, root: S) -> String {
        match self.try_render(root) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{e}");
                String::new()
            },
        }
    }

    /// Render against an arbitrary serializable root, reporting failures.
    pub fn try_render<S: Serialize>(&self, root: S) -> Result<String> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| DashError::Template(e.to_string()))?;
        template
            .render(root)
            .map_err(|e| DashError::Template(format!("rendering {:?}: {e}", self.source)))
    }
}

impl fmt::Debug for TemplateEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEvaluator")
            .field("source", &self.source)
            .finish()
    }
}
