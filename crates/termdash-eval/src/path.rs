//! JSONPath extraction.
//!
//! Paths are evaluated against `{"Data": <session data>}`, so a view bound to
//! the `courses` dataset uses `$.Data.courses`.

use serde_json::{Map, Value};
use serde_json_path::JsonPath;
use termdash_types::error::{DashError, Result};

use crate::DataMap;

/// Root key under which session data is exposed to paths.
pub const DATA_ROOT: &str = "Data";

/// A JSONPath expression compiled once from configuration.
#[derive(Debug, Clone)]
pub struct PathEvaluator {
    expression: String,
    path: JsonPath,
}

impl PathEvaluator {
    /// Parse `expression`. Invalid syntax is a configuration error.
    pub fn new(expression: &str) -> Result<Self> {
        let path = JsonPath::parse(expression)
            .map_err(|e| DashError::Path(format!("{expression:?}: {e}")))?;
        Ok(Self {
            expression: expression.to_string(),
            path,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluate against the session data.
    pub fn evaluate_with_context(&self, data: &DataMap) -> Result<Value> {
        let mut root = Map::new();
        root.insert(
            DATA_ROOT.to_string(),
            Value::Object(data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        );
        self.evaluate(&Value::Object(root))
    }

    /// Evaluate against an arbitrary value.
    ///
    /// One match returns that value (which may be `null`), several matches
    /// return them as an array, and no match is [`DashError::PathNotFound`].
    pub fn evaluate(&self, root: &Value) -> Result<Value> {
        let mut nodes = self.path.query(root).all();
        match nodes.len() {
            0 => Err(DashError::PathNotFound(self.expression.clone())),
            1 => Ok(nodes.remove(0).clone()),
            _ => Ok(Value::Array(nodes.into_iter().cloned().collect())),
        }
    }
}
