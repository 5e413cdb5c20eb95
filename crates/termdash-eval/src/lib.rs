//! Expression evaluators for termdash.
//!
//! Three small languages are evaluated against session data:
//!
//! - templates ([`TemplateEvaluator`]) produce text such as shell command
//!   lines and table cells,
//! - JSONPath expressions ([`PathEvaluator`]) pick a sub-tree out of the data,
//! - jq-style filters ([`Filter`]) reshape command output, with the current
//!   command arguments bound to `$args`.
//!
//! Evaluators never mutate session data. Compilation failures are
//! configuration errors; evaluation failures degrade to an empty value.

pub mod filter;
pub mod path;
pub mod template;

use std::collections::BTreeMap;

use serde_json::Value;

/// Session data as seen by evaluators.
pub type DataMap = BTreeMap<String, Value>;

/// Compiled jq-style filter.
pub use filter::Filter;
/// Compiled JSONPath expression.
pub use path::PathEvaluator;
/// Compiled text template.
pub use template::TemplateEvaluator;
