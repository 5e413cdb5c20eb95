//! jq-style filters applied to command output.
//!
//! A filter is compiled once when its command is built. At evaluation time
//! the current command arguments are bound to `$args` as an array of
//! strings:
//!
//! ```text
//! .[] | select(.code == $args[0])
//! ```

use std::fmt;

use jaq_interpret::{Ctx, FilterT, ParseCtx, RcIter, Val};
use serde_json::Value;
use termdash_types::error::{DashError, Result};

/// Name of the variable holding the command arguments (`$args`).
const ARGS_VAR: &str = "args";

/// Transformation applied to the parsed output of a command.
#[derive(Debug)]
pub enum Filter {
    /// Returns the input unchanged.
    Identity,
    /// Runs a compiled query and collects everything it emits.
    Query(QueryFilter),
}

impl Filter {
    /// Build a filter from an optional expression. A missing or blank
    /// expression yields [`Filter::Identity`].
    pub fn new(expression: Option<&str>) -> Result<Self> {
        match expression.map(str::trim).filter(|e| !e.is_empty()) {
            Some(expr) => Ok(Self::Query(QueryFilter::compile(expr)?)),
            None => Ok(Self::Identity),
        }
    }

    /// Apply the filter. A query always produces an array, empty when the
    /// query emits nothing.
    pub fn apply(&self, data: Value, args: &[String]) -> Value {
        match self {
            Self::Identity => data,
            Self::Query(query) => Value::Array(query.run(data, args)),
        }
    }
}

/// A compiled query expression.
pub struct QueryFilter {
    expression: String,
    filter: jaq_interpret::Filter,
}

impl QueryFilter {
    /// Parse and compile `expression` with the jq standard library and the
    /// `$args` variable in scope.
    pub fn compile(expression: &str) -> Result<Self> {
        let mut defs = ParseCtx::new(vec![ARGS_VAR.to_string()]);
        defs.insert_natives(jaq_core::core());
        defs.insert_defs(jaq_std::std());

        let (main, errs) = jaq_parse::parse(expression, jaq_parse::main());
        let main = match main {
            Some(main) if errs.is_empty() => main,
            _ => {
                return Err(DashError::Filter(format!(
                    "{expression:?}: {} syntax error(s): {:?}",
                    errs.len(),
                    errs
                )));
            },
        };

        let filter = defs.compile(main);
        if !defs.errs.is_empty() {
            return Err(DashError::Filter(format!(
                "{expression:?}: {} undefined name(s)",
                defs.errs.len()
            )));
        }
        Ok(Self {
            expression: expression.to_string(),
            filter,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Run the query and collect its outputs in order. An error for one
    /// output is logged and that output skipped.
    pub fn run(&self, data: Value, args: &[String]) -> Vec<Value> {
        let args = Value::Array(args.iter().cloned().map(Value::String).collect());
        let inputs = RcIter::new(core::iter::empty());
        let ctx = Ctx::new([Val::from(args)], &inputs);

        let mut results = Vec::new();
        for output in self.filter.run((ctx, Val::from(data))) {
            match output {
                Ok(val) => results.push(Value::from(val)),
                Err(e) => log::warn!("filter {:?}: skipping item: {e}", self.expression),
            }
        }
        log::debug!("filter {:?} emitted {} value(s)", self.expression, results.len());
        results
    }
}

impl fmt::Debug for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryFilter")
            .field("expression", &self.expression)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_expression_is_identity() {
        assert!(matches!(Filter::new(None).unwrap(), Filter::Identity));
        assert!(matches!(Filter::new(Some("  ")).unwrap(), Filter::Identity));
    }

    #[test]
    fn identity_returns_input() {
        let data = json!({"a": [1, 2, {"b": null}]});
        assert_eq!(Filter::Identity.apply(data.clone(), &[]), data);
    }

    #[test]
    fn select_by_argument() {
        let filter = Filter::new(Some(".[] | select(.id == $args[0])")).unwrap();
        let data = json!([{"id": "a"}, {"id": "b"}]);
        assert_eq!(filter.apply(data, &args(&["b"])), json!([{"id": "b"}]));
    }

    #[test]
    fn no_match_yields_empty_array() {
        let filter = Filter::new(Some(".[] | select(.id == $args[0])")).unwrap();
        let data = json!([{"id": "a"}]);
        assert_eq!(filter.apply(data, &args(&["z"])), json!([]));
    }

    #[test]
    fn single_output_is_wrapped() {
        let filter = Filter::new(Some(".name")).unwrap();
        assert_eq!(filter.apply(json!({"name": "x"}), &[]), json!(["x"]));
    }

    #[test]
    fn bad_item_is_skipped() {
        let filter = Filter::new(Some(".[] | .x")).unwrap();
        let data = json!([{"x": 1}, 5, {"x": 2}]);
        assert_eq!(filter.apply(data, &[]), json!([1, 2]));
    }

    #[test]
    fn iterating_null_yields_empty() {
        let filter = Filter::new(Some(".[]")).unwrap();
        assert_eq!(filter.apply(Value::Null, &[]), json!([]));
    }

    #[test]
    fn missing_argument_does_not_panic() {
        let filter = Filter::new(Some(".[] | select(.id == $args[0])")).unwrap();
        let data = json!([{"id": "a"}]);
        assert_eq!(filter.apply(data, &[]), json!([]));
    }

    #[test]
    fn syntax_error_is_config_error() {
        let err = Filter::new(Some(".[] | select(")).unwrap_err();
        assert!(matches!(err, DashError::Filter(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn undefined_variable_is_config_error() {
        assert!(Filter::new(Some("$nope")).is_err());
    }

    #[test]
    fn query_keeps_expression() {
        match Filter::new(Some(".[]")).unwrap() {
            Filter::Query(q) => assert_eq!(q.expression(), ".[]"),
            Filter::Identity => panic!("expected query"),
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn json_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                (-1_000_000i64..1_000_000).prop_map(|n| json!(n)),
                "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
            ];
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn identity_round_trips(value in json_value()) {
                prop_assert_eq!(Filter::Identity.apply(value.clone(), &[]), value);
            }

            #[test]
            fn dot_query_wraps_input(value in json_value()) {
                let filter = Filter::new(Some(".")).unwrap();
                prop_assert_eq!(filter.apply(value.clone(), &[]), Value::Array(vec![value]));
            }
        }
    }
}
