//! Command trait, shared command base, result contract, and the registry
//! that dispatches input lines.
//!
//! Dispatch scans commands in registration order and runs the first one
//! whose pattern matches the whole input line. Built-ins are registered
//! before configured commands, so they win any tie.

use regex::Regex;
use serde_json::{Map, Value};
use termdash_eval::Filter;
use termdash_types::config::{CommandConfig, HelpConfig};
use termdash_types::error::Result;

use crate::context::AppContext;

/// What kind of data a command produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// JSON data to be stored under the result key.
    Json,
    /// The command is run for its effect only.
    None,
}

/// Output of a command, consumed immediately by the caller: `data` is
/// stored under `key`, then `view_id` (if any) is redrawn and focused.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub kind: ResultKind,
    pub data: Value,
    pub key: String,
    pub view_id: Option<String>,
}

/// Pattern, result descriptor, filter and help shared by every command.
#[derive(Debug)]
pub struct BaseCommand {
    name: String,
    pattern: Regex,
    kind: ResultKind,
    key: String,
    view_id: Option<String>,
    filter: Filter,
    help: HelpConfig,
}

impl BaseCommand {
    /// Build the base of a configured command. An invalid regex or filter
    /// expression is a configuration error.
    pub fn from_config(config: &CommandConfig) -> Result<Self> {
        let kind = if config.is_json_result() {
            ResultKind::Json
        } else {
            ResultKind::None
        };
        Ok(Self {
            name: config.name.clone(),
            pattern: compile_pattern(&config.regex)?,
            kind,
            key: config.result_key.clone(),
            view_id: config.view_id.clone().filter(|v| !v.is_empty()),
            filter: Filter::new(config.filter_expression.as_deref())?,
            help: config.help.clone(),
        })
    }

    /// Base for a built-in command: no result, no filter.
    pub fn builtin(name: &str, regex: &str, syntax: &str, description: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            pattern: compile_pattern(regex)?,
            kind: ResultKind::None,
            key: String::new(),
            view_id: None,
            filter: Filter::Identity,
            help: HelpConfig {
                syntax: syntax.to_string(),
                description: description.to_string(),
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &HelpConfig {
        &self.help
    }

    pub fn result_kind(&self) -> ResultKind {
        self.kind
    }

    pub fn result_key(&self) -> &str {
        &self.key
    }

    pub fn view_id(&self) -> Option<&str> {
        self.view_id.as_deref()
    }

    /// Whether the pattern matches the whole of `text`.
    pub fn can_process(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Positional arguments of `text`: the pattern's capture groups, or the
    /// whitespace-separated tokens after the first one when the pattern has
    /// no groups.
    pub fn arguments(&self, text: &str) -> Vec<String> {
        if self.pattern.captures_len() > 1 {
            return match self.pattern.captures(text) {
                Some(caps) => caps
                    .iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect(),
                None => Vec::new(),
            };
        }
        text.split_whitespace().skip(1).map(str::to_string).collect()
    }

    /// Run `data` through the filter with the current arguments and wrap it
    /// as a result. Commands without a JSON result kind produce nothing.
    pub fn filter_result(&self, data: Value, ctx: &dyn AppContext) -> Option<CommandResult> {
        if self.kind != ResultKind::Json {
            return None;
        }
        log::debug!("[{}] filtering {data}", self.name);
        let filtered = self.filter.apply(data, ctx.arguments());
        Some(CommandResult {
            kind: self.kind,
            data: filtered,
            key: self.key.clone(),
            view_id: self.view_id.clone(),
        })
    }

    /// Parse raw process output as JSON and filter it. Output that is not
    /// valid JSON is logged and treated as an empty object.
    pub fn parse_and_filter(&self, raw: &str, ctx: &dyn AppContext) -> Option<CommandResult> {
        let data = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[{}] output is not JSON ({e}), using empty object", self.name);
                Value::Object(Map::new())
            },
        };
        self.filter_result(data, ctx)
    }
}

/// Compile `regex` anchored at both ends.
fn compile_pattern(regex: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{regex})$"))?)
}

/// A single executable command.
pub trait Command {
    /// Shared pattern, result descriptor, filter and help.
    fn base(&self) -> &BaseCommand;

    /// Run the command. `ctx` already holds the arguments extracted from
    /// `text`.
    fn execute(&self, text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>>;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn help(&self) -> &HelpConfig {
        self.base().help()
    }

    fn can_process(&self, text: &str) -> bool {
        self.base().can_process(text)
    }

    fn arguments(&self, text: &str) -> Vec<String> {
        self.base().arguments(text)
    }
}

/// Ordered collection of commands with first-match dispatch.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. A command whose name is already taken is still
    /// registered, but the earlier one keeps dispatch priority and name
    /// lookups.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        if self.get(cmd.name()).is_some() {
            log::warn!(
                "Command '{}' is shadowed by an earlier command of the same name",
                cmd.name()
            );
        }
        log::debug!("Registering command [{}]", cmd.name());
        self.commands.push(cmd);
    }

    /// First command registered under `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// First command, in registration order, whose pattern matches `text`.
    pub fn find(&self, text: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.can_process(text))
            .map(|c| c.as_ref())
    }

    /// Dispatch an input line.
    ///
    /// Input that matches no command is ignored and yields `Ok(None)`. On a
    /// match the extracted arguments replace the context's current arguments
    /// before the command runs.
    pub fn process(&self, text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        log::debug!("Processing command [{text}]");
        let Some(cmd) = self.find(text) else {
            log::info!("No command matches [{text}]");
            return Ok(None);
        };
        let args = cmd.arguments(text);
        log::debug!("[{}] arguments {args:?}", cmd.name());
        ctx.register_args(args);
        cmd.execute(text, ctx)
    }

    /// Command names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Help entries of every command in registration order.
    pub fn help_entries(&self) -> Vec<(&str, &HelpConfig)> {
        self.commands.iter().map(|c| (c.name(), c.help())).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Session;
    use serde_json::json;

    struct EchoCmd {
        base: BaseCommand,
    }

    impl EchoCmd {
        fn new(name: &str, regex: &str) -> Self {
            let config = CommandConfig {
                name: name.into(),
                regex: regex.into(),
                result_type: "json".into(),
                result_key: name.into(),
                source_id: Some("unused".into()),
                ..CommandConfig::default()
            };
            Self {
                base: BaseCommand::from_config(&config).unwrap(),
            }
        }
    }

    impl Command for EchoCmd {
        fn base(&self) -> &BaseCommand {
            &self.base
        }
        fn execute(&self, _text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
            let args = json!(ctx.arguments());
            Ok(self.base.filter_result(args, ctx))
        }
    }

    fn base(regex: &str) -> BaseCommand {
        BaseCommand::builtin("t", regex, "", "").unwrap()
    }

    #[test]
    fn pattern_must_match_whole_text() {
        let b = base(r"p \w+");
        assert!(b.can_process("p detail"));
        assert!(!b.can_process("xp detail"));
        assert!(!b.can_process("p detail extra"));
    }

    #[test]
    fn arguments_without_groups_are_trailing_tokens() {
        assert_eq!(base(r"p \w+").arguments("p detail"), ["detail"]);
    }

    #[test]
    fn arguments_from_capture_groups() {
        let b = base(r"show courses (\S+)(?: (\S+))?");
        assert_eq!(b.arguments("show courses ENG-256"), ["ENG-256", ""]);
        assert_eq!(b.arguments("show courses ENG-256 fall"), ["ENG-256", "fall"]);
        assert!(b.arguments("hide courses").is_empty());
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let b = base("q|quit");
        assert!(b.can_process("q"));
        assert!(b.can_process("quit"));
        assert!(!b.can_process("quite"));
        assert!(!b.can_process("aq"));
    }

    #[test]
    fn invalid_regex_is_config_error() {
        let config = CommandConfig {
            name: "bad".into(),
            regex: "(".into(),
            source_id: Some("x".into()),
            ..CommandConfig::default()
        };
        let err = BaseCommand::from_config(&config).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn malformed_output_becomes_empty_object() {
        let cmd = EchoCmd::new("e", "e");
        let session = Session::default();
        let result = cmd.base.parse_and_filter("not json {", &session).unwrap();
        assert_eq!(result.data, json!({}));
        assert_eq!(result.key, "e");
    }

    #[test]
    fn non_json_kind_produces_no_result() {
        let session = Session::default();
        assert!(base("x").filter_result(json!([1]), &session).is_none());
    }

    #[test]
    fn first_registered_match_wins() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd::new("first", r"show \w+")));
        reg.register(Box::new(EchoCmd::new("second", r"show (\w+)")));
        let mut session = Session::default();
        for _ in 0..10 {
            let result = reg.process("show all", &mut session).unwrap().unwrap();
            assert_eq!(result.key, "first");
        }
    }

    #[test]
    fn unmatched_input_is_a_no_op() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd::new("e", "echo (.*)")));
        let mut session = Session::default();
        session.register_args(vec!["kept".into()]);
        assert!(reg.process("nothing here", &mut session).unwrap().is_none());
        assert!(reg.process("   ", &mut session).unwrap().is_none());
        assert_eq!(session.arguments(), ["kept"]);
    }

    #[test]
    fn arguments_are_replaced_per_dispatch() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd::new("e", r"echo (\w+)(?: (\w+))?")));
        let mut session = Session::default();
        reg.process("echo a b", &mut session).unwrap();
        assert_eq!(session.arguments(), ["a", "b"]);
        let result = reg.process("echo c", &mut session).unwrap().unwrap();
        assert_eq!(session.arguments(), ["c", ""]);
        assert_eq!(result.data, json!(["c", ""]));
    }

    #[test]
    fn duplicate_names_keep_first_for_lookup() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd::new("dup", "a")));
        reg.register(Box::new(EchoCmd::new("dup", "b")));
        assert_eq!(reg.len(), 2);
        assert!(reg.get("dup").unwrap().can_process("a"));
        assert_eq!(reg.names(), ["dup", "dup"]);
    }

    #[test]
    fn help_entries_follow_registration_order() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd::new("b", "b")));
        reg.register(Box::new(EchoCmd::new("a", "a")));
        let names: Vec<&str> = reg.help_entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(!reg.is_empty());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn can_process_is_pure(text in "[a-z ]{0,20}") {
                let b = base(r"p \w+");
                prop_assert_eq!(b.can_process(&text), b.can_process(&text));
            }

            #[test]
            fn page_pattern_yields_its_token(token in "[a-z0-9_]{1,12}") {
                let b = base(r"p \w+");
                let text = format!("p {token}");
                prop_assert!(b.can_process(&text));
                prop_assert_eq!(b.arguments(&text), vec![token]);
            }
        }
    }
}
