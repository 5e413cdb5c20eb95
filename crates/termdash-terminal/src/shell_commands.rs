//! Commands that run an external process and parse its output as JSON.

use std::time::Duration;

use termdash_eval::TemplateEvaluator;
use termdash_types::config::CommandConfig;
use termdash_types::error::{DashError, Result};

use crate::context::AppContext;
use crate::interpreter::{BaseCommand, Command, CommandResult};
use crate::process::run_process;

/// Renders its template into a command line, runs it, and filters the JSON
/// it prints.
///
/// Execution blocks the caller until the process exits. A per-command
/// timeout bounds that wait.
#[derive(Debug)]
pub struct ShellCmd {
    base: BaseCommand,
    template: TemplateEvaluator,
    timeout: Option<Duration>,
}

impl ShellCmd {
    pub fn new(
        config: &CommandConfig,
        shell_expression: &str,
        default_timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            base: BaseCommand::from_config(config)?,
            template: TemplateEvaluator::new(shell_expression)?,
            timeout: config.timeout_ms.map(Duration::from_millis).or(default_timeout),
        })
    }

    /// Render the command line and split it into argv with shell quoting
    /// rules.
    fn command_line(&self, ctx: &dyn AppContext) -> Result<Vec<String>> {
        let line = self.template.render_with_context(ctx.data_map());
        let argv = shlex::split(&line)
            .ok_or_else(|| DashError::Execution(format!("unbalanced quotes in [{line}]")))?;
        if argv.is_empty() {
            return Err(DashError::Execution(format!(
                "[{}] rendered an empty command line",
                self.base.name()
            )));
        }
        Ok(argv)
    }
}

impl Command for ShellCmd {
    fn base(&self) -> &BaseCommand {
        &self.base
    }

    fn execute(&self, _text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
        let argv = self.command_line(ctx)?;
        let stdout = run_process(&argv, self.timeout)?;
        Ok(self.base.parse_and_filter(&stdout, ctx))
    }
}
