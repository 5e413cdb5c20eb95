//! Building commands and the registry from configuration.

use std::time::Duration;

use termdash_types::config::CommandConfig;
use termdash_types::error::{DashError, Result};

use crate::data_commands::PassthroughCmd;
use crate::interpreter::{Command, CommandRegistry};
use crate::shell_commands::ShellCmd;
use crate::system_commands::register_builtins;

/// Build one configured command. Commands with a shell expression run a
/// process; commands with a source id filter session data.
pub fn create_command(
    config: &CommandConfig,
    default_timeout: Option<Duration>,
) -> Result<Box<dyn Command>> {
    config.validate()?;
    let shell = config.shell_expression.as_deref().filter(|s| !s.trim().is_empty());
    let source = config.source_id.as_deref().filter(|s| !s.trim().is_empty());
    match (shell, source) {
        (Some(expr), None) => Ok(Box::new(ShellCmd::new(config, expr, default_timeout)?)),
        (None, Some(id)) => Ok(Box::new(PassthroughCmd::new(config, id)?)),
        _ => Err(DashError::Config(format!(
            "command '{}': needs exactly one of shellExpression and sourceId",
            config.name
        ))),
    }
}

/// Build the full registry: built-ins first, then `commands` in order.
/// Any invalid definition aborts the build.
pub fn build_registry(
    commands: &[CommandConfig],
    default_timeout: Option<Duration>,
) -> Result<CommandRegistry> {
    let mut reg = CommandRegistry::new();
    register_builtins(&mut reg)?;
    for config in commands {
        reg.register(create_command(config, default_timeout)?);
    }
    log::info!("Registered {} command(s)", reg.len());
    Ok(reg)
}
