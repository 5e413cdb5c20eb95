//! Pass-through commands: filter data already held by the session.

use termdash_types::config::CommandConfig;
use termdash_types::error::Result;

use crate::context::AppContext;
use crate::interpreter::{BaseCommand, Command, CommandResult};

/// Reads a registered dataset (static data from configuration or a result
/// stored by an earlier command) and filters it. No process is run.
#[derive(Debug)]
pub struct PassthroughCmd {
    base: BaseCommand,
    source_id: String,
}

impl PassthroughCmd {
    pub fn new(config: &CommandConfig, source_id: &str) -> Result<Self> {
        Ok(Self {
            base: BaseCommand::from_config(config)?,
            source_id: source_id.to_string(),
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }
}

impl Command for PassthroughCmd {
    fn base(&self) -> &BaseCommand {
        &self.base
    }

    fn execute(&self, text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
        let Some(data) = ctx.data(&self.source_id).cloned() else {
            log::warn!("[{text}]: no data registered under '{}'", self.source_id);
            return Ok(None);
        };
        Ok(self.base.filter_result(data, ctx))
    }
}
