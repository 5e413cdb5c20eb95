//! Built-in commands: quit, page switch, view focus.
//!
//! These are registered ahead of any configured command, so a configured
//! command can never take over their syntax.

use termdash_types::error::Result;

use crate::context::AppContext;
use crate::interpreter::{BaseCommand, Command, CommandRegistry, CommandResult};

/// Register the built-in commands into a registry. Call this before
/// registering configured commands.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Box::new(QuitCmd::new()?));
    reg.register(Box::new(PageCmd::new()?));
    reg.register(Box::new(FocusCmd::new()?));
    Ok(())
}

// ---------------------------------------------------------------------------
// quit
// ---------------------------------------------------------------------------

struct QuitCmd {
    base: BaseCommand,
}

impl QuitCmd {
    fn new() -> Result<Self> {
        Ok(Self {
            base: BaseCommand::builtin("quit", "q|quit", "q", "Quit the dashboard")?,
        })
    }
}

impl Command for QuitCmd {
    fn base(&self) -> &BaseCommand {
        &self.base
    }
    fn execute(&self, _text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
        ctx.quit();
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// p <page>
// ---------------------------------------------------------------------------

struct PageCmd {
    base: BaseCommand,
}

impl PageCmd {
    fn new() -> Result<Self> {
        Ok(Self {
            base: BaseCommand::builtin("page", r"p \S+", "p <page>", "Switch to a page")?,
        })
    }
}

impl Command for PageCmd {
    fn base(&self) -> &BaseCommand {
        &self.base
    }
    fn execute(&self, text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
        let Some(page) = ctx.arguments().first().cloned() else {
            log::warn!("[{text}]: no page given");
            return Ok(None);
        };
        if !ctx.switch_page(&page) {
            log::warn!("[{text}]: unknown page '{page}', ignoring");
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// f <view>
// ---------------------------------------------------------------------------

struct FocusCmd {
    base: BaseCommand,
}

impl FocusCmd {
    fn new() -> Result<Self> {
        Ok(Self {
            base: BaseCommand::builtin(
                "focus",
                r"f \S+",
                "f <view>",
                "Focus a view on the current page",
            )?,
        })
    }
}

impl Command for FocusCmd {
    fn base(&self) -> &BaseCommand {
        &self.base
    }
    fn execute(&self, text: &str, ctx: &mut dyn AppContext) -> Result<Option<CommandResult>> {
        let Some(shortcut) = ctx.arguments().first().cloned() else {
            log::warn!("[{text}]: no view given");
            return Ok(None);
        };
        if !ctx.focus_on_view_shortcut(&shortcut) {
            log::warn!("[{text}]: no view '{shortcut}' on the current page, ignoring");
        }
        Ok(None)
    }
}
