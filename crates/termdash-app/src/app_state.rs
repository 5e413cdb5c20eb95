use std::io::{self, Write};
use std::time::Duration;

use termdash_terminal::{AppContext, CommandRegistry, Session, build_registry};
use termdash_types::config::ApplicationConfig;
use termdash_types::error::Result;

use crate::render::TextRenderer;

/// Everything the input loop needs: the dispatch registry, the session
/// state it mutates, and the renderer that shows it.
pub struct AppState<W: Write = io::Stdout> {
    pub registry: CommandRegistry,
    pub session: Session,
    pub renderer: TextRenderer<W>,
}

impl<W: Write> AppState<W> {
    /// Build registry, views and session from configuration. Any broken
    /// pattern, filter or template is reported here.
    pub fn new(config: &ApplicationConfig, timeout: Option<Duration>, out: W) -> Result<Self> {
        let registry = build_registry(&config.commands, timeout)?;
        let renderer = TextRenderer::new(&config.pages, out)?;
        let session = Session::from_config(config);
        log::info!(
            "Loaded {} commands, {} pages",
            registry.len(),
            session.pages().len()
        );
        Ok(Self {
            registry,
            session,
            renderer,
        })
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Write the command reference.
    pub fn print_help(&mut self) -> io::Result<()> {
        let out = self.renderer.output_mut();
        writeln!(out, "Commands:")?;
        for (name, help) in self.registry.help_entries() {
            let syntax = if help.syntax.is_empty() { name } else { help.syntax.as_str() };
            writeln!(out, "  {syntax:<24} {}", help.description)?;
        }
        Ok(())
    }
}
