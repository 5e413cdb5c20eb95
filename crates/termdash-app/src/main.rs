//! termdash entry point.
//!
//! Loads the dashboard configuration, draws the first page and then reads
//! commands from stdin, one per line, until `q` or end of input.
//! `#<n>` selects row `n` of the focused table.

mod app_state;
mod commands;
mod input;
mod options;
mod render;

use std::fs::File;
use std::io::{self, BufRead};

use anyhow::{Context, Result};
use termdash_types::config::ApplicationConfig;

use app_state::AppState;
use input::InputResult;
use options::Options;

fn main() -> Result<()> {
    let options = Options::parse(std::env::args().skip(1))?;
    init_logging(&options)?;

    let config = ApplicationConfig::load(&options.config)
        .with_context(|| format!("loading {}", options.config.display()))?;
    log::info!("Starting {}", if config.name.is_empty() { "termdash" } else { &config.name });

    let mut state = AppState::new(&config, options.timeout, io::stdout())
        .context("building dashboard")?;
    state.print_help()?;
    commands::redraw_page(&mut state);

    for line in io::stdin().lock().lines() {
        if input::handle_line(&line?, &mut state) == InputResult::Quit {
            break;
        }
    }
    log::info!("Bye");
    Ok(())
}

fn init_logging(options: &Options) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &options.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
