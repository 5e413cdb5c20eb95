//! Command dispatch for termdash.
//!
//! Input lines are matched against an ordered registry of commands. The
//! first command whose pattern matches runs against the session state and
//! may produce a [`CommandResult`] for the caller to store and display.

mod commands;
mod context;
mod data_commands;
mod interpreter;
mod process;
mod shell_commands;
mod system_commands;

/// Build the registry from configured commands (built-ins first).
pub use commands::{build_registry, create_command};
/// Application state contract and its in-memory implementation.
pub use context::{ARGS_KEY, AppContext, Session};
/// Command that filters data already held by the session.
pub use data_commands::PassthroughCmd;
/// Command trait, shared base, result contract and registry.
pub use interpreter::{BaseCommand, Command, CommandRegistry, CommandResult, ResultKind};
/// Blocking process execution with optional timeout.
pub use process::run_process;
/// Command that runs an external process.
pub use shell_commands::ShellCmd;
/// Register the quit/page/focus built-ins into a registry.
pub use system_commands::register_builtins;
