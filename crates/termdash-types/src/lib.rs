//! Foundation types for termdash.
//!
//! This crate holds what every other termdash crate shares: the error
//! taxonomy and the configuration schema (pages, views, commands, static
//! data) together with the YAML loader that assembles it from a file tree.

pub mod config;
pub mod error;

pub use config::{
    ApplicationConfig, CommandConfig, FormConfig, FormFieldConfig, HelpConfig, PageConfig,
    TableColumnConfig, TableConfig, ViewConfig,
};
pub use error::{DashError, Result};
