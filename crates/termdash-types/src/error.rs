//! Error types for termdash.

use std::io;

/// Errors produced by termdash.
///
/// `Config`, `Pattern`, `Template`, `Path` and `Filter` are raised while
/// building commands and views from configuration and stop the session from
/// starting. `Execution` and `PathNotFound` are raised at run time and are
/// always recoverable.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("template error: {0}")]
    Template(String),

    #[error("path error: {0}")]
    Path(String),

    #[error("filter error: {0}")]
    Filter(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("no value found for path {0}")]
    PathNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DashError {
    /// Whether this error belongs to the configuration-time class, i.e. it
    /// should abort startup rather than be logged and skipped.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Pattern(_)
                | Self::Template(_)
                | Self::Path(_)
                | Self::Filter(_)
                | Self::Yaml(_)
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = DashError::Config("missing regex".into());
        assert_eq!(format!("{e}"), "config error: missing regex");
    }

    #[test]
    fn execution_error_display() {
        let e = DashError::Execution("exit status 3".into());
        assert_eq!(format!("{e}"), "execution error: exit status 3");
    }

    #[test]
    fn path_not_found_display() {
        let e = DashError::PathNotFound("$.Data.nope".into());
        assert_eq!(format!("{e}"), "no value found for path $.Data.nope");
    }

    #[test]
    fn pattern_error_from_conversion() {
        let re_err = regex::Regex::new("(unclosed").unwrap_err();
        let e: DashError = re_err.into();
        assert!(format!("{e}").contains("invalid pattern"));
        assert!(e.is_config_error());
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: DashError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
        assert!(!e.is_config_error());
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: DashError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn yaml_error_from_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [b").unwrap_err();
        let e: DashError = yaml_err.into();
        assert!(format!("{e}").contains("YAML error"));
    }

    #[test]
    fn runtime_errors_are_not_config_errors() {
        assert!(!DashError::Execution("x".into()).is_config_error());
        assert!(!DashError::PathNotFound("$.x".into()).is_config_error());
    }
}
