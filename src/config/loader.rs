//! Settings loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse settings from TOML text. Missing fields take their defaults.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read settings from a TOML file without validating them, so that command
/// line overrides can still be applied.
pub fn read_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Validate the final settings.
pub fn finalize(config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_parse_full_file() {
        let config = parse_config(
            r#"
            sources = ["a.yaml", "b.yaml"]
            poll_timeout = "30s"
            watch_interval = "2s"

            [listener]
            config_port = 18070

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources, vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]);
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.watch_interval, Duration::from_secs(2));
        assert_eq!(config.listener.config_port, 18070);
        assert_eq!(config.listener.internal_port, 9090);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(parse_config("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_bad_duration_is_parse_error() {
        assert!(matches!(
            parse_config(r#"poll_timeout = "soon""#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_finalize_reports_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.internal_port = config.listener.config_port;

        let err = finalize(config).unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(err.to_string().starts_with("Validation failed: missing file arguments"));
    }
}
