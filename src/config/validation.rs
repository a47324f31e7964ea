//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every source exists before anything is started
//! - Validate value ranges (ports, poll timeout)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of the settings and the filesystem

use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing file arguments")]
    NoSources,

    #[error("source '{path}' is not accessible: {reason}")]
    SourceMissing { path: PathBuf, reason: String },

    #[error("{name} must not be 0")]
    ZeroPort { name: &'static str },

    #[error("config and internal servers both use port {port}")]
    PortConflict { port: u16 },

    #[error("poll timeout must be greater than zero")]
    ZeroPollTimeout,
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.sources.is_empty() {
        errors.push(ValidationError::NoSources);
    }
    for path in &config.sources {
        if let Err(e) = std::fs::metadata(path) {
            errors.push(ValidationError::SourceMissing {
                path: path.clone(),
                reason: e.to_string(),
            });
        }
    }

    let listener = &config.listener;
    if listener.config_port == 0 {
        errors.push(ValidationError::ZeroPort { name: "config port" });
    }
    if listener.internal_port == 0 {
        errors.push(ValidationError::ZeroPort { name: "internal port" });
    }
    if listener.config_port != 0 && listener.config_port == listener.internal_port {
        errors.push(ValidationError::PortConflict {
            port: listener.config_port,
        });
    }

    if config.poll_timeout.is_zero() {
        errors.push(ValidationError::ZeroPollTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_valid_settings() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ServerConfig {
            sources: vec![file.path().to_path_buf()],
            ..ServerConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig {
            sources: vec![PathBuf::from("/nonexistent/mock-apollo.yaml")],
            poll_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };
        config.listener.config_port = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::SourceMissing { .. }));
        assert!(errors.contains(&ValidationError::ZeroPort { name: "config port" }));
        assert!(errors.contains(&ValidationError::ZeroPollTimeout));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_port_conflict() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = ServerConfig {
            sources: vec![file.path().to_path_buf()],
            ..ServerConfig::default()
        };
        config.listener.internal_port = config.listener.config_port;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::PortConflict { port: 8070 }]
        );
    }
}
