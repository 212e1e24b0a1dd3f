//! Configuration validation.
//!
//! # Responsibilities
//! - Check that required fields were actually provided (serde fills defaults)
//! - Validate value ranges (ports and shutdown window non-zero, known SSL modes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{AuthServiceConfig, DatabaseConfig, ServerConfig, SSL_MODES};

/// A single semantic problem in a decoded config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} has invalid value {value:?}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Required-field and range checks performed right after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

impl Validate for AuthServiceConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_server(&self.server, &mut errors);
        check_database(&self.database, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_server(server: &ServerConfig, errors: &mut Vec<ValidationError>) {
    if server.port == 0 {
        errors.push(ValidationError::Missing("server.port"));
    }
    if server.max_connections == 0 {
        errors.push(ValidationError::Invalid {
            field: "server.max_connections",
            value: "0".into(),
            reason: "must be greater than zero",
        });
    }
    // A zero window would force-stop every shutdown, even an idle one.
    if server.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::Invalid {
            field: "server.shutdown_timeout_secs",
            value: "0".into(),
            reason: "must be greater than zero",
        });
    }
}

fn check_database(db: &DatabaseConfig, errors: &mut Vec<ValidationError>) {
    if db.host.trim().is_empty() {
        errors.push(ValidationError::Missing("database.host"));
    }
    if db.port == 0 {
        errors.push(ValidationError::Missing("database.port"));
    }
    if db.user.trim().is_empty() {
        errors.push(ValidationError::Missing("database.user"));
    }
    if db.db_name.trim().is_empty() {
        errors.push(ValidationError::Missing("database.db_name"));
    }
    if !db.ssl_mode.is_empty() && !SSL_MODES.contains(&db.ssl_mode.as_str()) {
        errors.push(ValidationError::Invalid {
            field: "database.ssl_mode",
            value: db.ssl_mode.clone(),
            reason: "unknown SSL mode",
        });
    }
    if db.max_connections == 0 {
        errors.push(ValidationError::Invalid {
            field: "database.max_connections",
            value: "0".into(),
            reason: "must be greater than zero",
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthServiceConfig {
        let mut config = AuthServiceConfig::default();
        config.server.port = 50051;
        config.database.host = "localhost".into();
        config.database.port = 5432;
        config.database.user = "auth".into();
        config.database.db_name = "auth".into();
        config
    }

    #[test]
    fn complete_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn default_config_reports_every_missing_field() {
        let errors = AuthServiceConfig::default().validate().unwrap_err();
        assert!(errors.contains(&ValidationError::Missing("server.port")));
        assert!(errors.contains(&ValidationError::Missing("database.host")));
        assert!(errors.contains(&ValidationError::Missing("database.user")));
        assert!(errors.contains(&ValidationError::Missing("database.db_name")));
    }

    #[test]
    fn unknown_ssl_mode_is_rejected() {
        let mut config = valid();
        config.database.ssl_mode = "sometimes".into();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::Invalid { field: "database.ssl_mode", .. }
        ));
    }

    #[test]
    fn zero_shutdown_window_is_rejected() {
        let mut config = valid();
        config.server.shutdown_timeout_secs = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Invalid {
                field: "server.shutdown_timeout_secs",
                value: "0".into(),
                reason: "must be greater than zero",
            }]
        );
    }

    #[test]
    fn empty_ssl_mode_is_allowed() {
        let mut config = valid();
        config.database.ssl_mode.clear();
        assert!(config.validate().is_ok());
    }
}
