//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, chunk size > 0, bindable address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ConsoleConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ConsoleConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "api.bind_address",
            message: format!("not a valid socket address: {}", config.api.bind_address),
        });
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "api.request_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.sync.retry_delay_ms == 0 {
        errors.push(ValidationError {
            field: "sync.retry_delay_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.sync.max_attempts == Some(0) {
        errors.push(ValidationError {
            field: "sync.max_attempts",
            message: "must be at least one when set".to_string(),
        });
    }

    if config.batch.chunk_size == 0 {
        errors.push(ValidationError {
            field: "batch.chunk_size",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
