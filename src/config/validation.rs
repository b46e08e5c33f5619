//! Semantic configuration validation.
//!
//! Serde handles the syntactic layer; these checks catch the mistakes that
//! would otherwise surface only as an on-chain rejection (bad addresses,
//! zero ttl) or as a hung attempt (zero timeouts).

use alloy::primitives::Address;

use crate::config::schema::RelayConfig;

/// A single validation failure, naming the offending field.
#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<Address>().is_err() {
        errors.push(ValidationError {
            field: field.to_string(),
            message: format!("'{}' is not a valid address", value),
        });
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain.rpc_url.is_empty() {
        errors.push(ValidationError {
            field: "chain.rpc_url".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "chain.rpc_timeout_secs".to_string(),
            message: "must be positive".to_string(),
        });
    }

    // At least one executor must be configured; each configured one must
    // carry a parseable address and a non-empty domain.
    let has_forwarder = !config.forwarder.address.is_empty();
    let has_entry_point = !config.entry_point.address.is_empty();
    if !has_forwarder && !has_entry_point {
        errors.push(ValidationError {
            field: "forwarder.address / entry_point.address".to_string(),
            message: "at least one executor must be configured".to_string(),
        });
    }

    if has_forwarder {
        check_address(&mut errors, "forwarder.address", &config.forwarder.address);
        if config.forwarder.domain_name.is_empty() {
            errors.push(ValidationError {
                field: "forwarder.domain_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if config.forwarder.domain_version.is_empty() {
            errors.push(ValidationError {
                field: "forwarder.domain_version".to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    if has_entry_point {
        check_address(&mut errors, "entry_point.address", &config.entry_point.address);
        check_address(&mut errors, "entry_point.account", &config.entry_point.account);
        if config.entry_point.domain_name.is_empty() {
            errors.push(ValidationError {
                field: "entry_point.domain_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    if config.attempt.ttl_secs == 0 {
        errors.push(ValidationError {
            field: "attempt.ttl_secs".to_string(),
            message: "must be positive".to_string(),
        });
    }
    if config.attempt.max_attempts == 0 {
        errors.push(ValidationError {
            field: "attempt.max_attempts".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if config.attempt.receipt_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "attempt.receipt_timeout_secs".to_string(),
            message: "must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
