//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint URLs parse and use http(s)
//! - Gas and polling values are usable
//! - Module name and contract address are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use url::Url;

use crate::account::AccountAddress;
use crate::config::schema::DeployConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &DeployConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url("node.url", &config.node.url, &mut errors);
    check_url("faucet.url", &config.faucet.url, &mut errors);

    if config.node.max_gas_amount == 0 {
        errors.push(ValidationError::new("node.max_gas_amount", "must be greater than 0"));
    }
    if config.node.expiration_secs == 0 {
        errors.push(ValidationError::new("node.expiration_secs", "must be greater than 0"));
    }
    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "node.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.node.gas_currency_code.is_empty() {
        errors.push(ValidationError::new("node.gas_currency_code", "must not be empty"));
    }
    if config.polling.max_attempts == 0 {
        errors.push(ValidationError::new("polling.max_attempts", "must be greater than 0"));
    }

    if !is_identifier(&config.contract.module_name) {
        errors.push(ValidationError::new(
            "contract.module_name",
            format!("'{}' is not a valid module identifier", config.contract.module_name),
        ));
    }
    if let Some(address) = &config.contract.address {
        if address.parse::<AccountAddress>().is_err() {
            errors.push(ValidationError::new(
                "contract.address",
                format!("'{}' is not a hex account address", address),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
