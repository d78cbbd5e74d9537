//! Kubernetes resource name validation
//!
//! Namespaces must be DNS-1123 labels; workflow and template names must be
//! DNS-1123 subdomains. Names are checked before any service call so that a
//! malformed argument never reaches the cluster.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Longest DNS-1123 label
pub const MAX_LABEL_LENGTH: usize = 63;

/// Longest DNS-1123 subdomain
pub const MAX_SUBDOMAIN_LENGTH: usize = 253;

/// A resource name that Kubernetes would reject
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {field} '{value}': {reason}")]
pub struct ValidationError {
    /// Argument the name was given as
    pub field: String,
    /// The rejected value
    pub value: String,
    /// What is wrong with it
    pub reason: String,
}

impl ValidationError {
    fn new(field: &str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

const LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";

/// Whether the value matches the label pattern; rejects everything if the
/// pattern fails to compile
fn is_label(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(LABEL_PATTERN).ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}

/// Check a DNS-1123 label: lowercase alphanumerics and `-`, alphanumeric at
/// both ends, at most 63 characters
pub fn validate_label(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, value, "must not be empty"));
    }
    if value.len() > MAX_LABEL_LENGTH {
        return Err(ValidationError::new(
            field,
            value,
            format!("must be at most {MAX_LABEL_LENGTH} characters"),
        ));
    }
    if !is_label(value) {
        return Err(ValidationError::new(
            field,
            value,
            "must consist of lowercase alphanumeric characters or '-', and start and end with an alphanumeric character",
        ));
    }
    Ok(())
}

/// Check a DNS-1123 subdomain: dot-separated labels, at most 253 characters
pub fn validate_subdomain(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, value, "must not be empty"));
    }
    if value.len() > MAX_SUBDOMAIN_LENGTH {
        return Err(ValidationError::new(
            field,
            value,
            format!("must be at most {MAX_SUBDOMAIN_LENGTH} characters"),
        ));
    }
    if !value.split('.').all(is_label) {
        return Err(ValidationError::new(
            field,
            value,
            "must consist of lowercase alphanumeric characters, '-' or '.', and each '.'-separated part must start and end with an alphanumeric character",
        ));
    }
    Ok(())
}
