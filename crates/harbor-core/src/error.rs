//! Error types for HARBOR operations.
//!
//! This module defines [`HarborError`]. Ordinary misuse of the monitor API
//! (dismissing, deleting or toggling an unknown id) is never an error; only
//! malformed input and configuration problems surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`HarborError`].
pub type Result<T> = std::result::Result<T, HarborError>;

/// Error type for all HARBOR operations.
#[derive(Debug, Error)]
pub enum HarborError {
    // =========================================================================
    // Alert Rule Errors
    // =========================================================================
    /// Rule definition is missing a field or carries an invalid value
    #[error("Invalid alert rule ({field}): {message}")]
    InvalidRule { field: String, message: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in HARBOR)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HarborError {
    /// Create an InvalidRule error
    pub fn invalid_rule(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Returns true if the caller supplied malformed input
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::InvalidRule { .. } | Self::ConfigValidation { .. })
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRule { .. } => Some(
                "Health rules need a Warning or Error threshold; utilization rules need a comparator and a value between 0 and 100",
            ),
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.harbor/config.yaml or omit --config to use defaults")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rule_error() {
        let err = HarborError::invalid_rule("threshold", "must be finite");
        assert!(err.to_string().contains("threshold"));
        assert!(err.is_validation_error());
        assert!(!err.is_config_error());
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_config_not_found_error() {
        let err = HarborError::config_not_found("/home/user/.harbor/config.yaml");
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(!err.is_validation_error());
    }

    #[test]
    fn test_error_classification() {
        assert!(HarborError::config_validation("capacity is zero").is_config_error());
        assert!(HarborError::config_validation("capacity is zero").is_validation_error());
        assert!(HarborError::internal("bug").guidance().is_none());
    }
}
