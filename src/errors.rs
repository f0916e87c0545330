//! # Application Error Types
//!
//! This module defines common error types used throughout the shopping list service.
//! Only the request boundary (malformed selections) and storage I/O surface errors;
//! parsing, merging and formatting absorb their conditions with fallbacks.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (selection shape, ingredient input, etc.)
    Validation(String),
    /// Database operation errors
    Database(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Database(msg) => write!(f, "[DATABASE] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log database operation errors with contextual information
    pub fn log_database_error(
        error: &impl std::fmt::Display,
        operation: &str,
        user_id: Option<i64>,
        recipe_count: Option<usize>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            user_id = ?user_id,
            recipe_count = ?recipe_count,
            "Database operation failed"
        );
    }

    /// Log aggregation failures with selection context
    pub fn log_aggregation_error(
        error: &impl std::fmt::Display,
        user_id: i64,
        selection_size: usize,
    ) {
        error!(
            error = %error,
            user_id = %user_id,
            selection_size = %selection_size,
            "Shopping list aggregation failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        user_id: Option<i64>,
        input_value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            user_id = ?user_id,
            input_value = ?input_value.map(|v| if v.len() > 100 {
                let cut = (0..=100).rev().find(|i| v.is_char_boundary(*i)).unwrap_or(0);
                format!("{}...", &v[..cut])
            } else {
                v.to_string()
            }),
            "Validation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_tagged_by_category() {
        assert_eq!(
            AppError::Validation("bad servings".to_string()).to_string(),
            "[VALIDATION] bad servings"
        );
        assert_eq!(
            AppError::Database("down".to_string()).to_string(),
            "[DATABASE] down"
        );
    }

    #[test]
    fn test_json_errors_become_validation_errors() {
        let err = serde_json::from_str::<Vec<i64>>("not json").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }

    #[test]
    fn test_anyhow_errors_become_internal_errors() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(AppError::from(err), AppError::Internal("boom".to_string()));
    }
}
