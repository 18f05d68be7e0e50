//! Unified error handling for the place-miner library.
//!
//! This module provides a consistent error type for all place-miner
//! operations, replacing mixed error handling patterns (Option, panic,
//! silent failures).

use crate::MonthKey;
use std::fmt;

/// Unified error type for place-miner operations.
#[derive(Debug, Clone)]
pub enum PlaceMinerError {
    /// A sample violated the cleaned-input precondition
    InvalidSample {
        index: usize,
        message: String,
    },
    /// Clustering failed for one (user, month) unit
    ClusterUnitFailed {
        month: MonthKey,
        message: String,
    },
    /// Configuration error
    ConfigError { message: String },
    /// Persistence/cache error
    PersistenceError { message: String },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for PlaceMinerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceMinerError::InvalidSample { index, message } => {
                write!(f, "Sample {} is invalid: {}", index, message)
            }
            PlaceMinerError::ClusterUnitFailed { month, message } => {
                write!(f, "Clustering failed for month {}: {}", month, message)
            }
            PlaceMinerError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            PlaceMinerError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
            PlaceMinerError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for PlaceMinerError {}

/// Result type alias for place-miner operations.
pub type Result<T> = std::result::Result<T, PlaceMinerError>;

/// Extension trait for converting Option to PlaceMinerError.
pub trait OptionExt<T> {
    /// Convert Option to Result with generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| PlaceMinerError::Internal {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlaceMinerError::ClusterUnitFailed {
            month: MonthKey { year: 2024, month: 3 },
            message: "non-finite coordinate".to_string(),
        };
        assert!(err.to_string().contains("2024-03"));
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_internal("missing value");
        assert!(matches!(result, Err(PlaceMinerError::Internal { .. })));
    }
}
