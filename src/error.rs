//! Error types for the HR payroll rules engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts a record operation. A returned error means
//! nothing was written to the store.

use thiserror::Error;

use crate::models::DocStatus;

/// The main error type for the rules engine.
///
/// # Example
///
/// ```
/// use hrms_rules::error::HrmsError;
///
/// let error = HrmsError::NotFound {
///     doctype: "Salary Slip".to_string(),
///     name: "SAL-SLP-00001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Salary Slip SAL-SLP-00001 not found");
/// ```
#[derive(Debug, Error)]
pub enum HrmsError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{doctype} {name} not found")]
    NotFound {
        /// The record type that was looked up.
        doctype: String,
        /// The record name that was looked up.
        name: String,
    },

    /// A business rule rejected the record.
    #[error("{doctype}: {message}")]
    Validation {
        /// The record type being validated.
        doctype: String,
        /// A user-facing description of the failed rule.
        message: String,
    },

    /// Another submitted record already covers what this record would create.
    #[error("{doctype}: duplicate of {existing}: {message}")]
    Duplicate {
        /// The record type being validated.
        doctype: String,
        /// The name of the conflicting record.
        existing: String,
        /// A user-facing description of the conflict.
        message: String,
    },

    /// The record is not in a status that allows the requested action.
    #[error("Cannot {action} {doctype} {name} in status {status:?}")]
    InvalidTransition {
        /// The record type.
        doctype: String,
        /// The record name.
        name: String,
        /// The action that was attempted (e.g. "submit").
        action: String,
        /// The current status of the record.
        status: DocStatus,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl HrmsError {
    /// Shorthand for a [`HrmsError::Validation`] error.
    pub fn validation(doctype: &str, message: impl Into<String>) -> Self {
        HrmsError::Validation {
            doctype: doctype.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`HrmsError::NotFound`] error.
    pub fn not_found(doctype: &str, name: impl Into<String>) -> Self {
        HrmsError::NotFound {
            doctype: doctype.to_string(),
            name: name.into(),
        }
    }
}

/// A type alias for Results that return HrmsError.
pub type HrmsResult<T> = Result<T, HrmsError>;
