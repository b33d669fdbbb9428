//! Response types for the HR payroll rules API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API, plus the bodies of endpoints that do not return a record.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HrmsError;
use crate::models::EarnedLeaveScheduleRow;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<HrmsError> for ApiErrorResponse {
    fn from(error: HrmsError) -> Self {
        let message = error.to_string();
        match error {
            HrmsError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", path),
            },
            HrmsError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            HrmsError::NotFound { doctype, name } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "NOT_FOUND",
                    message,
                    format!("No {} named '{}' exists", doctype, name),
                ),
            },
            HrmsError::Validation { message, .. } => {
                ApiErrorResponse::bad_request(ApiError::validation_error(message))
            }
            HrmsError::Duplicate {
                existing, message, ..
            } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details("DUPLICATE", message, existing),
            },
            HrmsError::InvalidTransition { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_TRANSITION", message))
            }
            HrmsError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

/// Body of `GET /leave-balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBalanceResponse {
    /// The employee.
    pub employee: String,
    /// The leave type.
    pub leave_type: String,
    /// The balance date.
    pub date: NaiveDate,
    /// The allocation covering the date, if any.
    pub leave_allocation: Option<String>,
    /// Leaves available on the date.
    pub balance: Decimal,
}

/// Body of `POST /earned-leave/schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedLeaveScheduleResponse {
    /// The employee.
    pub employee: String,
    /// The leave type.
    pub leave_type: String,
    /// The schedule rows.
    pub schedule: Vec<EarnedLeaveScheduleRow>,
    /// Sum of the scheduled leaves.
    pub total_leaves: Decimal,
}

/// Body of `POST /overtime-slips/eligible-employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleEmployeesResponse {
    /// Employees with overtime and no slip for the period.
    pub employees: Vec<String>,
}
