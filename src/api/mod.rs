//! HTTP API for the HR payroll rules engine.
//!
//! Each endpoint wraps one record operation. Write operations run against a
//! copy of the store that replaces it only on success, and every request is
//! tagged with a correlation id in the logs.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ClaimableComponentsQuery, EarnedLeaveScheduleRequest, EligibleEmployeesRequest,
    LeaveBalanceQuery, SalarySlipDetailsQuery,
};
pub use response::{
    ApiError, ApiErrorResponse, EarnedLeaveScheduleResponse, EligibleEmployeesResponse,
    LeaveBalanceResponse,
};
pub use state::AppState;
