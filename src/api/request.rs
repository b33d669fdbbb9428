//! Request types for the HR payroll rules API.
//!
//! Endpoints that create a record take the record itself as the body. The
//! types here cover the endpoints that take a query instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request body for `POST /earned-leave/schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedLeaveScheduleRequest {
    /// The employee.
    pub employee: String,
    /// An earned leave type.
    pub leave_type: String,
    /// First day of the allocation.
    pub from_date: NaiveDate,
    /// Last day of the allocation.
    pub to_date: NaiveDate,
    /// The date the policy is assigned. Defaults to today.
    #[serde(default)]
    pub assignment_date: Option<NaiveDate>,
}

/// Query of `GET /leave-balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBalanceQuery {
    /// The employee.
    pub employee: String,
    /// The leave type.
    pub leave_type: String,
    /// The balance date. Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Request body for `POST /overtime-slips/eligible-employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleEmployeesRequest {
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Candidate employees.
    pub employees: Vec<String>,
}

/// Query of `GET /payroll-corrections/salary-slips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalarySlipDetailsQuery {
    /// The employee.
    pub employee: String,
    /// The payroll period.
    pub payroll_period: String,
    /// The company.
    pub company: String,
}

/// Query of `GET /benefit-claims/components`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimableComponentsQuery {
    /// The employee.
    pub employee: String,
    /// The claim date.
    pub date: NaiveDate,
    /// The company.
    pub company: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_request_defaults_assignment_date() {
        let json = r#"{
            "employee": "EMP-0001",
            "leave_type": "Earned Leave",
            "from_date": "2026-01-01",
            "to_date": "2026-12-31"
        }"#;
        let request: EarnedLeaveScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.leave_type, "Earned Leave");
        assert!(request.assignment_date.is_none());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"start_date": "2026-05-01", "end_date": "2026-05-31"}"#;
        let result: Result<EligibleEmployeesRequest, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("missing field `employees`"));
    }
}
