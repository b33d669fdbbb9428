//! HTTP request handlers for the HR payroll rules API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::benefits::{
    AccruedEarningsFilters, AccruedEarningsRow, accrued_earnings, claimable_benefit_components,
    create_benefit_application, create_benefit_claim, submit_benefit_application,
    submit_benefit_claim,
};
use crate::error::{HrmsError, HrmsResult};
use crate::leave::{
    EarnedLeaveRunSummary, EarnedLeaveScheduleParams, allocation_balance_on, allocation_on_date,
    build_earned_leave_schedule, cancel_leave_adjustment, run_earned_leave_scheduler,
    submit_leave_adjustment, submit_leave_allocation,
};
use crate::models::{
    Arrear, Employee, EmployeeBenefitApplication, EmployeeBenefitClaim, LeaveAdjustment,
    LeaveAllocation, OvertimeSlip, PayrollCorrection,
};
use crate::payroll::{
    LwpSlipDetails, OvertimeComputation, OvertimeSubmission, cancel_arrear,
    cancel_payroll_correction, compute_overtime_amounts, create_arrear, create_overtime_slip,
    create_payroll_correction, fetch_salary_slip_details,
    filter_employees_for_overtime_slip_creation, submit_arrear, submit_overtime_slip,
    submit_payroll_correction,
};

use super::request::{
    ClaimableComponentsQuery, EarnedLeaveScheduleRequest, EligibleEmployeesRequest,
    LeaveBalanceQuery, SalarySlipDetailsQuery,
};
use super::response::{
    ApiError, ApiErrorResponse, EarnedLeaveScheduleResponse, EligibleEmployeesResponse,
    LeaveBalanceResponse,
};
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/earned-leave/schedule", post(earned_leave_schedule_handler))
        .route("/earned-leave/run", post(earned_leave_run_handler))
        .route("/leave-balance", get(leave_balance_handler))
        .route("/leave-allocations", post(leave_allocation_handler))
        .route("/leave-adjustments", post(leave_adjustment_handler))
        .route("/leave-adjustments/:name/cancel", post(cancel_leave_adjustment_handler))
        .route("/overtime-slips", post(create_overtime_slip_handler))
        .route("/overtime-slips/eligible-employees", post(eligible_employees_handler))
        .route("/overtime-slips/:name/amounts", get(overtime_amounts_handler))
        .route("/overtime-slips/:name/submit", post(submit_overtime_slip_handler))
        .route("/arrears", post(create_arrear_handler))
        .route("/arrears/:name/submit", post(submit_arrear_handler))
        .route("/arrears/:name/cancel", post(cancel_arrear_handler))
        .route("/payroll-corrections", post(create_payroll_correction_handler))
        .route("/payroll-corrections/salary-slips", get(salary_slip_details_handler))
        .route("/payroll-corrections/:name/submit", post(submit_payroll_correction_handler))
        .route("/payroll-corrections/:name/cancel", post(cancel_payroll_correction_handler))
        .route("/benefit-applications", post(create_benefit_application_handler))
        .route("/benefit-applications/:name/submit", post(submit_benefit_application_handler))
        .route("/benefit-claims", post(create_benefit_claim_handler))
        .route("/benefit-claims/components", get(claimable_components_handler))
        .route("/benefit-claims/:name/submit", post(submit_benefit_claim_handler))
        .route("/accrued-earnings", get(accrued_earnings_handler))
        .with_state(state)
}

/// Extracts a JSON body, turning serde errors into API errors.
fn json_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

/// Extracts a query string.
fn query_params<T>(
    correlation_id: Uuid,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiErrorResponse> {
    query.map(|Query(params)| params).map_err(|rejection| {
        let body_text = rejection.body_text();
        warn!(
            correlation_id = %correlation_id,
            error = %body_text,
            "Invalid query string"
        );
        ApiErrorResponse::bad_request(ApiError::validation_error(body_text))
    })
}

/// Logs the outcome of an operation and converts it into a response.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    started: Instant,
    operation: &str,
    result: HrmsResult<T>,
) -> ApiResult<T> {
    let duration_us = started.elapsed().as_micros() as u64;
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us,
                "Request completed successfully"
            );
            Ok(Json(body))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            Err(err.into())
        }
    }
}

/// Handler for POST /earned-leave/schedule.
///
/// Builds the earned leave schedule an allocation would get, without
/// storing anything.
async fn earned_leave_schedule_handler(
    State(state): State<AppState>,
    payload: Result<Json<EarnedLeaveScheduleRequest>, JsonRejection>,
) -> ApiResult<EarnedLeaveScheduleResponse> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %request.employee,
        leave_type = %request.leave_type,
        "Processing earned leave schedule request"
    );

    let assignment_date = request.assignment_date.unwrap_or_else(|| state.today());
    let result = state.read(|config, db| -> HrmsResult<EarnedLeaveScheduleResponse> {
        let employee = db.get::<Employee>(&request.employee)?;
        let leave_type = config.get_leave_type(&request.leave_type)?;
        let policy = leave_type.earned_leave.as_ref().ok_or_else(|| {
            HrmsError::validation(
                "Leave Type",
                format!("Leave Type {} is not an earned leave", request.leave_type),
            )
        })?;
        let schedule = build_earned_leave_schedule(&EarnedLeaveScheduleParams {
            policy,
            date_of_joining: employee.date_of_joining,
            from_date: request.from_date,
            to_date: request.to_date,
            assignment_date,
            max_leaves_allowed: leave_type.max_leaves(),
            float_precision: config.float_precision(),
        })?;
        let total_leaves: Decimal = schedule.iter().map(|row| row.number_of_leaves).sum();
        Ok(EarnedLeaveScheduleResponse {
            employee: request.employee.clone(),
            leave_type: request.leave_type.clone(),
            schedule,
            total_leaves,
        })
    });
    respond(correlation_id, started, "earned_leave_schedule", result)
}

/// Handler for POST /earned-leave/run.
///
/// Credits every earned leave schedule row due today.
async fn earned_leave_run_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<EarnedLeaveRunSummary>> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let today = state.today();
    info!(correlation_id = %correlation_id, today = %today, "Running earned leave scheduler");

    let result = state.write(|config, db| run_earned_leave_scheduler(config, db, today));
    respond(correlation_id, started, "earned_leave_run", result)
}

/// Handler for GET /leave-balance.
async fn leave_balance_handler(
    State(state): State<AppState>,
    query: Result<Query<LeaveBalanceQuery>, QueryRejection>,
) -> ApiResult<LeaveBalanceResponse> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let query = query_params(correlation_id, query)?;
    let date = query.date.unwrap_or_else(|| state.today());

    let result = state.read(|_, db| -> HrmsResult<LeaveBalanceResponse> {
        db.get::<Employee>(&query.employee)?;
        let allocation = allocation_on_date(db, &query.employee, &query.leave_type, date);
        Ok(LeaveBalanceResponse {
            employee: query.employee.clone(),
            leave_type: query.leave_type.clone(),
            date,
            leave_allocation: allocation.map(|allocation| allocation.name.clone()),
            balance: allocation
                .map(|allocation| allocation_balance_on(db, allocation, date))
                .unwrap_or_default(),
        })
    });
    respond(correlation_id, started, "leave_balance", result)
}

/// Handler for POST /leave-allocations.
async fn leave_allocation_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveAllocation>, JsonRejection>,
) -> ApiResult<LeaveAllocation> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let allocation = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %allocation.employee,
        leave_type = %allocation.leave_type,
        "Processing leave allocation"
    );

    let today = state.today();
    let result =
        state.write(move |config, db| submit_leave_allocation(config, db, allocation, today));
    respond(correlation_id, started, "leave_allocation", result)
}

/// Handler for POST /leave-adjustments.
async fn leave_adjustment_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveAdjustment>, JsonRejection>,
) -> ApiResult<LeaveAdjustment> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let adjustment = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %adjustment.employee,
        allocation = %adjustment.leave_allocation,
        "Processing leave adjustment"
    );

    let result = state.write(move |config, db| submit_leave_adjustment(config, db, adjustment));
    respond(correlation_id, started, "leave_adjustment", result)
}

/// Handler for POST /leave-adjustments/:name/cancel.
async fn cancel_leave_adjustment_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<LeaveAdjustment> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|_, db| cancel_leave_adjustment(db, &name));
    respond(correlation_id, started, "cancel_leave_adjustment", result)
}

/// Handler for POST /overtime-slips.
///
/// Creates a draft slip with its overtime rows fetched from attendance.
async fn create_overtime_slip_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeSlip>, JsonRejection>,
) -> ApiResult<OvertimeSlip> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let slip = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %slip.employee,
        posting_date = %slip.posting_date,
        "Processing overtime slip"
    );

    let result = state.write(move |config, db| create_overtime_slip(config, db, slip));
    respond(correlation_id, started, "create_overtime_slip", result)
}

/// Handler for GET /overtime-slips/:name/amounts.
async fn overtime_amounts_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<OvertimeComputation> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.read(|config, db| {
        let slip = db.get::<OvertimeSlip>(&name)?;
        compute_overtime_amounts(config, db, slip)
    });
    respond(correlation_id, started, "overtime_amounts", result)
}

/// Handler for POST /overtime-slips/:name/submit.
async fn submit_overtime_slip_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<OvertimeSubmission> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|config, db| submit_overtime_slip(config, db, &name));
    respond(correlation_id, started, "submit_overtime_slip", result)
}

/// Handler for POST /overtime-slips/eligible-employees.
async fn eligible_employees_handler(
    State(state): State<AppState>,
    payload: Result<Json<EligibleEmployeesRequest>, JsonRejection>,
) -> ApiResult<EligibleEmployeesResponse> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = json_body(correlation_id, payload)?;

    let employees = state.read(|_, db| {
        filter_employees_for_overtime_slip_creation(
            db,
            request.start_date,
            request.end_date,
            &request.employees,
        )
    });
    respond(
        correlation_id,
        started,
        "eligible_employees",
        Ok(EligibleEmployeesResponse { employees }),
    )
}

/// Handler for POST /arrears.
async fn create_arrear_handler(
    State(state): State<AppState>,
    payload: Result<Json<Arrear>, JsonRejection>,
) -> ApiResult<Arrear> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let arrear = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %arrear.employee,
        salary_structure = %arrear.salary_structure,
        "Processing arrear"
    );

    let result = state.write(move |config, db| create_arrear(config, db, arrear));
    respond(correlation_id, started, "create_arrear", result)
}

/// Handler for POST /arrears/:name/submit.
async fn submit_arrear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Arrear> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|config, db| submit_arrear(config, db, &name));
    respond(correlation_id, started, "submit_arrear", result)
}

/// Handler for POST /arrears/:name/cancel.
async fn cancel_arrear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Arrear> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|_, db| cancel_arrear(db, &name));
    respond(correlation_id, started, "cancel_arrear", result)
}

/// Handler for POST /payroll-corrections.
async fn create_payroll_correction_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollCorrection>, JsonRejection>,
) -> ApiResult<PayrollCorrection> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let correction = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %correction.employee,
        salary_slip = %correction.salary_slip_reference,
        "Processing payroll correction"
    );

    let result =
        state.write(move |config, db| create_payroll_correction(config, db, correction));
    respond(correlation_id, started, "create_payroll_correction", result)
}

/// Handler for POST /payroll-corrections/:name/submit.
async fn submit_payroll_correction_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<PayrollCorrection> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|config, db| submit_payroll_correction(config, db, &name));
    respond(correlation_id, started, "submit_payroll_correction", result)
}

/// Handler for POST /payroll-corrections/:name/cancel.
async fn cancel_payroll_correction_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<PayrollCorrection> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|_, db| cancel_payroll_correction(db, &name));
    respond(correlation_id, started, "cancel_payroll_correction", result)
}

/// Handler for GET /payroll-corrections/salary-slips.
///
/// Lists the employee's salary slips with leave without pay.
async fn salary_slip_details_handler(
    State(state): State<AppState>,
    query: Result<Query<SalarySlipDetailsQuery>, QueryRejection>,
) -> ApiResult<LwpSlipDetails> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let query = query_params(correlation_id, query)?;
    let details = state.read(|_, db| {
        fetch_salary_slip_details(db, &query.employee, &query.payroll_period, &query.company)
    });
    respond(correlation_id, started, "salary_slip_details", Ok(details))
}

/// Handler for POST /benefit-applications.
async fn create_benefit_application_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeBenefitApplication>, JsonRejection>,
) -> ApiResult<EmployeeBenefitApplication> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let application = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %application.employee,
        payroll_period = %application.payroll_period,
        "Processing benefit application"
    );

    let result = state.write(move |_, db| create_benefit_application(db, application));
    respond(correlation_id, started, "create_benefit_application", result)
}

/// Handler for POST /benefit-applications/:name/submit.
async fn submit_benefit_application_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<EmployeeBenefitApplication> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.write(|_, db| submit_benefit_application(db, &name));
    respond(correlation_id, started, "submit_benefit_application", result)
}

/// Handler for POST /benefit-claims.
///
/// Fills in the claim's yearly benefit and eligible amount before
/// validating it.
async fn create_benefit_claim_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeBenefitClaim>, JsonRejection>,
) -> ApiResult<EmployeeBenefitClaim> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let claim = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        employee = %claim.employee,
        component = %claim.earning_component,
        "Processing benefit claim"
    );

    let today = state.today();
    let result = state.write(move |config, db| create_benefit_claim(config, db, claim, today));
    respond(correlation_id, started, "create_benefit_claim", result)
}

/// Handler for POST /benefit-claims/:name/submit.
async fn submit_benefit_claim_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<EmployeeBenefitClaim> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let today = state.today();
    let result = state.write(|config, db| submit_benefit_claim(config, db, &name, today));
    respond(correlation_id, started, "submit_benefit_claim", result)
}

/// Handler for GET /benefit-claims/components.
async fn claimable_components_handler(
    State(state): State<AppState>,
    query: Result<Query<ClaimableComponentsQuery>, QueryRejection>,
) -> ApiResult<Vec<String>> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let query = query_params(correlation_id, query)?;
    let components = state.read(|config, db| {
        claimable_benefit_components(config, db, &query.employee, query.date, &query.company)
    });
    respond(correlation_id, started, "claimable_components", Ok(components))
}

/// Handler for GET /accrued-earnings.
async fn accrued_earnings_handler(
    State(state): State<AppState>,
    query: Result<Query<AccruedEarningsFilters>, QueryRejection>,
) -> ApiResult<Vec<AccruedEarningsRow>> {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let filters = query_params(correlation_id, query)?;
    let rows = state.read(|config, db| accrued_earnings(config, db, &filters));
    respond(correlation_id, started, "accrued_earnings", Ok(rows))
}
