//! Payroll rules: salary slip previews, overtime, arrears and payroll corrections.
//!
//! Each record type exposes its lifecycle as plain functions: `validate_*`
//! fills in computed fields and rejects invalid records, `create_*` stores a
//! validated draft, `submit_*` writes the side effects (additional salary,
//! benefit ledger entries) and `cancel_*` reverses them.

mod additional_salary;
mod arrear;
mod overtime_slip;
mod overtime_type;
mod payroll_correction;
mod salary_slip;

pub use additional_salary::{
    AdditionalSalaryRequest, additional_salaries_for, submit_additional_salary,
};
pub use arrear::{
    ComponentTotals, cancel_arrear, compute_component_differences, create_arrear, submit_arrear,
    validate_arrear,
};
pub use overtime_slip::{
    BatchOutcome, BatchStatus, OvertimeComputation, OvertimeSubmission,
    compute_overtime_amounts, create_overtime_slip, create_overtime_slips_for_employees,
    fetch_overtime_details, filter_employees_for_overtime_slip_creation, submit_overtime_slip,
    submit_overtime_slips, validate_overtime_slip,
};
pub use overtime_type::validate_overtime_type;
pub use payroll_correction::{
    LwpSlipDetail, LwpSlipDetails, cancel_payroll_correction, create_payroll_correction,
    fetch_salary_slip_details, submit_payroll_correction, validate_payroll_correction,
};
pub use salary_slip::{SalarySlipRequest, cancel_salary_slip, make_salary_slip, submit_salary_slip};
