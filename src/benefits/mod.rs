//! Employee benefits: applications, claims and the benefit ledger.
//!
//! Flexible benefits are granted per payroll period, either on the salary
//! structure assignment or through a submitted [`EmployeeBenefitApplication`].
//! Salary slips, arrears and payroll corrections write accruals and payouts
//! to the ledger, and claims are checked against it.
//!
//! [`EmployeeBenefitApplication`]: crate::models::EmployeeBenefitApplication

mod accrued_earnings;
mod application;
mod claim;
mod ledger;

pub use accrued_earnings::{AccruedEarningsFilters, AccruedEarningsRow, accrued_earnings};
pub use application::{
    BenefitSource, benefit_details_source, cancel_benefit_application, create_benefit_application,
    set_benefit_components_and_currency, submit_benefit_application, validate_benefit_application,
};
pub use claim::{
    claimable_benefit_components, create_benefit_claim, get_benefit_details, submit_benefit_claim,
    validate_benefit_claim,
};
pub use ledger::{
    BenefitAmounts, ClaimableBenefit, LedgerReference, benefit_amounts,
    create_ledger_entries_for_salary_slip, delete_benefit_ledger_entries,
    insert_benefit_ledger_entry, max_claim_eligible, validate_benefit_ledger_entry,
};
