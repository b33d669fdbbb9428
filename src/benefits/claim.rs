//! Employee benefit claims.
//!
//! A claim pays out a flexible benefit through additional salary on its
//! payroll date. What can be claimed depends on the component's payout
//! method and on the employee's benefit ledger for the payroll period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{ConfigLoader, PayoutMethod};
use crate::dates::{first_day_of_month, last_day_of_month, start_end_dates};
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    Employee, EmployeeBenefitClaim, LifecycleAction, PayrollPeriod, SalaryStructure,
    SalaryStructureAssignment,
};
use crate::payroll::{
    AdditionalSalaryRequest, SalarySlipRequest, make_salary_slip, submit_additional_salary,
};
use crate::store::Database;

use super::application::benefit_details_source;
use super::ledger::{ClaimableBenefit, max_claim_eligible};

const DOCTYPE: &str = "Employee Benefit Claim";

fn salary_structure_assignment<'a>(
    db: &'a Database,
    employee: &str,
    date: NaiveDate,
) -> HrmsResult<&'a SalaryStructureAssignment> {
    db.assigned_salary_structure(employee, date).ok_or_else(|| {
        HrmsError::validation(
            DOCTYPE,
            format!(
                "Salary Structure Assignment not found for employee {} on date {}",
                employee, date
            ),
        )
    })
}

fn payroll_period<'a>(
    db: &'a Database,
    company: &str,
    date: NaiveDate,
) -> HrmsResult<&'a PayrollPeriod> {
    db.payroll_period_for(company, date).ok_or_else(|| {
        HrmsError::validation(
            DOCTYPE,
            format!("No payroll period found for company {} on {}", company, date),
        )
    })
}

/// The benefit accrued for a component in the payroll cycle of `payroll_date`,
/// read from a salary slip preview.
fn current_cycle_benefit_amount(
    config: &ConfigLoader,
    db: &Database,
    assignment: &SalaryStructureAssignment,
    salary_component: &str,
    payroll_date: NaiveDate,
) -> HrmsResult<Decimal> {
    let structure = db.get::<SalaryStructure>(&assignment.salary_structure)?;
    let cycle = start_end_dates(structure.payroll_frequency, payroll_date);
    let mut request = SalarySlipRequest::new(
        &assignment.employee,
        &structure.name,
        cycle.start_date,
        cycle.end_date,
    );
    request.posting_date = payroll_date;
    let preview = make_salary_slip(config, db, &request)?;

    Ok(preview
        .accrued_benefits
        .iter()
        .find(|benefit| benefit.salary_component == salary_component)
        .map(|benefit| benefit.amount)
        .unwrap_or_default())
}

/// Fills in the yearly benefit and the maximum eligible amount of a claim.
///
/// Both are zero when the employee has no yearly amount for the component.
pub fn get_benefit_details(
    config: &ConfigLoader,
    db: &Database,
    claim: &mut EmployeeBenefitClaim,
) -> HrmsResult<()> {
    let period = payroll_period(db, &claim.company, claim.payroll_date)?;
    let assignment = salary_structure_assignment(db, &claim.employee, claim.payroll_date)?;
    let yearly_amount =
        benefit_details_source(db, &claim.employee, Some(&period.name), assignment)
            .and_then(|source| source.yearly_benefit(&claim.earning_component));

    let Some(yearly_amount) = yearly_amount else {
        claim.yearly_benefit = Decimal::ZERO;
        claim.max_amount_eligible = Decimal::ZERO;
        return Ok(());
    };

    let payout_method = config.get_salary_component(&claim.earning_component)?.payout_method;
    let current_cycle_amount = match payout_method {
        Some(PayoutMethod::AccruePerCycle) => current_cycle_benefit_amount(
            config,
            db,
            assignment,
            &claim.earning_component,
            claim.payroll_date,
        )?,
        _ => Decimal::ZERO,
    };
    let benefit = ClaimableBenefit {
        salary_component: &claim.earning_component,
        payout_method,
        yearly_amount,
    };

    let max_amount_eligible = max_claim_eligible(
        config,
        db,
        &claim.employee,
        &period.name,
        &benefit,
        current_cycle_amount,
    )?;
    debug!(
        employee = %claim.employee,
        component = %claim.earning_component,
        yearly_benefit = %yearly_amount,
        current_cycle = %current_cycle_amount,
        max_amount_eligible = %max_amount_eligible,
        "Fetched benefit details"
    );
    claim.yearly_benefit = yearly_amount;
    claim.max_amount_eligible = max_amount_eligible;
    Ok(())
}

/// Validates a benefit claim against `today`.
///
/// The payroll date may not be in the past, the claimed amount must be
/// positive and within the maximum eligible amount, and only one claim per
/// component may be submitted in a calendar month.
pub fn validate_benefit_claim(
    db: &Database,
    claim: &EmployeeBenefitClaim,
    today: NaiveDate,
) -> HrmsResult<()> {
    if claim.payroll_date < today {
        return Err(HrmsError::validation(
            DOCTYPE,
            "Payroll date cannot be in the past. This is to ensure that claims are made for the current or future payroll cycles.",
        ));
    }
    if claim.claimed_amount <= Decimal::ZERO {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Claimed amount of employee {} should be greater than 0",
                claim.employee
            ),
        ));
    }
    if claim.claimed_amount > claim.max_amount_eligible {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Claimed amount of employee {} exceeds maximum amount eligible for claim {}",
                claim.employee, claim.max_amount_eligible
            ),
        ));
    }

    let month_start = first_day_of_month(claim.payroll_date);
    let month_end = last_day_of_month(claim.payroll_date);
    if let Some(existing) = db.benefit_claims.iter().find(|existing| {
        existing.employee == claim.employee
            && existing.earning_component == claim.earning_component
            && existing.payroll_date >= month_start
            && existing.payroll_date <= month_end
            && existing.docstatus.is_submitted()
            && existing.name != claim.name
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "Employee {} has already claimed the benefit '{}' for {} ({}). Only one claim per benefit type is allowed in each payroll cycle.",
                claim.employee,
                claim.earning_component,
                claim.payroll_date.format("%B %Y"),
                existing.name
            ),
        });
    }
    Ok(())
}

/// Fills in a claim's defaults and eligibility, validates it and stores it
/// as a draft.
pub fn create_benefit_claim(
    config: &ConfigLoader,
    db: &mut Database,
    mut claim: EmployeeBenefitClaim,
    today: NaiveDate,
) -> HrmsResult<EmployeeBenefitClaim> {
    let employee = db.get::<Employee>(&claim.employee)?;
    if claim.company.is_empty() {
        claim.company = employee.company.clone();
    }
    if claim.currency.is_empty() {
        claim.currency = config.settings().currency.clone();
    }
    get_benefit_details(config, db, &mut claim)?;
    validate_benefit_claim(db, &claim, today)?;

    let name = db.insert(claim);
    info!(claim = %name, "Created benefit claim");
    Ok(db.get::<EmployeeBenefitClaim>(&name)?.clone())
}

/// Submits a draft claim and raises the additional salary that pays it.
pub fn submit_benefit_claim(
    config: &ConfigLoader,
    db: &mut Database,
    name: &str,
    today: NaiveDate,
) -> HrmsResult<EmployeeBenefitClaim> {
    let mut claim = db.get::<EmployeeBenefitClaim>(name)?.clone();
    validate_benefit_claim(db, &claim, today)?;
    claim.docstatus = claim
        .docstatus
        .transition(LifecycleAction::Submit, DOCTYPE, name)?;

    let additional_salary = submit_additional_salary(
        config,
        db,
        AdditionalSalaryRequest {
            employee: &claim.employee,
            company: &claim.company,
            currency: &claim.currency,
            salary_component: &claim.earning_component,
            amount: claim.claimed_amount,
            payroll_date: claim.payroll_date,
            ref_doctype: DOCTYPE,
            ref_docname: name,
        },
    )?;
    db.insert(claim.clone());

    info!(
        claim = %name,
        employee = %claim.employee,
        component = %claim.earning_component,
        amount = %claim.claimed_amount,
        additional_salary = %additional_salary,
        "Submitted benefit claim"
    );
    Ok(claim)
}

/// Benefit components an employee can claim on a date.
///
/// Returns the components of the employee's benefit source that carry a
/// payout method, or nothing when no assignment or payroll period applies.
pub fn claimable_benefit_components(
    config: &ConfigLoader,
    db: &Database,
    employee: &str,
    date: NaiveDate,
    company: &str,
) -> Vec<String> {
    let (Ok(assignment), Ok(period)) = (
        salary_structure_assignment(db, employee, date),
        payroll_period(db, company, date),
    ) else {
        return Vec::new();
    };
    let Some(source) = benefit_details_source(db, employee, Some(&period.name), assignment) else {
        return Vec::new();
    };

    source
        .components()
        .into_iter()
        .filter(|(component, _)| {
            config
                .config()
                .salary_components()
                .get(*component)
                .is_some_and(|component| component.payout_method.is_some())
        })
        .map(|(component, _)| component.to_string())
        .collect()
}
