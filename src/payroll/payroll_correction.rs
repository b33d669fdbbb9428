//! Payroll corrections reversing leave without pay.
//!
//! A correction pays back some of the unpaid leave days deducted on a
//! submitted salary slip. Each arrear component of the slip is paid its
//! per-day amount for every reversed day.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::benefits::{
    LedgerReference, delete_benefit_ledger_entries, insert_benefit_ledger_entry,
};
use crate::config::ConfigLoader;
use crate::dates::month_name;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    BenefitLedgerEntry, BenefitTransactionType, ComponentAmount, Employee, LifecycleAction,
    PayrollCorrection, SalaryDetail, SalarySlip,
};
use crate::rounding::flt;
use crate::store::Database;

use super::additional_salary::{AdditionalSalaryRequest, submit_additional_salary};

const DOCTYPE: &str = "Payroll Correction";

/// Validates a payroll correction and fills in its breakup rows.
///
/// Working, payment and unpaid days are read from the referenced slip. The
/// days reversed by all submitted corrections of the slip, this one
/// included, may not exceed its unpaid days. Breakup amounts are the
/// component's default amount per working day (accruals: amount per payment
/// day) times the days reversed, rounded to currency precision.
pub fn validate_payroll_correction(
    config: &ConfigLoader,
    db: &Database,
    correction: &mut PayrollCorrection,
) -> HrmsResult<()> {
    if correction.days_to_reverse <= Decimal::ZERO {
        return Err(HrmsError::validation(
            DOCTYPE,
            "Days to Reverse must be greater than zero.",
        ));
    }
    let employee = db.get::<Employee>(&correction.employee)?;
    let slip = db.get::<SalarySlip>(&correction.salary_slip_reference)?;
    if slip.employee != correction.employee {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Salary Slip {} does not belong to employee {}",
                slip.name, correction.employee
            ),
        ));
    }
    if correction.employee_name.is_empty() {
        correction.employee_name = employee.employee_name.clone();
    }
    if correction.company.is_empty() {
        correction.company = slip.company.clone();
    }
    if correction.currency.is_empty() {
        correction.currency = config.settings().currency.clone();
    }

    correction.working_days = slip.total_working_days;
    correction.payment_days = slip.payment_days;
    correction.lwp_days = (slip.total_working_days - slip.payment_days).max(Decimal::ZERO);

    let total_days_reversed: Decimal = db
        .payroll_corrections
        .iter()
        .filter(|other| {
            other.name != correction.name
                && other.docstatus.is_submitted()
                && other.payroll_period == correction.payroll_period
                && other.salary_slip_reference == correction.salary_slip_reference
                && other.employee == correction.employee
        })
        .map(|other| other.days_to_reverse)
        .sum();
    if total_days_reversed + correction.days_to_reverse > correction.lwp_days {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "You cannot reverse more than the total LWP days {}. You have already reversed {} days for this employee.",
                correction.lwp_days, total_days_reversed
            ),
        ));
    }

    populate_breakup(config, slip, correction);
    Ok(())
}

fn populate_breakup(
    config: &ConfigLoader,
    slip: &SalarySlip,
    correction: &mut PayrollCorrection,
) {
    let precision = config.currency_precision();
    let days_to_reverse = correction.days_to_reverse;
    let is_correctable = |component: &str| {
        config
            .config()
            .salary_components()
            .get(component)
            .is_some_and(|component| {
                component.arrear_component
                    && !component.variable_based_on_taxable_salary
                    && !component.disabled
            })
    };
    let per_day = |amount: Decimal, days: Decimal| {
        let days = if days > Decimal::ZERO { days } else { Decimal::ONE };
        flt(amount / days * days_to_reverse, precision)
    };

    let breakup = |rows: &[SalaryDetail]| -> Vec<ComponentAmount> {
        let mut arrears = Vec::new();
        for row in rows
            .iter()
            .filter(|row| row.additional_salary.is_none() && is_correctable(&row.salary_component))
        {
            upsert_component(
                &mut arrears,
                &row.salary_component,
                per_day(row.default_amount, slip.total_working_days),
            );
        }
        arrears
    };
    let earning_arrears = breakup(&slip.earnings);
    let deduction_arrears = breakup(&slip.deductions);
    let mut accrual_arrears = Vec::new();
    for row in slip
        .accrued_benefits
        .iter()
        .filter(|row| is_correctable(&row.salary_component))
    {
        upsert_component(
            &mut accrual_arrears,
            &row.salary_component,
            per_day(row.amount, slip.payment_days),
        );
    }

    if earning_arrears.is_empty() && deduction_arrears.is_empty() && accrual_arrears.is_empty() {
        warn!(
            salary_slip = %slip.name,
            "No arrear components found in the salary slip"
        );
    }
    correction.earning_arrears = earning_arrears;
    correction.deduction_arrears = deduction_arrears;
    correction.accrual_arrears = accrual_arrears;
}

/// One row per component; a later slip row replaces an earlier one.
fn upsert_component(rows: &mut Vec<ComponentAmount>, salary_component: &str, amount: Decimal) {
    match rows.iter_mut().find(|row| row.salary_component == salary_component) {
        Some(row) => row.amount = amount,
        None => rows.push(ComponentAmount::new(salary_component, amount)),
    }
}

/// Validates a payroll correction and stores it as a draft.
pub fn create_payroll_correction(
    config: &ConfigLoader,
    db: &mut Database,
    mut correction: PayrollCorrection,
) -> HrmsResult<PayrollCorrection> {
    validate_payroll_correction(config, db, &mut correction)?;
    let name = db.insert(correction);
    info!(payroll_correction = %name, "Created payroll correction");
    Ok(db.get::<PayrollCorrection>(&name)?.clone())
}

/// Submits a draft payroll correction.
///
/// Raises additional salary for each earning and deduction row and an
/// accrual ledger entry, referencing the corrected slip, for each accrual row.
pub fn submit_payroll_correction(
    config: &ConfigLoader,
    db: &mut Database,
    name: &str,
) -> HrmsResult<PayrollCorrection> {
    let mut correction = db.get::<PayrollCorrection>(name)?.clone();
    validate_payroll_correction(config, db, &mut correction)?;
    if correction.earning_arrears.is_empty()
        && correction.deduction_arrears.is_empty()
        && correction.accrual_arrears.is_empty()
    {
        return Err(HrmsError::validation(DOCTYPE, "No arrear details found"));
    }
    correction.docstatus = correction
        .docstatus
        .transition(LifecycleAction::Submit, DOCTYPE, name)?;

    for row in correction
        .earning_arrears
        .iter()
        .chain(&correction.deduction_arrears)
    {
        submit_additional_salary(
            config,
            db,
            AdditionalSalaryRequest {
                employee: &correction.employee,
                company: &correction.company,
                currency: &correction.currency,
                salary_component: &row.salary_component,
                amount: row.amount,
                payroll_date: correction.payroll_date,
                ref_doctype: DOCTYPE,
                ref_docname: name,
            },
        )?;
    }
    for row in correction
        .accrual_arrears
        .iter()
        .filter(|row| !row.amount.is_zero())
    {
        let flexible_benefit = config
            .get_salary_component(&row.salary_component)?
            .is_flexible_benefit;
        insert_benefit_ledger_entry(
            config,
            db,
            BenefitLedgerEntry {
                name: String::new(),
                employee: correction.employee.clone(),
                employee_name: correction.employee_name.clone(),
                company: correction.company.clone(),
                posting_date: None,
                payroll_period: correction.payroll_period.clone(),
                salary_component: row.salary_component.clone(),
                transaction_type: BenefitTransactionType::Accrual,
                amount: row.amount,
                yearly_benefit: Decimal::ZERO,
                flexible_benefit,
                reference_doctype: Some(DOCTYPE.to_string()),
                reference_document: Some(name.to_string()),
                salary_slip: Some(correction.salary_slip_reference.clone()),
                remarks: Some("Accrual via Payroll Correction".to_string()),
            },
        )?;
    }
    db.insert(correction.clone());

    info!(
        payroll_correction = %name,
        salary_slip = %correction.salary_slip_reference,
        days_to_reverse = %correction.days_to_reverse,
        "Submitted payroll correction"
    );
    Ok(correction)
}

/// Cancels a submitted payroll correction and deletes the ledger entries it wrote.
pub fn cancel_payroll_correction(db: &mut Database, name: &str) -> HrmsResult<PayrollCorrection> {
    let correction = db.get_mut::<PayrollCorrection>(name)?;
    correction.docstatus =
        correction
            .docstatus
            .transition(LifecycleAction::Cancel, DOCTYPE, name)?;
    let correction = correction.clone();

    let deleted = delete_benefit_ledger_entries(db, LedgerReference::Document(name));
    info!(payroll_correction = %name, deleted, "Cancelled payroll correction");
    Ok(correction)
}

/// A salary slip with leave without pay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LwpSlipDetail {
    /// The salary slip.
    pub salary_slip_reference: String,
    /// Days of leave without pay.
    pub leave_without_pay: Decimal,
    /// Month the slip starts in.
    pub month_name: String,
    /// Working days of the slip.
    pub working_days: Decimal,
    /// Payment days of the slip.
    pub payment_days: Decimal,
    /// First day of the slip.
    pub start_date: NaiveDate,
}

/// Slips with leave without pay an employee could be corrected for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LwpSlipDetails {
    /// Names of the months with such slips, sorted alphabetically.
    pub months: Vec<String>,
    /// The slips, in date order.
    pub slip_details: Vec<LwpSlipDetail>,
}

/// Lists the submitted salary slips of an employee in a payroll period and
/// company that deducted leave without pay.
pub fn fetch_salary_slip_details(
    db: &Database,
    employee: &str,
    payroll_period: &str,
    company: &str,
) -> LwpSlipDetails {
    let mut slips: Vec<&SalarySlip> = db
        .salary_slips
        .iter()
        .filter(|slip| {
            slip.employee == employee
                && slip.docstatus.is_submitted()
                && slip.payroll_period.as_deref() == Some(payroll_period)
                && slip.company == company
                && slip.leave_without_pay > Decimal::ZERO
        })
        .collect();
    slips.sort_by_key(|slip| slip.start_date);

    let mut months = BTreeSet::new();
    let mut details = LwpSlipDetails::default();
    for slip in slips {
        let month = month_name(slip.start_date);
        months.insert(month);
        details.slip_details.push(LwpSlipDetail {
            salary_slip_reference: slip.name.clone(),
            leave_without_pay: slip.leave_without_pay,
            month_name: month.to_string(),
            working_days: slip.total_working_days,
            payment_days: slip.payment_days,
            start_date: slip.start_date,
        });
    }
    details.months = months.into_iter().map(str::to_string).collect();
    details
}
