//! Salary arrears.
//!
//! When a salary structure is assigned retroactively, the slips already
//! processed from the arrear start date paid the old amounts. An arrear
//! previews each of those slips again under the new structure and pays the
//! positive difference of every arrear component: earnings and deductions as
//! additional salary, accruals as benefit ledger entries.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::benefits::{
    LedgerReference, delete_benefit_ledger_entries, insert_benefit_ledger_entry,
};
use crate::config::ConfigLoader;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    Arrear, BenefitLedgerEntry, BenefitTransactionType, ComponentAmount, Employee,
    LifecycleAction, PayrollCorrection, PayrollPeriod, SalarySlip,
};
use crate::rounding::flt;
use crate::store::Database;

use super::additional_salary::{AdditionalSalaryRequest, submit_additional_salary};
use super::salary_slip::{SalarySlipRequest, make_salary_slip};

const DOCTYPE: &str = "Arrear";

/// Amounts per salary component, split by where they are paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentTotals {
    /// Earning components.
    pub earnings: BTreeMap<String, Decimal>,
    /// Deduction components.
    pub deductions: BTreeMap<String, Decimal>,
    /// Accrued benefit components.
    pub accruals: BTreeMap<String, Decimal>,
}

impl ComponentTotals {
    /// Returns true when no section holds a component.
    pub fn is_empty(&self) -> bool {
        self.earnings.is_empty() && self.deductions.is_empty() && self.accruals.is_empty()
    }

    fn add(section: &mut BTreeMap<String, Decimal>, component: &str, amount: Decimal) {
        *section.entry(component.to_string()).or_insert(Decimal::ZERO) += amount;
    }
}

/// Positive differences of new over existing amounts, per component.
///
/// Components only present in `existing` and components that went down are
/// left out. Fails when no component went up.
///
/// # Example
///
/// ```
/// use hrms_rules::payroll::{ComponentTotals, compute_component_differences};
/// use rust_decimal::Decimal;
///
/// let mut existing = ComponentTotals::default();
/// existing.earnings.insert("Basic Salary".to_string(), Decimal::new(50000, 0));
/// let mut new = ComponentTotals::default();
/// new.earnings.insert("Basic Salary".to_string(), Decimal::new(75000, 0));
///
/// let differences = compute_component_differences(&existing, &new).unwrap();
/// assert_eq!(differences.earnings["Basic Salary"], Decimal::new(25000, 0));
/// ```
pub fn compute_component_differences(
    existing: &ComponentTotals,
    new: &ComponentTotals,
) -> HrmsResult<ComponentTotals> {
    fn positive(
        existing: &BTreeMap<String, Decimal>,
        new: &BTreeMap<String, Decimal>,
    ) -> BTreeMap<String, Decimal> {
        new.iter()
            .filter_map(|(component, amount)| {
                let difference = *amount - existing.get(component).copied().unwrap_or_default();
                (difference > Decimal::ZERO).then(|| (component.clone(), difference))
            })
            .collect()
    }

    let differences = ComponentTotals {
        earnings: positive(&existing.earnings, &new.earnings),
        deductions: positive(&existing.deductions, &new.deductions),
        accruals: positive(&existing.accruals, &new.accruals),
    };
    if differences.is_empty() {
        return Err(HrmsError::validation(
            DOCTYPE,
            "There are no arrear differences between existing and new salary structure components.",
        ));
    }
    Ok(differences)
}

fn is_arrear_component(config: &ConfigLoader, component: &str) -> bool {
    config
        .config()
        .salary_components()
        .get(component)
        .is_some_and(|component| component.arrear_component)
}

/// Submitted salary slips of the employee starting on or after the arrear start.
fn existing_salary_slips<'a>(
    db: &'a Database,
    arrear: &Arrear,
) -> HrmsResult<Vec<&'a SalarySlip>> {
    let mut slips: Vec<_> = db
        .salary_slips
        .iter()
        .filter(|slip| {
            slip.employee == arrear.employee
                && slip.docstatus.is_submitted()
                && slip.start_date >= arrear.arrear_start_date
        })
        .collect();
    if slips.is_empty() {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "No salary slips found for the selected employee from {}",
                arrear.arrear_start_date
            ),
        ));
    }
    slips.sort_by_key(|slip| slip.start_date);
    Ok(slips)
}

fn submitted_corrections<'a>(
    db: &'a Database,
    slip: &'a SalarySlip,
) -> impl Iterator<Item = &'a PayrollCorrection> {
    db.payroll_corrections.iter().filter(move |correction| {
        correction.salary_slip_reference == slip.name && correction.docstatus.is_submitted()
    })
}

/// Amounts already paid on the slips, including payroll corrections of them.
fn existing_component_totals(
    config: &ConfigLoader,
    db: &Database,
    slips: &[&SalarySlip],
) -> HrmsResult<ComponentTotals> {
    let mut totals = ComponentTotals::default();
    for slip in slips {
        for (section, rows) in [
            (&mut totals.earnings, &slip.earnings),
            (&mut totals.deductions, &slip.deductions),
        ] {
            for row in rows.iter().filter(|row| {
                row.additional_salary.is_none()
                    && !row.variable_based_on_taxable_salary
                    && is_arrear_component(config, &row.salary_component)
            }) {
                ComponentTotals::add(section, &row.salary_component, row.amount);
            }
        }
        for row in slip
            .accrued_benefits
            .iter()
            .filter(|row| is_arrear_component(config, &row.salary_component))
        {
            ComponentTotals::add(&mut totals.accruals, &row.salary_component, row.amount);
        }

        for correction in submitted_corrections(db, slip) {
            for (section, rows) in [
                (&mut totals.earnings, &correction.earning_arrears),
                (&mut totals.deductions, &correction.deduction_arrears),
                (&mut totals.accruals, &correction.accrual_arrears),
            ] {
                for row in rows
                    .iter()
                    .filter(|row| is_arrear_component(config, &row.salary_component))
                {
                    ComponentTotals::add(section, &row.salary_component, row.amount);
                }
            }
        }
    }

    if totals.is_empty() {
        return Err(HrmsError::validation(
            DOCTYPE,
            "No arrear components found in the existing salary slips.",
        ));
    }
    Ok(totals)
}

/// Amounts the slips would have paid under the arrear's salary structure.
fn preview_component_totals(
    config: &ConfigLoader,
    db: &Database,
    arrear: &Arrear,
    slips: &[&SalarySlip],
) -> HrmsResult<ComponentTotals> {
    let mut totals = ComponentTotals::default();
    for slip in slips {
        let lwp_days_corrected: Decimal = submitted_corrections(db, slip)
            .map(|correction| correction.days_to_reverse)
            .sum();
        let preview = make_salary_slip(
            config,
            db,
            &SalarySlipRequest {
                employee: &arrear.employee,
                salary_structure: &arrear.salary_structure,
                posting_date: slip.posting_date,
                start_date: slip.start_date,
                end_date: slip.end_date,
                leave_without_pay: slip.leave_without_pay,
                lwp_days_corrected,
            },
        )?;

        for row in preview.earnings.iter().filter(|row| {
            row.additional_salary.is_none() && is_arrear_component(config, &row.salary_component)
        }) {
            ComponentTotals::add(&mut totals.earnings, &row.salary_component, row.amount);
        }
        for row in preview.deductions.iter().filter(|row| {
            row.additional_salary.is_none()
                && !row.variable_based_on_taxable_salary
                && is_arrear_component(config, &row.salary_component)
        }) {
            ComponentTotals::add(&mut totals.deductions, &row.salary_component, row.amount);
        }
        for row in preview
            .accrued_benefits
            .iter()
            .filter(|row| is_arrear_component(config, &row.salary_component))
        {
            ComponentTotals::add(&mut totals.accruals, &row.salary_component, row.amount);
        }
    }
    Ok(totals)
}

fn rows(section: &BTreeMap<String, Decimal>, precision: u32) -> Vec<ComponentAmount> {
    section
        .iter()
        .map(|(component, amount)| {
            ComponentAmount::new(component.as_str(), flt(*amount, precision))
        })
        .collect()
}

/// Validates an arrear and fills in its arrear rows.
///
/// The arrear start must fall inside the payroll period, the employee must
/// have a submitted assignment of the structure starting on or after the
/// arrear start, and no other submitted arrear may exist for the same
/// employee, structure and payroll period.
pub fn validate_arrear(
    config: &ConfigLoader,
    db: &Database,
    arrear: &mut Arrear,
) -> HrmsResult<()> {
    let employee = db.get::<Employee>(&arrear.employee)?;
    if arrear.employee_name.is_empty() {
        arrear.employee_name = employee.employee_name.clone();
    }
    if arrear.company.is_empty() {
        arrear.company = employee.company.clone();
    }
    if arrear.currency.is_empty() {
        arrear.currency = config.settings().currency.clone();
    }

    let period = db.get::<PayrollPeriod>(&arrear.payroll_period)?;
    if arrear.arrear_start_date < period.start_date {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "From Date {} cannot be before Payroll Period start date {}",
                arrear.arrear_start_date, period.start_date
            ),
        ));
    }
    if arrear.arrear_start_date > period.end_date {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "From Date {} cannot be after Payroll Period end date {}",
                arrear.arrear_start_date, period.end_date
            ),
        ));
    }

    let assigned = db.salary_structure_assignments.iter().any(|ssa| {
        ssa.employee == arrear.employee
            && ssa.salary_structure == arrear.salary_structure
            && ssa.docstatus.is_submitted()
            && ssa.from_date >= arrear.arrear_start_date
    });
    if !assigned {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "No active Salary Structure Assignment found for employee {} with salary structure {} on or after arrear start date {}",
                arrear.employee, arrear.salary_structure, arrear.arrear_start_date
            ),
        ));
    }

    if let Some(existing) = db.arrears.iter().find(|other| {
        other.name != arrear.name
            && other.employee == arrear.employee
            && other.salary_structure == arrear.salary_structure
            && other.payroll_period == arrear.payroll_period
            && other.docstatus.is_submitted()
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "An Arrear document already exists for employee {} with salary structure {} in payroll period {}",
                arrear.employee, arrear.salary_structure, arrear.payroll_period
            ),
        });
    }

    let slips = existing_salary_slips(db, arrear)?;
    let existing = existing_component_totals(config, db, &slips)?;
    let new = preview_component_totals(config, db, arrear, &slips)?;
    let differences = compute_component_differences(&existing, &new)?;

    let precision = config.currency_precision();
    arrear.earning_arrears = rows(&differences.earnings, precision);
    arrear.deduction_arrears = rows(&differences.deductions, precision);
    arrear.accrual_arrears = rows(&differences.accruals, precision);

    debug!(
        employee = %arrear.employee,
        slips = slips.len(),
        earnings = arrear.earning_arrears.len(),
        deductions = arrear.deduction_arrears.len(),
        accruals = arrear.accrual_arrears.len(),
        "Computed arrear differences"
    );
    Ok(())
}

/// Validates an arrear and stores it as a draft.
pub fn create_arrear(
    config: &ConfigLoader,
    db: &mut Database,
    mut arrear: Arrear,
) -> HrmsResult<Arrear> {
    validate_arrear(config, db, &mut arrear)?;
    let name = db.insert(arrear);
    info!(arrear = %name, "Created arrear");
    Ok(db.get::<Arrear>(&name)?.clone())
}

/// Submits a draft arrear.
///
/// Raises additional salary for each earning and deduction row dated on the
/// arrear's payroll date, and an accrual ledger entry for each accrual row.
pub fn submit_arrear(config: &ConfigLoader, db: &mut Database, name: &str) -> HrmsResult<Arrear> {
    let mut arrear = db.get::<Arrear>(name)?.clone();
    validate_arrear(config, db, &mut arrear)?;
    if arrear.earning_arrears.is_empty()
        && arrear.deduction_arrears.is_empty()
        && arrear.accrual_arrears.is_empty()
    {
        return Err(HrmsError::validation(DOCTYPE, "No arrear details found"));
    }
    arrear.docstatus = arrear
        .docstatus
        .transition(LifecycleAction::Submit, DOCTYPE, name)?;

    for row in arrear
        .earning_arrears
        .iter()
        .chain(&arrear.deduction_arrears)
        .filter(|row| !row.amount.is_zero())
    {
        submit_additional_salary(
            config,
            db,
            AdditionalSalaryRequest {
                employee: &arrear.employee,
                company: &arrear.company,
                currency: &arrear.currency,
                salary_component: &row.salary_component,
                amount: row.amount,
                payroll_date: arrear.payroll_date,
                ref_doctype: DOCTYPE,
                ref_docname: name,
            },
        )?;
    }
    for row in arrear.accrual_arrears.iter().filter(|row| !row.amount.is_zero()) {
        let flexible_benefit = config
            .get_salary_component(&row.salary_component)?
            .is_flexible_benefit;
        insert_benefit_ledger_entry(
            config,
            db,
            BenefitLedgerEntry {
                name: String::new(),
                employee: arrear.employee.clone(),
                employee_name: arrear.employee_name.clone(),
                company: arrear.company.clone(),
                posting_date: None,
                payroll_period: arrear.payroll_period.clone(),
                salary_component: row.salary_component.clone(),
                transaction_type: BenefitTransactionType::Accrual,
                amount: row.amount,
                yearly_benefit: Decimal::ZERO,
                flexible_benefit,
                reference_doctype: Some(DOCTYPE.to_string()),
                reference_document: Some(name.to_string()),
                salary_slip: None,
                remarks: Some("Accrual via Arrears".to_string()),
            },
        )?;
    }
    db.insert(arrear.clone());

    info!(
        arrear = %name,
        employee = %arrear.employee,
        payroll_date = %arrear.payroll_date,
        "Submitted arrear"
    );
    Ok(arrear)
}

/// Cancels a submitted arrear and deletes the ledger entries it wrote.
pub fn cancel_arrear(db: &mut Database, name: &str) -> HrmsResult<Arrear> {
    let arrear = db.get_mut::<Arrear>(name)?;
    arrear.docstatus = arrear
        .docstatus
        .transition(LifecycleAction::Cancel, DOCTYPE, name)?;
    let arrear = arrear.clone();

    let deleted = delete_benefit_ledger_entries(db, LedgerReference::Document(name));
    info!(arrear = %name, deleted, "Cancelled arrear");
    Ok(arrear)
}
