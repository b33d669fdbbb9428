//! Salary slip preview and submission.
//!
//! A preview applies a salary structure to one payroll cycle of an employee:
//! working days exclude holidays, payment days exclude unpaid leave, and
//! components that depend on payment days are prorated. Arrears, overtime and
//! benefit claims all read amounts from such previews.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::benefits::{benefit_details_source, create_ledger_entries_for_salary_slip};
use crate::benefits::{LedgerReference, delete_benefit_ledger_entries};
use crate::config::{ConfigLoader, PayoutMethod};
use crate::dates::days_inclusive;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AccruedBenefit, ComponentType, DocStatus, Employee, LifecycleAction, SalaryDetail,
    SalarySlip, SalaryStructure, SalaryStructureAssignment, StructureLine,
};
use crate::rounding::flt;
use crate::store::Database;

const DOCTYPE: &str = "Salary Slip";

/// The cycle and structure a salary slip is previewed for.
#[derive(Debug, Clone)]
pub struct SalarySlipRequest<'a> {
    /// Employee paid.
    pub employee: &'a str,
    /// Salary structure applied.
    pub salary_structure: &'a str,
    /// Posting date of the slip.
    pub posting_date: NaiveDate,
    /// First day of the payroll cycle.
    pub start_date: NaiveDate,
    /// Last day of the payroll cycle.
    pub end_date: NaiveDate,
    /// Days of leave without pay in the cycle.
    pub leave_without_pay: Decimal,
    /// Leave without pay days already reversed by payroll corrections.
    pub lwp_days_corrected: Decimal,
}

impl<'a> SalarySlipRequest<'a> {
    /// A request for a cycle without unpaid leave.
    pub fn new(
        employee: &'a str,
        salary_structure: &'a str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            employee,
            salary_structure,
            posting_date: end_date,
            start_date,
            end_date,
            leave_without_pay: Decimal::ZERO,
            lwp_days_corrected: Decimal::ZERO,
        }
    }
}

/// The submitted assignment of a structure applied to a cycle ending on `end_date`.
///
/// Prefers the latest assignment starting on or before `end_date`. A
/// structure assigned retroactively from a later date falls back to its
/// earliest assignment.
fn structure_assignment<'a>(
    db: &'a Database,
    employee: &str,
    salary_structure: &str,
    end_date: NaiveDate,
) -> Option<&'a SalaryStructureAssignment> {
    let assignments = || {
        db.salary_structure_assignments.iter().filter(|ssa| {
            ssa.employee == employee
                && ssa.salary_structure == salary_structure
                && ssa.docstatus.is_submitted()
        })
    };
    assignments()
        .filter(|ssa| ssa.from_date <= end_date)
        .max_by_key(|ssa| ssa.from_date)
        .or_else(|| assignments().min_by_key(|ssa| ssa.from_date))
}

/// Days between two dates, less holidays unless holidays count as working days.
fn working_days_between(
    config: &ConfigLoader,
    db: &Database,
    employee: &Employee,
    from_date: NaiveDate,
    to_date: NaiveDate,
) -> Decimal {
    if from_date > to_date {
        return Decimal::ZERO;
    }
    let mut days = days_inclusive(from_date, to_date);
    if !config.settings().include_holidays_in_total_working_days {
        days -= db.holidays_between(employee, from_date, to_date).len() as i64;
    }
    Decimal::from(days.max(0))
}

struct Proration {
    working_days: Decimal,
    payment_days: Decimal,
    precision: u32,
}

impl Proration {
    fn apply(&self, amount: Decimal, depends_on_payment_days: bool) -> Decimal {
        if !depends_on_payment_days || self.payment_days == self.working_days {
            return amount;
        }
        if self.working_days.is_zero() {
            return Decimal::ZERO;
        }
        flt(amount * self.payment_days / self.working_days, self.precision)
    }
}

fn structure_rows(
    config: &ConfigLoader,
    lines: &[StructureLine],
    base: Decimal,
    proration: &Proration,
) -> HrmsResult<Vec<SalaryDetail>> {
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let component = config.get_salary_component(&line.salary_component)?;
        if component.disabled {
            continue;
        }
        let default_amount = flt(line.amount_for_base(base), proration.precision);
        rows.push(SalaryDetail {
            salary_component: line.salary_component.clone(),
            amount: proration.apply(default_amount, component.depends_on_payment_days),
            default_amount,
            additional_salary: None,
            variable_based_on_taxable_salary: component.variable_based_on_taxable_salary,
        });
    }
    Ok(rows)
}

/// Builds a draft salary slip for one payroll cycle without storing it.
///
/// Structure lines give the earnings, deductions and accruals; submitted
/// additional salary dated inside the cycle is appended to earnings or
/// deductions. Flexible benefits paid per cycle accrue one cycle's share of
/// the yearly amount from the benefit application for the payroll period, or
/// from the structure assignment when there is none.
pub fn make_salary_slip(
    config: &ConfigLoader,
    db: &Database,
    request: &SalarySlipRequest<'_>,
) -> HrmsResult<SalarySlip> {
    if request.start_date > request.end_date {
        return Err(HrmsError::validation(
            DOCTYPE,
            "Start date cannot be greater than end date",
        ));
    }
    let employee = db.get::<Employee>(request.employee)?;
    let structure = db.get::<SalaryStructure>(request.salary_structure)?;
    let assignment = structure_assignment(
        db,
        request.employee,
        request.salary_structure,
        request.end_date,
    )
    .ok_or_else(|| {
        HrmsError::validation(
            DOCTYPE,
            format!(
                "No salary structure assignment found for employee {} with salary structure {}",
                request.employee, request.salary_structure
            ),
        )
    })?;

    let total_working_days =
        working_days_between(config, db, employee, request.start_date, request.end_date);
    let employed_from = request.start_date.max(employee.date_of_joining);
    let employed_to = employee
        .relieving_date
        .map_or(request.end_date, |relieving| relieving.min(request.end_date));
    let unpaid_days = (request.leave_without_pay - request.lwp_days_corrected).max(Decimal::ZERO);
    let payment_days = (working_days_between(config, db, employee, employed_from, employed_to)
        - unpaid_days)
        .max(Decimal::ZERO);

    let proration = Proration {
        working_days: total_working_days,
        payment_days,
        precision: config.currency_precision(),
    };

    let mut earnings = structure_rows(config, &structure.earnings, assignment.base, &proration)?;
    let mut deductions =
        structure_rows(config, &structure.deductions, assignment.base, &proration)?;
    let mut accrued_benefits: Vec<AccruedBenefit> =
        structure_rows(config, &structure.accruals, assignment.base, &proration)?
            .into_iter()
            .map(|row| AccruedBenefit {
                salary_component: row.salary_component,
                amount: row.amount,
            })
            .collect();

    for additional in db.additional_salaries.iter().filter(|row| {
        row.employee == request.employee
            && row.docstatus.is_submitted()
            && row.payroll_date >= request.start_date
            && row.payroll_date <= request.end_date
    }) {
        let row = SalaryDetail {
            salary_component: additional.salary_component.clone(),
            amount: additional.amount,
            default_amount: additional.amount,
            additional_salary: Some(additional.name.clone()),
            variable_based_on_taxable_salary: config
                .config()
                .salary_components()
                .get(&additional.salary_component)
                .is_some_and(|component| component.variable_based_on_taxable_salary),
        };
        match additional.component_type {
            ComponentType::Earning => earnings.push(row),
            ComponentType::Deduction => deductions.push(row),
        }
    }

    let payroll_period = db
        .payroll_period_for(&employee.company, request.start_date)
        .map(|period| period.name.clone());

    if let Some(source) =
        benefit_details_source(db, request.employee, payroll_period.as_deref(), assignment)
    {
        let cycles = Decimal::from(structure.payroll_frequency.cycles_per_year());
        for (component_name, yearly_amount) in source.components() {
            let Some(component) = config.config().salary_components().get(component_name) else {
                continue;
            };
            if !component.is_flexible_benefit
                || component.payout_method != Some(PayoutMethod::AccruePerCycle)
                || accrued_benefits
                    .iter()
                    .any(|row| row.salary_component == component_name)
            {
                continue;
            }
            let per_cycle = flt(yearly_amount / cycles, proration.precision);
            accrued_benefits.push(AccruedBenefit {
                salary_component: component_name.to_string(),
                amount: proration.apply(per_cycle, component.depends_on_payment_days),
            });
        }
    }

    debug!(
        employee = %request.employee,
        structure = %request.salary_structure,
        start_date = %request.start_date,
        end_date = %request.end_date,
        working_days = %total_working_days,
        payment_days = %payment_days,
        "Previewed salary slip"
    );

    Ok(SalarySlip {
        name: String::new(),
        employee: request.employee.to_string(),
        company: employee.company.clone(),
        salary_structure: request.salary_structure.to_string(),
        posting_date: request.posting_date,
        start_date: request.start_date,
        end_date: request.end_date,
        payroll_period,
        total_working_days,
        payment_days,
        leave_without_pay: request.leave_without_pay,
        earnings,
        deductions,
        accrued_benefits,
        docstatus: DocStatus::Draft,
    })
}

/// Submits a salary slip and records its benefit accruals and payouts.
///
/// Fails with [`HrmsError::Duplicate`] when another submitted slip of the
/// employee overlaps the cycle.
pub fn submit_salary_slip(
    config: &ConfigLoader,
    db: &mut Database,
    mut slip: SalarySlip,
) -> HrmsResult<SalarySlip> {
    if let Some(existing) = db.salary_slips.iter().find(|other| {
        other.name != slip.name
            && other.employee == slip.employee
            && other.docstatus.is_submitted()
            && other.start_date <= slip.end_date
            && other.end_date >= slip.start_date
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "Salary Slip of employee {} already created for this period",
                slip.employee
            ),
        });
    }
    slip.docstatus = slip
        .docstatus
        .transition(LifecycleAction::Submit, DOCTYPE, &slip.name)?;

    let name = db.insert(slip);
    let slip = db.get::<SalarySlip>(&name)?.clone();
    let entries = create_ledger_entries_for_salary_slip(config, db, &slip)?;

    info!(
        salary_slip = %name,
        employee = %slip.employee,
        start_date = %slip.start_date,
        payment_days = %slip.payment_days,
        benefit_entries = entries,
        "Submitted salary slip"
    );
    Ok(slip)
}

/// Cancels a submitted salary slip and deletes its benefit ledger entries.
pub fn cancel_salary_slip(db: &mut Database, name: &str) -> HrmsResult<SalarySlip> {
    let slip = db.get_mut::<SalarySlip>(name)?;
    slip.docstatus = slip
        .docstatus
        .transition(LifecycleAction::Cancel, DOCTYPE, name)?;
    let slip = slip.clone();

    let deleted = delete_benefit_ledger_entries(db, LedgerReference::SalarySlip(name));
    info!(salary_slip = %name, deleted, "Cancelled salary slip");
    Ok(slip)
}
