//! Overtime slips.
//!
//! An overtime slip collects the overtime an employee worked in one payroll
//! cycle, usually from marked attendance. On submission each detail row is
//! priced at the hourly rate of its overtime type and the day multiplier, and
//! one additional salary row is raised per overtime salary component.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::{ConfigLoader, OvertimeCalculationMethod, OvertimeType};
use crate::dates::start_end_dates;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AttendanceStatus, AuditStep, Employee, LifecycleAction, OvertimeDetail, OvertimeSlip,
    SalarySlip, SalaryStructure,
};
use crate::rounding::flt;
use crate::store::Database;

use super::additional_salary::{AdditionalSalaryRequest, submit_additional_salary};
use super::salary_slip::{SalarySlipRequest, make_salary_slip};

const DOCTYPE: &str = "Overtime Slip";

/// Fills in the payroll cycle of the salary structure assigned on the posting date.
fn set_frequency_and_dates(db: &Database, slip: &mut OvertimeSlip) -> HrmsResult<()> {
    let assignment = db
        .assigned_salary_structure(&slip.employee, slip.posting_date)
        .ok_or_else(|| {
            HrmsError::validation(
                DOCTYPE,
                format!(
                    "Salary Structure not assigned for employee {} for date {}",
                    slip.employee, slip.posting_date
                ),
            )
        })?;
    let structure = db.get::<SalaryStructure>(&assignment.salary_structure)?;
    let cycle = start_end_dates(structure.payroll_frequency, slip.posting_date);
    slip.start_date = Some(cycle.start_date);
    slip.end_date = Some(cycle.end_date);
    Ok(())
}

fn slip_dates(slip: &OvertimeSlip) -> HrmsResult<(NaiveDate, NaiveDate)> {
    match (slip.start_date, slip.end_date) {
        (Some(start_date), Some(end_date)) => Ok((start_date, end_date)),
        _ => Err(HrmsError::validation(
            DOCTYPE,
            "Start date and end date are required",
        )),
    }
}

/// Validates an overtime slip.
///
/// Missing dates are derived from the payroll frequency of the employee's
/// salary structure. The slip may not overlap another slip that has not been
/// cancelled, may not repeat a date, and manually entered rows may not exceed
/// the maximum hours of their overtime type.
pub fn validate_overtime_slip(
    config: &ConfigLoader,
    db: &Database,
    slip: &mut OvertimeSlip,
) -> HrmsResult<()> {
    let employee = db.get::<Employee>(&slip.employee)?;
    if slip.company.is_empty() {
        slip.company = employee.company.clone();
    }
    if slip.start_date.is_none() || slip.end_date.is_none() {
        set_frequency_and_dates(db, slip)?;
    }
    let (start_date, end_date) = slip_dates(slip)?;
    if start_date > end_date {
        return Err(HrmsError::validation(
            DOCTYPE,
            "Start date cannot be greater than end date",
        ));
    }

    if let Some(existing) = db.overtime_slips.iter().find(|other| {
        other.name != slip.name
            && other.employee == slip.employee
            && other.docstatus.is_active()
            && other.start_date.is_some_and(|start| start <= end_date)
            && other.end_date.is_some_and(|end| end >= start_date)
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "Overtime Slip {} has been created between {} and {}",
                existing.name, start_date, end_date
            ),
        });
    }

    let mut dates = HashSet::new();
    for detail in &slip.overtime_details {
        if !dates.insert(detail.date) {
            return Err(HrmsError::validation(
                DOCTYPE,
                format!("Date {} is repeated in Overtime Details", detail.date),
            ));
        }
        if detail.reference_document.is_some() {
            continue;
        }
        let overtime_type = config.get_overtime_type(&detail.overtime_type)?;
        let maximum = overtime_type.maximum_overtime_hours_allowed;
        if maximum > Decimal::ZERO && detail.overtime_duration > maximum {
            return Err(HrmsError::validation(
                DOCTYPE,
                format!(
                    "Overtime Duration for {} is greater than Maximum Overtime Hours Allowed",
                    detail.date
                ),
            ));
        }
    }
    Ok(())
}

/// Replaces the detail rows with the overtime marked on attendance.
///
/// Reads submitted attendance marked present with an overtime type inside the
/// slip's dates. Durations are capped at the type's maximum and rows without
/// overtime are dropped.
pub fn fetch_overtime_details(
    config: &ConfigLoader,
    db: &Database,
    slip: &mut OvertimeSlip,
) -> HrmsResult<()> {
    let (start_date, end_date) = slip_dates(slip)?;
    let records: Vec<_> = db
        .attendance
        .iter()
        .filter(|record| {
            record.employee == slip.employee
                && record.docstatus.is_submitted()
                && record.status == AttendanceStatus::Present
                && record.attendance_date >= start_date
                && record.attendance_date <= end_date
                && record
                    .overtime_type
                    .as_deref()
                    .is_some_and(|overtime_type| !overtime_type.is_empty())
        })
        .collect();
    if records.is_empty() {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "No attendance records found for employee {} between {} and {}",
                slip.employee, start_date, end_date
            ),
        ));
    }

    slip.overtime_details.clear();
    for record in records {
        let Some(overtime_type_name) = record.overtime_type.as_deref() else {
            continue;
        };
        let maximum = config
            .get_overtime_type(overtime_type_name)?
            .maximum_overtime_hours_allowed;
        let mut duration = record.actual_overtime_duration;
        if maximum > Decimal::ZERO {
            duration = duration.min(maximum);
        }
        if duration > Decimal::ZERO {
            slip.overtime_details.push(OvertimeDetail {
                reference_document: Some(record.name.clone()),
                date: record.attendance_date,
                overtime_type: overtime_type_name.to_string(),
                overtime_duration: duration,
                standard_working_hours: record.standard_working_hours,
            });
        }
    }
    slip.overtime_details.sort_by_key(|detail| detail.date);
    slip.total_overtime_duration = slip
        .overtime_details
        .iter()
        .map(|detail| detail.overtime_duration)
        .sum();
    Ok(())
}

/// Validates a new overtime slip, fetches its details from attendance and
/// stores it as a draft.
pub fn create_overtime_slip(
    config: &ConfigLoader,
    db: &mut Database,
    mut slip: OvertimeSlip,
) -> HrmsResult<OvertimeSlip> {
    validate_overtime_slip(config, db, &mut slip)?;
    fetch_overtime_details(config, db, &mut slip)?;

    let name = db.insert(slip);
    let slip = db.get::<OvertimeSlip>(&name)?.clone();
    info!(
        overtime_slip = %name,
        employee = %slip.employee,
        rows = slip.overtime_details.len(),
        total_duration = %slip.total_overtime_duration,
        "Created overtime slip"
    );
    Ok(slip)
}

/// The priced overtime of a slip.
#[derive(Debug, Clone, Serialize)]
pub struct OvertimeComputation {
    /// Unrounded amount per overtime salary component.
    pub component_amounts: BTreeMap<String, Decimal>,
    /// One step per detail row.
    pub audit_steps: Vec<AuditStep>,
}

struct HourlyRates<'a> {
    config: &'a ConfigLoader,
    db: &'a Database,
    slip: &'a OvertimeSlip,
    start_date: NaiveDate,
    preview: Option<SalarySlip>,
}

impl HourlyRates<'_> {
    fn rate(
        &mut self,
        overtime_type: &OvertimeType,
        standard_working_hours: Decimal,
    ) -> HrmsResult<Decimal> {
        match overtime_type.overtime_calculation_method {
            OvertimeCalculationMethod::FixedHourlyRate => Ok(overtime_type.hourly_rate),
            OvertimeCalculationMethod::SalaryComponentBased => {
                if standard_working_hours <= Decimal::ZERO {
                    return Ok(Decimal::ZERO);
                }
                let preview = self.preview()?;
                let component_amount: Decimal = preview
                    .earnings
                    .iter()
                    .filter(|row| {
                        row.additional_salary.is_none()
                            && overtime_type
                                .applicable_salary_components
                                .contains(&row.salary_component)
                    })
                    .map(|row| row.amount)
                    .sum();
                let daily_amount = component_amount / preview.payment_days.max(Decimal::ONE);
                Ok(daily_amount / standard_working_hours)
            }
        }
    }

    /// The salary slip of the cycle containing the slip's start date.
    fn preview(&mut self) -> HrmsResult<&SalarySlip> {
        if self.preview.is_none() {
            let assignment = self
                .db
                .assigned_salary_structure(&self.slip.employee, self.start_date)
                .ok_or_else(|| {
                    HrmsError::validation(
                        DOCTYPE,
                        format!(
                            "Salary Structure not assigned for employee {} for date {}",
                            self.slip.employee, self.start_date
                        ),
                    )
                })?;
            let structure = self.db.get::<SalaryStructure>(&assignment.salary_structure)?;
            let cycle = start_end_dates(structure.payroll_frequency, self.start_date);
            let mut request = SalarySlipRequest::new(
                &self.slip.employee,
                &structure.name,
                cycle.start_date,
                cycle.end_date,
            );
            request.posting_date = self.start_date;
            self.preview = Some(make_salary_slip(self.config, self.db, &request)?);
        }
        self.preview.as_ref().ok_or_else(|| HrmsError::CalculationError {
            message: "Salary slip preview unavailable".to_string(),
        })
    }
}

/// Prices every detail row of an overtime slip.
///
/// The amount of a row is duration × hourly rate × multiplier. The weekend
/// multiplier applies on weekly offs and the public holiday multiplier on
/// other holidays of the employee's holiday list, each only when enabled on
/// the overtime type.
pub fn compute_overtime_amounts(
    config: &ConfigLoader,
    db: &Database,
    slip: &OvertimeSlip,
) -> HrmsResult<OvertimeComputation> {
    let (start_date, end_date) = slip_dates(slip)?;
    let employee = db.get::<Employee>(&slip.employee)?;
    let holidays: HashMap<NaiveDate, bool> = db
        .holidays_between(employee, start_date, end_date)
        .into_iter()
        .map(|holiday| (holiday.date, holiday.weekly_off))
        .collect();

    let mut rates = HourlyRates {
        config,
        db,
        slip,
        start_date,
        preview: None,
    };
    let mut component_amounts = BTreeMap::new();
    let mut audit_steps = Vec::with_capacity(slip.overtime_details.len());

    for (index, detail) in slip.overtime_details.iter().enumerate() {
        let overtime_type = config.get_overtime_type(&detail.overtime_type)?;
        let hourly_rate = rates.rate(overtime_type, detail.standard_working_hours)?;

        let (multiplier, day_kind) = match holidays.get(&detail.date) {
            Some(true) if overtime_type.applicable_for_weekend => {
                (overtime_type.weekend_multiplier, "weekly off")
            }
            Some(false) if overtime_type.applicable_for_public_holiday => {
                (overtime_type.public_holiday_multiplier, "public holiday")
            }
            _ => (overtime_type.standard_multiplier, "standard day"),
        };
        let amount = if hourly_rate > Decimal::ZERO {
            detail.overtime_duration * hourly_rate * multiplier
        } else {
            Decimal::ZERO
        };

        *component_amounts
            .entry(overtime_type.overtime_salary_component.clone())
            .or_insert(Decimal::ZERO) += amount;

        audit_steps.push(AuditStep {
            step_number: index as u32 + 1,
            rule_id: "overtime_amount".to_string(),
            rule_name: "Overtime Amount".to_string(),
            input: serde_json::json!({
                "date": detail.date.to_string(),
                "overtime_type": detail.overtime_type,
                "overtime_duration": detail.overtime_duration.to_string(),
                "hourly_rate": hourly_rate.to_string(),
                "multiplier": multiplier.to_string(),
            }),
            output: serde_json::json!({
                "salary_component": overtime_type.overtime_salary_component,
                "amount": amount.to_string(),
            }),
            reasoning: format!(
                "{} hours on a {} at {} per hour × {}",
                detail.overtime_duration, day_kind, hourly_rate, multiplier
            ),
        });
    }

    debug!(
        overtime_slip = %slip.name,
        components = component_amounts.len(),
        "Computed overtime amounts"
    );
    Ok(OvertimeComputation {
        component_amounts,
        audit_steps,
    })
}

/// The outcome of submitting an overtime slip.
#[derive(Debug, Clone, Serialize)]
pub struct OvertimeSubmission {
    /// The submitted slip.
    pub overtime_slip: OvertimeSlip,
    /// Names of the additional salary rows raised.
    pub additional_salaries: Vec<String>,
    /// How each row was priced.
    pub audit_steps: Vec<AuditStep>,
}

/// Submits a draft overtime slip.
///
/// Raises one additional salary row per overtime salary component with a
/// positive total, rounded to currency precision and dated on the slip's end
/// date.
pub fn submit_overtime_slip(
    config: &ConfigLoader,
    db: &mut Database,
    name: &str,
) -> HrmsResult<OvertimeSubmission> {
    let mut slip = db.get::<OvertimeSlip>(name)?.clone();
    validate_overtime_slip(config, db, &mut slip)?;
    let (_, end_date) = slip_dates(&slip)?;
    let computation = compute_overtime_amounts(config, db, &slip)?;
    for component in computation.component_amounts.keys() {
        config.get_salary_component(component)?;
    }
    slip.docstatus = slip
        .docstatus
        .transition(LifecycleAction::Submit, DOCTYPE, name)?;

    let currency = config.settings().currency.clone();
    let precision = config.currency_precision();
    let mut additional_salaries = Vec::new();
    for (component, total) in &computation.component_amounts {
        if *total <= Decimal::ZERO {
            continue;
        }
        additional_salaries.push(submit_additional_salary(
            config,
            db,
            AdditionalSalaryRequest {
                employee: &slip.employee,
                company: &slip.company,
                currency: &currency,
                salary_component: component,
                amount: flt(*total, precision),
                payroll_date: end_date,
                ref_doctype: DOCTYPE,
                ref_docname: name,
            },
        )?);
    }
    db.insert(slip.clone());

    info!(
        overtime_slip = %name,
        employee = %slip.employee,
        additional_salaries = additional_salaries.len(),
        "Submitted overtime slip"
    );
    Ok(OvertimeSubmission {
        overtime_slip: slip,
        additional_salaries,
        audit_steps: computation.audit_steps,
    })
}

/// Employees with overtime marked on attendance between two dates and no
/// overtime slip overlapping them, sorted by id.
pub fn filter_employees_for_overtime_slip_creation(
    db: &Database,
    start_date: NaiveDate,
    end_date: NaiveDate,
    employees: &[String],
) -> Vec<String> {
    let with_overtime: BTreeSet<&str> = db
        .attendance
        .iter()
        .filter(|record| {
            employees.contains(&record.employee)
                && record.attendance_date >= start_date
                && record.attendance_date <= end_date
                && record.docstatus.is_submitted()
                && record.status == AttendanceStatus::Present
                && record
                    .overtime_type
                    .as_deref()
                    .is_some_and(|overtime_type| !overtime_type.is_empty())
        })
        .map(|record| record.employee.as_str())
        .collect();

    let with_slip: HashSet<&str> = db
        .overtime_slips
        .iter()
        .filter(|slip| {
            slip.docstatus.is_active()
                && slip.start_date.is_some_and(|start| start <= end_date)
                && slip.end_date.is_some_and(|end| end >= start_date)
        })
        .map(|slip| slip.employee.as_str())
        .collect();

    with_overtime
        .into_iter()
        .filter(|employee| !with_slip.contains(employee))
        .map(str::to_string)
        .collect()
}

/// Status of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStatus {
    /// Every record was processed.
    Draft,
    /// At least one record failed.
    Failed,
}

/// The result of creating or submitting overtime slips in bulk.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Overtime slips created or submitted.
    pub processed: Vec<String>,
    /// One message per failed employee or slip.
    pub errors: Vec<String>,
    /// Failed when any error was collected.
    pub status: BatchStatus,
}

impl BatchOutcome {
    fn new(processed: Vec<String>, errors: Vec<String>) -> Self {
        let status = if errors.is_empty() {
            BatchStatus::Draft
        } else {
            BatchStatus::Failed
        };
        Self {
            processed,
            errors,
            status,
        }
    }
}

/// Creates a draft overtime slip for each employee, collecting failures
/// instead of stopping at the first one.
pub fn create_overtime_slips_for_employees(
    config: &ConfigLoader,
    db: &mut Database,
    employees: &[String],
    posting_date: NaiveDate,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> BatchOutcome {
    let mut processed = Vec::new();
    let mut errors = Vec::new();
    for employee_id in employees {
        let company = match db.get::<Employee>(employee_id) {
            Ok(employee) => employee.company.clone(),
            Err(e) => {
                errors.push(format!("Employee {} : {}", employee_id, e));
                continue;
            }
        };
        let slip = OvertimeSlip {
            name: String::new(),
            employee: employee_id.clone(),
            company,
            posting_date,
            start_date,
            end_date,
            overtime_details: vec![],
            total_overtime_duration: Decimal::ZERO,
            docstatus: Default::default(),
        };
        match create_overtime_slip(config, db, slip) {
            Ok(slip) => processed.push(slip.name),
            Err(e) => {
                warn!(employee = %employee_id, error = %e, "Overtime slip creation failed");
                errors.push(format!("Employee {} : {}", employee_id, e));
            }
        }
    }
    info!(
        created = processed.len(),
        failed = errors.len(),
        "Created overtime slips"
    );
    BatchOutcome::new(processed, errors)
}

/// Submits each named overtime slip, collecting failures.
pub fn submit_overtime_slips(
    config: &ConfigLoader,
    db: &mut Database,
    names: &[String],
) -> BatchOutcome {
    let mut processed = Vec::new();
    let mut errors = Vec::new();
    for name in names {
        match submit_overtime_slip(config, db, name) {
            Ok(_) => processed.push(name.clone()),
            Err(e) => {
                warn!(overtime_slip = %name, error = %e, "Overtime slip submission failed");
                errors.push(format!("{} : {}", name, e));
            }
        }
    }
    info!(
        submitted = processed.len(),
        failed = errors.len(),
        "Submitted overtime slips"
    );
    BatchOutcome::new(processed, errors)
}
