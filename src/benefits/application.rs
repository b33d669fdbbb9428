//! Employee benefit applications and the lookup of an employee's benefit amounts.

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    BenefitApplicationRow, Employee, EmployeeBenefitApplication, LifecycleAction, PayrollPeriod,
    SalaryStructureAssignment,
};
use crate::rounding::flt;
use crate::store::{Database, Record};

const DOCTYPE: &str = "Employee Benefit Application";

/// The record an employee's yearly benefit amounts come from.
#[derive(Debug, Clone, Copy)]
pub enum BenefitSource<'a> {
    /// A submitted benefit application for the payroll period.
    Application(&'a EmployeeBenefitApplication),
    /// The benefits listed on the salary structure assignment.
    Assignment(&'a SalaryStructureAssignment),
}

impl<'a> BenefitSource<'a> {
    /// Record type of the source.
    pub fn doctype(&self) -> &'static str {
        match self {
            BenefitSource::Application(_) => EmployeeBenefitApplication::DOCTYPE,
            BenefitSource::Assignment(_) => SalaryStructureAssignment::DOCTYPE,
        }
    }

    /// Record name of the source.
    pub fn name(&self) -> &'a str {
        match self {
            BenefitSource::Application(application) => &application.name,
            BenefitSource::Assignment(assignment) => &assignment.name,
        }
    }

    /// Benefit components and their yearly amounts.
    pub fn components(&self) -> Vec<(&'a str, Decimal)> {
        match self {
            BenefitSource::Application(application) => application
                .employee_benefits
                .iter()
                .map(|row| (row.salary_component.as_str(), row.amount))
                .collect(),
            BenefitSource::Assignment(assignment) => assignment
                .employee_benefits
                .iter()
                .map(|row| (row.salary_component.as_str(), row.amount))
                .collect(),
        }
    }

    /// The yearly amount of one benefit component.
    pub fn yearly_benefit(&self, salary_component: &str) -> Option<Decimal> {
        self.components()
            .into_iter()
            .find(|(component, _)| *component == salary_component)
            .map(|(_, amount)| amount)
    }
}

/// Finds where an employee's benefit amounts for a payroll period come from.
///
/// A submitted benefit application for the period takes precedence over the
/// benefits listed on the salary structure assignment. Returns `None` when
/// neither lists any benefit.
pub fn benefit_details_source<'a>(
    db: &'a Database,
    employee: &str,
    payroll_period: Option<&str>,
    assignment: &'a SalaryStructureAssignment,
) -> Option<BenefitSource<'a>> {
    let application = payroll_period.and_then(|period| {
        db.benefit_applications.iter().find(|application| {
            application.employee == employee
                && application.payroll_period == period
                && application.docstatus.is_submitted()
        })
    });
    match application {
        Some(application) => Some(BenefitSource::Application(application)),
        None if !assignment.employee_benefits.is_empty() => {
            Some(BenefitSource::Assignment(assignment))
        }
        None => None,
    }
}

/// Replaces the benefit rows of an application with those of the employee's
/// salary structure assignment, along with its maximum benefits and currency.
pub fn set_benefit_components_and_currency(
    db: &Database,
    application: &mut EmployeeBenefitApplication,
) -> HrmsResult<()> {
    let assignment = db
        .assigned_salary_structure(&application.employee, application.date)
        .ok_or_else(|| {
            HrmsError::validation(
                DOCTYPE,
                format!(
                    "No Salary Structure Assignment found for employee {} on date {}",
                    application.employee, application.date
                ),
            )
        })?;

    application.employee_benefits = assignment
        .employee_benefits
        .iter()
        .map(|benefit| BenefitApplicationRow {
            salary_component: benefit.salary_component.clone(),
            max_benefit_amount: benefit.amount,
            amount: Decimal::ZERO,
        })
        .collect();
    if !application.employee_benefits.is_empty() {
        application.max_benefits = assignment.max_benefits;
        application.currency = assignment.currency.clone();
    }
    Ok(())
}

/// Validates a benefit application.
///
/// The employee must be active and must not already have a submitted
/// application for the payroll period. Every benefit amount must be positive
/// and within its own maximum, and their total within the maximum benefits.
pub fn validate_benefit_application(
    db: &Database,
    application: &mut EmployeeBenefitApplication,
) -> HrmsResult<()> {
    let employee = db.get::<Employee>(&application.employee)?;
    if !employee.is_active() {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Transactions cannot be created for an Inactive Employee {}",
                employee.id
            ),
        ));
    }
    if application.company.is_empty() {
        application.company = employee.company.clone();
    }
    db.get::<PayrollPeriod>(&application.payroll_period)?;

    if let Some(existing) = db.benefit_applications.iter().find(|existing| {
        existing.employee == application.employee
            && existing.payroll_period == application.payroll_period
            && existing.docstatus.is_submitted()
            && existing.name != application.name
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "Employee {} already submitted an application {} for the payroll period {}",
                application.employee, existing.name, application.payroll_period
            ),
        });
    }

    if application.employee_benefits.is_empty() {
        return Err(HrmsError::validation(
            DOCTYPE,
            "As per your assigned Salary Structure you cannot apply for benefits",
        ));
    }

    let mut total = Decimal::ZERO;
    for benefit in &application.employee_benefits {
        if benefit.amount <= Decimal::ZERO {
            return Err(HrmsError::validation(
                DOCTYPE,
                format!(
                    "Benefit amount of component {} should be greater than 0",
                    benefit.salary_component
                ),
            ));
        }
        if benefit.amount > benefit.max_benefit_amount {
            return Err(HrmsError::validation(
                DOCTYPE,
                format!(
                    "Benefit amount of component {} exceeds {}",
                    benefit.salary_component, benefit.max_benefit_amount
                ),
            ));
        }
        total += benefit.amount;
    }

    if flt(total, 2) > application.max_benefits {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Sum of benefit amounts {} exceeds maximum limit of {}",
                total, application.max_benefits
            ),
        ));
    }
    Ok(())
}

/// Validates and stores a draft benefit application.
pub fn create_benefit_application(
    db: &mut Database,
    mut application: EmployeeBenefitApplication,
) -> HrmsResult<EmployeeBenefitApplication> {
    validate_benefit_application(db, &mut application)?;
    let name = db.insert(application);
    info!(application = %name, "Created benefit application");
    Ok(db.get::<EmployeeBenefitApplication>(&name)?.clone())
}

/// Submits a draft benefit application.
pub fn submit_benefit_application(
    db: &mut Database,
    name: &str,
) -> HrmsResult<EmployeeBenefitApplication> {
    let mut application = db.get::<EmployeeBenefitApplication>(name)?.clone();
    validate_benefit_application(db, &mut application)?;
    application.docstatus = application
        .docstatus
        .transition(LifecycleAction::Submit, DOCTYPE, name)?;
    db.insert(application.clone());

    info!(
        application = %name,
        employee = %application.employee,
        payroll_period = %application.payroll_period,
        "Submitted benefit application"
    );
    Ok(application)
}

/// Cancels a submitted benefit application.
pub fn cancel_benefit_application(
    db: &mut Database,
    name: &str,
) -> HrmsResult<EmployeeBenefitApplication> {
    let application = db.get_mut::<EmployeeBenefitApplication>(name)?;
    application.docstatus = application
        .docstatus
        .transition(LifecycleAction::Cancel, DOCTYPE, name)?;
    info!(application = %name, "Cancelled benefit application");
    Ok(application.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BenefitDetail, DocStatus, EmployeeStatus};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> Database {
        let mut db = Database::default();
        db.employees.push(Employee {
            id: "EMP-0001".to_string(),
            employee_name: "Asha Rao".to_string(),
            company: "Acme".to_string(),
            date_of_joining: date(2024, 1, 1),
            relieving_date: None,
            status: EmployeeStatus::Active,
            holiday_list: None,
        });
        db.payroll_periods.push(PayrollPeriod {
            name: "FY 2026-27".to_string(),
            company: "Acme".to_string(),
            start_date: date(2026, 4, 1),
            end_date: date(2027, 3, 31),
        });
        db.salary_structure_assignments.push(SalaryStructureAssignment {
            name: "HR-SSA-00001".to_string(),
            employee: "EMP-0001".to_string(),
            salary_structure: "Standard".to_string(),
            from_date: date(2026, 4, 1),
            base: dec("30000"),
            max_benefits: dec("20000"),
            currency: "INR".to_string(),
            employee_benefits: vec![
                BenefitDetail {
                    salary_component: "Medical Allowance".to_string(),
                    amount: dec("12000"),
                },
                BenefitDetail {
                    salary_component: "Leave Travel Allowance".to_string(),
                    amount: dec("10000"),
                },
            ],
            docstatus: DocStatus::Submitted,
        });
        db
    }

    fn application(db: &Database) -> EmployeeBenefitApplication {
        let mut application = EmployeeBenefitApplication {
            name: String::new(),
            employee: "EMP-0001".to_string(),
            company: String::new(),
            date: date(2026, 4, 10),
            payroll_period: "FY 2026-27".to_string(),
            currency: String::new(),
            max_benefits: Decimal::ZERO,
            employee_benefits: Vec::new(),
            docstatus: DocStatus::Draft,
        };
        set_benefit_components_and_currency(db, &mut application).unwrap();
        application
    }

    #[test]
    fn test_components_come_from_assignment() {
        let db = setup();
        let application = application(&db);

        assert_eq!(application.max_benefits, dec("20000"));
        assert_eq!(application.currency, "INR");
        assert_eq!(application.employee_benefits.len(), 2);
        assert_eq!(application.employee_benefits[0].max_benefit_amount, dec("12000"));
        assert!(application.employee_benefits.iter().all(|row| row.amount.is_zero()));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let db = setup();
        let mut application = application(&db);

        let result = validate_benefit_application(&db, &mut application);
        match result {
            Err(HrmsError::Validation { message, .. }) => {
                assert!(message.contains("should be greater than 0"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_amount_over_component_maximum() {
        let db = setup();
        let mut application = application(&db);
        application.employee_benefits[0].amount = dec("12000.01");
        application.employee_benefits[1].amount = dec("1000");

        let result = validate_benefit_application(&db, &mut application);
        match result {
            Err(HrmsError::Validation { message, .. }) => {
                assert!(message.contains("exceeds 12000"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_total_over_maximum_benefits() {
        let db = setup();
        let mut application = application(&db);
        application.employee_benefits[0].amount = dec("12000");
        application.employee_benefits[1].amount = dec("9000");

        let result = validate_benefit_application(&db, &mut application);
        match result {
            Err(HrmsError::Validation { message, .. }) => {
                assert!(message.contains("exceeds maximum limit of 20000"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_one_submitted_application_per_period() {
        let mut db = setup();
        let mut first = application(&db);
        first.employee_benefits[0].amount = dec("12000");
        first.employee_benefits[1].amount = dec("8000");
        let created = create_benefit_application(&mut db, first.clone()).unwrap();
        assert_eq!(created.company, "Acme");
        let submitted = submit_benefit_application(&mut db, &created.name).unwrap();
        assert_eq!(submitted.docstatus, DocStatus::Submitted);

        let result = create_benefit_application(&mut db, first);
        assert!(matches!(result, Err(HrmsError::Duplicate { .. })));

        cancel_benefit_application(&mut db, &created.name).unwrap();
        let fresh = application(&db);
        let second = create_benefit_application(&mut db, fresh);
        assert!(matches!(second, Err(HrmsError::Validation { .. })));
    }

    #[test]
    fn test_inactive_employee_cannot_apply() {
        let mut db = setup();
        db.employees[0].status = EmployeeStatus::Left;
        let mut application = application(&db);
        application.employee_benefits[0].amount = dec("1000");

        let result = validate_benefit_application(&db, &mut application);
        match result {
            Err(HrmsError::Validation { message, .. }) => {
                assert!(message.contains("Inactive Employee EMP-0001"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_submitted_application_takes_precedence() {
        let mut db = setup();
        let mut application = application(&db);
        application.employee_benefits[0].amount = dec("6000");
        application.employee_benefits.truncate(1);
        let created = create_benefit_application(&mut db, application).unwrap();
        let submitted = submit_benefit_application(&mut db, &created.name).unwrap();

        let assignment = &db.salary_structure_assignments[0];
        let source =
            benefit_details_source(&db, "EMP-0001", Some("FY 2026-27"), assignment).unwrap();
        assert_eq!(source.doctype(), "Employee Benefit Application");
        assert_eq!(source.name(), submitted.name);
        assert_eq!(source.yearly_benefit("Medical Allowance"), Some(dec("6000")));
        assert_eq!(source.yearly_benefit("Leave Travel Allowance"), None);

        let source = benefit_details_source(&db, "EMP-0001", None, assignment).unwrap();
        assert_eq!(source.doctype(), "Salary Structure Assignment");
        assert_eq!(source.components().len(), 2);
    }
}
