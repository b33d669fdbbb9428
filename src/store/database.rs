//! In-memory record store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AdditionalSalary, Arrear, AttendanceRecord, BenefitLedgerEntry, Employee,
    EmployeeBenefitApplication, EmployeeBenefitClaim, Holiday, LeaveAdjustment, LeaveAllocation,
    LeaveLedgerEntry, OvertimeSlip, PayrollCorrection, PayrollPeriod, SalarySlip,
    SalaryStructure, SalaryStructureAssignment,
};

use super::Record;

/// The rows the payroll and leave rules read and write.
///
/// Every table is a plain vector kept in insertion order. Named records are
/// reached through the generic [`Database::get`], [`Database::get_mut`] and
/// [`Database::insert`] methods; ledgers are accessed directly.
///
/// The whole store (de)serializes from YAML or JSON so a host can seed it
/// from a file.
///
/// # Example
///
/// ```
/// use hrms_rules::models::{Employee, EmployeeStatus};
/// use hrms_rules::store::Database;
/// use chrono::NaiveDate;
///
/// let mut db = Database::default();
/// db.insert(Employee {
///     id: "EMP-0001".to_string(),
///     employee_name: "Asha Rao".to_string(),
///     company: "Acme".to_string(),
///     date_of_joining: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     relieving_date: None,
///     status: EmployeeStatus::Active,
///     holiday_list: None,
/// });
///
/// let employee = db.get::<Employee>("EMP-0001").unwrap();
/// assert_eq!(employee.employee_name, "Asha Rao");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Employees.
    pub employees: Vec<Employee>,
    /// Holiday lists by name.
    pub holiday_lists: HashMap<String, Vec<Holiday>>,
    /// Marked attendance.
    pub attendance: Vec<AttendanceRecord>,
    /// Salary structures.
    pub salary_structures: Vec<SalaryStructure>,
    /// Salary structure assignments.
    pub salary_structure_assignments: Vec<SalaryStructureAssignment>,
    /// Payroll periods.
    pub payroll_periods: Vec<PayrollPeriod>,
    /// Salary slips.
    pub salary_slips: Vec<SalarySlip>,
    /// Additional salary rows.
    pub additional_salaries: Vec<AdditionalSalary>,
    /// Leave allocations.
    pub leave_allocations: Vec<LeaveAllocation>,
    /// Leave ledger.
    pub leave_ledger: Vec<LeaveLedgerEntry>,
    /// Leave adjustments.
    pub leave_adjustments: Vec<LeaveAdjustment>,
    /// Overtime slips.
    pub overtime_slips: Vec<OvertimeSlip>,
    /// Arrears.
    pub arrears: Vec<Arrear>,
    /// Payroll corrections.
    pub payroll_corrections: Vec<PayrollCorrection>,
    /// Employee benefit applications.
    pub benefit_applications: Vec<EmployeeBenefitApplication>,
    /// Employee benefit claims.
    pub benefit_claims: Vec<EmployeeBenefitClaim>,
    /// Employee benefit ledger.
    pub benefit_ledger: Vec<BenefitLedgerEntry>,
    /// Last number used per naming series.
    pub naming_series: HashMap<String, u32>,
}

impl Database {
    /// Loads a seeded store from a YAML file.
    pub fn load_seed<P: AsRef<Path>>(path: P) -> HrmsResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| HrmsError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| HrmsError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Gets a record by name.
    pub fn get<T: Record>(&self, name: &str) -> HrmsResult<&T> {
        T::table(self)
            .iter()
            .find(|record| record.name() == name)
            .ok_or_else(|| HrmsError::not_found(T::DOCTYPE, name))
    }

    /// Gets a record by name, mutably.
    pub fn get_mut<T: Record>(&mut self, name: &str) -> HrmsResult<&mut T> {
        T::table_mut(self)
            .iter_mut()
            .find(|record| record.name() == name)
            .ok_or_else(|| HrmsError::not_found(T::DOCTYPE, name))
    }

    /// Returns all records of a type in insertion order.
    pub fn all<T: Record>(&self) -> &[T] {
        T::table(self)
    }

    /// Inserts or replaces a record, returning its name.
    ///
    /// A record without a name is given the next name of its series.
    pub fn insert<T: Record>(&mut self, mut record: T) -> String {
        if record.name().is_empty() {
            record.set_name(self.next_name(T::SERIES));
        }
        let name = record.name().to_string();

        let table = T::table_mut(self);
        match table.iter_mut().find(|existing| existing.name() == name) {
            Some(existing) => *existing = record,
            None => table.push(record),
        }
        name
    }

    /// Generates the next name of a naming series, e.g. `HR-LAD-00001`.
    pub fn next_name(&mut self, series: &str) -> String {
        let counter = self.naming_series.entry(series.to_string()).or_insert(0);
        *counter += 1;
        format!("{}-{:05}", series, counter)
    }

    /// Holidays of the employee's holiday list between two dates (inclusive).
    pub fn holidays_between(
        &self,
        employee: &Employee,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Vec<&Holiday> {
        employee
            .holiday_list
            .as_ref()
            .and_then(|list| self.holiday_lists.get(list))
            .map(|holidays| {
                holidays
                    .iter()
                    .filter(|holiday| holiday.date >= from_date && holiday.date <= to_date)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The submitted salary structure assignment in effect for an employee on a date.
    ///
    /// When several assignments apply, the one with the latest `from_date` wins.
    pub fn assigned_salary_structure(
        &self,
        employee: &str,
        date: NaiveDate,
    ) -> Option<&SalaryStructureAssignment> {
        self.salary_structure_assignments
            .iter()
            .filter(|ssa| {
                ssa.employee == employee && ssa.docstatus.is_submitted() && ssa.from_date <= date
            })
            .max_by_key(|ssa| ssa.from_date)
    }

    /// The payroll period of a company containing a date.
    pub fn payroll_period_for(&self, company: &str, date: NaiveDate) -> Option<&PayrollPeriod> {
        self.payroll_periods
            .iter()
            .find(|period| period.company == company && period.contains_date(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocStatus, EmployeeStatus};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee() -> Employee {
        Employee {
            id: "EMP-0001".to_string(),
            employee_name: "Asha Rao".to_string(),
            company: "Acme".to_string(),
            date_of_joining: date(2024, 1, 1),
            relieving_date: None,
            status: EmployeeStatus::Active,
            holiday_list: Some("Acme 2026".to_string()),
        }
    }

    fn assignment(
        from_date: NaiveDate,
        structure: &str,
        docstatus: DocStatus,
    ) -> SalaryStructureAssignment {
        SalaryStructureAssignment {
            name: String::new(),
            employee: "EMP-0001".to_string(),
            salary_structure: structure.to_string(),
            from_date,
            base: Decimal::from(50000),
            max_benefits: Decimal::ZERO,
            currency: "INR".to_string(),
            employee_benefits: vec![],
            docstatus,
        }
    }

    #[test]
    fn test_insert_assigns_series_names() {
        let mut db = Database::default();
        let first = db.insert(assignment(date(2026, 1, 1), "Base", DocStatus::Submitted));
        let second = db.insert(assignment(date(2026, 4, 1), "Revised", DocStatus::Submitted));

        assert_eq!(first, "HR-SSA-00001");
        assert_eq!(second, "HR-SSA-00002");
        assert_eq!(db.all::<SalaryStructureAssignment>().len(), 2);
    }

    #[test]
    fn test_insert_replaces_record_with_same_name() {
        let mut db = Database::default();
        let name = db.insert(assignment(date(2026, 1, 1), "Base", DocStatus::Draft));

        let mut updated = db.get::<SalaryStructureAssignment>(&name).unwrap().clone();
        updated.docstatus = DocStatus::Submitted;
        db.insert(updated);

        assert_eq!(db.all::<SalaryStructureAssignment>().len(), 1);
        assert!(db.get::<SalaryStructureAssignment>(&name).unwrap().docstatus.is_submitted());
    }

    #[test]
    fn test_get_missing_record_returns_not_found() {
        let db = Database::default();
        match db.get::<Employee>("EMP-9999") {
            Err(HrmsError::NotFound { doctype, name }) => {
                assert_eq!(doctype, "Employee");
                assert_eq!(name, "EMP-9999");
            }
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_assigned_salary_structure_picks_latest_submitted() {
        let mut db = Database::default();
        db.insert(assignment(date(2026, 1, 1), "Base", DocStatus::Submitted));
        db.insert(assignment(date(2026, 4, 1), "Revised", DocStatus::Submitted));
        db.insert(assignment(date(2026, 5, 1), "Draft", DocStatus::Draft));

        let ssa = db.assigned_salary_structure("EMP-0001", date(2026, 6, 15)).unwrap();
        assert_eq!(ssa.salary_structure, "Revised");

        let ssa = db.assigned_salary_structure("EMP-0001", date(2026, 2, 1)).unwrap();
        assert_eq!(ssa.salary_structure, "Base");

        assert!(db.assigned_salary_structure("EMP-0001", date(2025, 12, 31)).is_none());
    }

    #[test]
    fn test_holidays_between_filters_by_list_and_range() {
        let mut db = Database::default();
        db.holiday_lists.insert(
            "Acme 2026".to_string(),
            vec![
                Holiday {
                    date: date(2026, 3, 7),
                    weekly_off: true,
                    description: "Saturday".to_string(),
                },
                Holiday {
                    date: date(2026, 4, 3),
                    weekly_off: false,
                    description: "Good Friday".to_string(),
                },
            ],
        );

        let holidays = db.holidays_between(&employee(), date(2026, 3, 1), date(2026, 3, 31));
        assert_eq!(holidays.len(), 1);
        assert!(holidays[0].weekly_off);

        let mut without_list = employee();
        without_list.holiday_list = None;
        assert!(
            db.holidays_between(&without_list, date(2026, 1, 1), date(2026, 12, 31))
                .is_empty()
        );
    }

    #[test]
    fn test_seed_deserializes_from_yaml() {
        let yaml = r#"
employees:
  - id: EMP-0001
    company: Acme
    date_of_joining: 2024-01-01
payroll_periods:
  - name: FY 2026
    company: Acme
    start_date: 2026-04-01
    end_date: 2027-03-31
"#;
        let db: Database = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(db.employees.len(), 1);
        assert_eq!(
            db.payroll_period_for("Acme", date(2026, 6, 1)).unwrap().name,
            "FY 2026"
        );
        assert!(db.payroll_period_for("Other", date(2026, 6, 1)).is_none());
    }
}
