//! The [`Record`] trait binding each named record type to its table.

use crate::models::{
    AdditionalSalary, Arrear, AttendanceRecord, BenefitLedgerEntry, Employee,
    EmployeeBenefitApplication, EmployeeBenefitClaim, LeaveAdjustment, LeaveAllocation,
    OvertimeSlip, PayrollCorrection, PayrollPeriod, SalarySlip, SalaryStructure,
    SalaryStructureAssignment,
};

use super::Database;

/// A named record stored in a [`Database`] table.
pub trait Record: Clone {
    /// Human-readable record type, used in errors and logs.
    const DOCTYPE: &'static str;
    /// Prefix of generated names.
    const SERIES: &'static str;

    /// The unique name of the record.
    fn name(&self) -> &str;

    /// Sets the unique name of the record.
    fn set_name(&mut self, name: String);

    /// The table holding records of this type.
    fn table(db: &Database) -> &Vec<Self>;

    /// The table holding records of this type, mutably.
    fn table_mut(db: &mut Database) -> &mut Vec<Self>;
}

macro_rules! impl_record {
    ($ty:ty, $doctype:literal, $series:literal, $field:ident, $table:ident) => {
        impl Record for $ty {
            const DOCTYPE: &'static str = $doctype;
            const SERIES: &'static str = $series;

            fn name(&self) -> &str {
                &self.$field
            }

            fn set_name(&mut self, name: String) {
                self.$field = name;
            }

            fn table(db: &Database) -> &Vec<Self> {
                &db.$table
            }

            fn table_mut(db: &mut Database) -> &mut Vec<Self> {
                &mut db.$table
            }
        }
    };
}

impl_record!(Employee, "Employee", "HR-EMP", id, employees);
impl_record!(AttendanceRecord, "Attendance", "HR-ATT", name, attendance);
impl_record!(SalaryStructure, "Salary Structure", "HR-SST", name, salary_structures);
impl_record!(PayrollPeriod, "Payroll Period", "HR-PP", name, payroll_periods);
impl_record!(
    SalaryStructureAssignment,
    "Salary Structure Assignment",
    "HR-SSA",
    name,
    salary_structure_assignments
);
impl_record!(SalarySlip, "Salary Slip", "Sal Slip", name, salary_slips);
impl_record!(LeaveAllocation, "Leave Allocation", "HR-LAL", name, leave_allocations);
impl_record!(LeaveAdjustment, "Leave Adjustment", "HR-LAD", name, leave_adjustments);
impl_record!(OvertimeSlip, "Overtime Slip", "HR-OTS", name, overtime_slips);
impl_record!(AdditionalSalary, "Additional Salary", "HR-ADS", name, additional_salaries);
impl_record!(Arrear, "Arrear", "HR-ARR", name, arrears);
impl_record!(PayrollCorrection, "Payroll Correction", "HR-PC", name, payroll_corrections);
impl_record!(
    EmployeeBenefitApplication,
    "Employee Benefit Application",
    "HR-BEN-APP",
    name,
    benefit_applications
);
impl_record!(
    EmployeeBenefitClaim,
    "Employee Benefit Claim",
    "HR-BEN-CLM",
    name,
    benefit_claims
);
impl_record!(
    BenefitLedgerEntry,
    "Employee Benefit Ledger",
    "HR-BEN-LED",
    name,
    benefit_ledger
);
