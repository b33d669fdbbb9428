//! Salary structures, assignments, salary slips and additional salary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocStatus;

/// Whether a salary component is paid out or withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Paid to the employee.
    Earning,
    /// Withheld from the employee.
    Deduction,
}

/// How often payroll runs for a salary structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollFrequency {
    /// Calendar month.
    Monthly,
    /// Half month (1st-15th, 16th-end).
    Bimonthly,
    /// Fourteen days.
    Fortnightly,
    /// Seven days.
    Weekly,
    /// One day.
    Daily,
}

impl PayrollFrequency {
    /// Number of payroll cycles in a year.
    pub fn cycles_per_year(self) -> u32 {
        match self {
            PayrollFrequency::Monthly => 12,
            PayrollFrequency::Bimonthly => 24,
            PayrollFrequency::Fortnightly => 26,
            PayrollFrequency::Weekly => 52,
            PayrollFrequency::Daily => 365,
        }
    }
}

/// A line of a salary structure.
///
/// The per-cycle amount is either fixed or a multiple of the base set on the
/// salary structure assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureLine {
    /// The salary component.
    pub salary_component: String,
    /// A fixed per-cycle amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// A per-cycle amount expressed as a multiple of the assignment base.
    #[serde(default)]
    pub base_multiplier: Option<Decimal>,
}

impl StructureLine {
    /// The full per-cycle amount of the line for the given base.
    pub fn amount_for_base(&self, base: Decimal) -> Decimal {
        match (self.amount, self.base_multiplier) {
            (Some(amount), _) => amount,
            (None, Some(multiplier)) => base * multiplier,
            (None, None) => Decimal::ZERO,
        }
    }
}

/// A salary structure: the components paid each payroll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// Structure name.
    pub name: String,
    /// The company the structure belongs to.
    #[serde(default)]
    pub company: String,
    /// How often payroll runs.
    pub payroll_frequency: PayrollFrequency,
    /// Earning lines.
    #[serde(default)]
    pub earnings: Vec<StructureLine>,
    /// Deduction lines.
    #[serde(default)]
    pub deductions: Vec<StructureLine>,
    /// Accrual lines (benefits accrued each cycle instead of paid).
    #[serde(default)]
    pub accruals: Vec<StructureLine>,
}

/// A yearly benefit amount granted through an assignment or application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitDetail {
    /// The benefit component.
    pub salary_component: String,
    /// The yearly amount.
    pub amount: Decimal,
}

/// Assignment of a salary structure to an employee from a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryStructureAssignment {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The assigned structure.
    pub salary_structure: String,
    /// First day the assignment applies.
    pub from_date: NaiveDate,
    /// The base used by base-multiplier lines.
    #[serde(default)]
    pub base: Decimal,
    /// Maximum total of flexible benefits the employee may apply for.
    #[serde(default)]
    pub max_benefits: Decimal,
    /// Currency of the amounts.
    #[serde(default)]
    pub currency: String,
    /// Yearly benefit amounts.
    #[serde(default)]
    pub employee_benefits: Vec<BenefitDetail>,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

/// A payroll period (usually a financial year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Period name.
    pub name: String,
    /// The company the period belongs to.
    #[serde(default)]
    pub company: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
}

impl PayrollPeriod {
    /// Checks if a date falls within the period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// An earning or deduction row on a salary slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryDetail {
    /// The salary component.
    pub salary_component: String,
    /// The amount paid for the cycle (after payment-day proration).
    pub amount: Decimal,
    /// The full amount before proration.
    #[serde(default)]
    pub default_amount: Decimal,
    /// The additional salary this row came from, if any.
    #[serde(default)]
    pub additional_salary: Option<String>,
    /// Whether the row is a tax computed from taxable salary.
    #[serde(default)]
    pub variable_based_on_taxable_salary: bool,
}

/// A benefit accrued on a salary slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccruedBenefit {
    /// The benefit component.
    pub salary_component: String,
    /// The amount accrued for the cycle.
    pub amount: Decimal,
}

/// A processed (or previewed) salary slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySlip {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The company.
    #[serde(default)]
    pub company: String,
    /// The structure the slip was computed from.
    #[serde(default)]
    pub salary_structure: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// First day of the payroll cycle.
    pub start_date: NaiveDate,
    /// Last day of the payroll cycle.
    pub end_date: NaiveDate,
    /// The payroll period the slip falls in.
    #[serde(default)]
    pub payroll_period: Option<String>,
    /// Working days in the cycle.
    pub total_working_days: Decimal,
    /// Days paid for.
    pub payment_days: Decimal,
    /// Days of leave without pay.
    #[serde(default)]
    pub leave_without_pay: Decimal,
    /// Earning rows.
    #[serde(default)]
    pub earnings: Vec<SalaryDetail>,
    /// Deduction rows.
    #[serde(default)]
    pub deductions: Vec<SalaryDetail>,
    /// Accrued benefit rows.
    #[serde(default)]
    pub accrued_benefits: Vec<AccruedBenefit>,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

/// A one-off salary component applied on a payroll date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalSalary {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The company.
    pub company: String,
    /// The salary component.
    pub salary_component: String,
    /// Whether the component is an earning or deduction.
    pub component_type: ComponentType,
    /// The amount.
    pub amount: Decimal,
    /// The payroll date the amount is paid on.
    pub payroll_date: NaiveDate,
    /// Currency.
    #[serde(default)]
    pub currency: String,
    /// The record type that created this row.
    pub ref_doctype: String,
    /// The record that created this row.
    pub ref_docname: String,
    /// Whether the amount replaces the structure amount.
    #[serde(default)]
    pub overwrite_salary_structure_amount: bool,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_fixed_line_ignores_base() {
        let line = StructureLine {
            salary_component: "Conveyance".to_string(),
            amount: Some(dec("1600")),
            base_multiplier: None,
        };
        assert_eq!(line.amount_for_base(dec("50000")), dec("1600"));
    }

    #[test]
    fn test_base_multiplier_line() {
        let line = StructureLine {
            salary_component: "Special Allowance".to_string(),
            amount: None,
            base_multiplier: Some(dec("0.5")),
        };
        assert_eq!(line.amount_for_base(dec("75000")), dec("37500"));
    }

    #[test]
    fn test_payroll_period_contains_date() {
        let period = PayrollPeriod {
            name: "FY 2026".to_string(),
            company: "Acme".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 3, 31).unwrap(),
        };
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2027, 3, 31).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
    }

    #[test]
    fn test_payroll_frequency_serialization() {
        assert_eq!(
            serde_json::to_string(&PayrollFrequency::Bimonthly).unwrap(),
            "\"bimonthly\""
        );
        assert_eq!(PayrollFrequency::Monthly.cycles_per_year(), 12);
    }
}
