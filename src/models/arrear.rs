//! Arrear and payroll correction records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocStatus;

/// An amount owed for one salary component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAmount {
    /// The salary component.
    pub salary_component: String,
    /// The amount.
    pub amount: Decimal,
}

impl ComponentAmount {
    /// Creates a component amount.
    pub fn new(salary_component: impl Into<String>, amount: Decimal) -> Self {
        Self {
            salary_component: salary_component.into(),
            amount,
        }
    }
}

/// Back pay owed after a salary structure is applied retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrear {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// Employee display name.
    #[serde(default)]
    pub employee_name: String,
    /// The company.
    #[serde(default)]
    pub company: String,
    /// Currency.
    #[serde(default)]
    pub currency: String,
    /// The payroll period the arrear belongs to.
    pub payroll_period: String,
    /// The retroactively applied structure.
    pub salary_structure: String,
    /// First day the new structure applies from.
    pub arrear_start_date: NaiveDate,
    /// The payroll date the arrear is paid on.
    pub payroll_date: NaiveDate,
    /// Earning differences.
    #[serde(default)]
    pub earning_arrears: Vec<ComponentAmount>,
    /// Deduction differences.
    #[serde(default)]
    pub deduction_arrears: Vec<ComponentAmount>,
    /// Accrual differences.
    #[serde(default)]
    pub accrual_arrears: Vec<ComponentAmount>,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

/// Reversal of leave-without-pay days on an already processed salary slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollCorrection {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// Employee display name.
    #[serde(default)]
    pub employee_name: String,
    /// The company.
    #[serde(default)]
    pub company: String,
    /// Currency.
    #[serde(default)]
    pub currency: String,
    /// The payroll period.
    pub payroll_period: String,
    /// The payroll date the correction is paid on.
    pub payroll_date: NaiveDate,
    /// The salary slip whose LWP days are reversed.
    pub salary_slip_reference: String,
    /// Number of LWP days to reverse.
    pub days_to_reverse: Decimal,
    /// Working days of the referenced slip.
    #[serde(default)]
    pub working_days: Decimal,
    /// Payment days of the referenced slip.
    #[serde(default)]
    pub payment_days: Decimal,
    /// LWP days of the referenced slip.
    #[serde(default)]
    pub lwp_days: Decimal,
    /// Earning amounts owed.
    #[serde(default)]
    pub earning_arrears: Vec<ComponentAmount>,
    /// Deduction amounts owed.
    #[serde(default)]
    pub deduction_arrears: Vec<ComponentAmount>,
    /// Accrual amounts owed.
    #[serde(default)]
    pub accrual_arrears: Vec<ComponentAmount>,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_arrear_without_rows() {
        let json = r#"{
            "employee": "EMP-0001",
            "payroll_period": "FY 2026",
            "salary_structure": "Revised Structure",
            "arrear_start_date": "2026-04-01",
            "payroll_date": "2026-06-01"
        }"#;
        let arrear: Arrear = serde_json::from_str(json).unwrap();
        assert!(arrear.earning_arrears.is_empty());
        assert!(arrear.accrual_arrears.is_empty());
        assert_eq!(arrear.docstatus, DocStatus::Draft);
    }

    #[test]
    fn test_component_amount_serializes_amount_as_string() {
        let row = ComponentAmount::new("Basic Salary", Decimal::new(250000, 1));
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"amount\":\"25000.0\""));
    }
}
