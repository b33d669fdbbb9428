//! Employee benefit application, claim and ledger records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocStatus;

/// Whether a ledger entry adds to or draws down a benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitTransactionType {
    /// Benefit accrued for a cycle.
    Accrual,
    /// Benefit paid out.
    Payout,
}

/// A benefit movement for one employee, component and payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitLedgerEntry {
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
    /// Posting date.
    #[serde(default)]
    pub posting_date: Option<NaiveDate>,
    /// The payroll period.
    pub payroll_period: String,
    /// The benefit component.
    pub salary_component: String,
    /// Accrual or payout.
    pub transaction_type: BenefitTransactionType,
    /// The amount.
    pub amount: Decimal,
    /// The yearly benefit amount the entry belongs to.
    #[serde(default)]
    pub yearly_benefit: Decimal,
    /// Whether the component is a flexible benefit.
    #[serde(default)]
    pub flexible_benefit: bool,
    /// The record type that created the entry.
    #[serde(default)]
    pub reference_doctype: Option<String>,
    /// The record that created the entry.
    #[serde(default)]
    pub reference_document: Option<String>,
    /// The salary slip the entry came from.
    #[serde(default)]
    pub salary_slip: Option<String>,
    /// Free-text remarks.
    #[serde(default)]
    pub remarks: Option<String>,
}

/// One benefit an employee applies for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitApplicationRow {
    /// The benefit component.
    pub salary_component: String,
    /// The most the employee may take for the component.
    pub max_benefit_amount: Decimal,
    /// The amount applied for.
    #[serde(default)]
    pub amount: Decimal,
}

/// An employee's choice of flexible benefits for a payroll period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeBenefitApplication {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The company.
    #[serde(default)]
    pub company: String,
    /// Application date.
    pub date: NaiveDate,
    /// The payroll period.
    pub payroll_period: String,
    /// Currency.
    #[serde(default)]
    pub currency: String,
    /// Maximum total of all benefits.
    #[serde(default)]
    pub max_benefits: Decimal,
    /// The benefits applied for.
    #[serde(default)]
    pub employee_benefits: Vec<BenefitApplicationRow>,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

/// A claim against an accrued or granted benefit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeBenefitClaim {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The company.
    #[serde(default)]
    pub company: String,
    /// Currency.
    #[serde(default)]
    pub currency: String,
    /// The benefit component claimed.
    pub earning_component: String,
    /// The payroll date the claim is paid on.
    pub payroll_date: NaiveDate,
    /// The amount claimed.
    pub claimed_amount: Decimal,
    /// The most the employee may claim.
    #[serde(default)]
    pub max_amount_eligible: Decimal,
    /// The yearly amount of the benefit.
    #[serde(default)]
    pub yearly_benefit: Decimal,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_serialization() {
        assert_eq!(
            serde_json::to_string(&BenefitTransactionType::Accrual).unwrap(),
            "\"accrual\""
        );
        let payout: BenefitTransactionType = serde_json::from_str("\"payout\"").unwrap();
        assert_eq!(payout, BenefitTransactionType::Payout);
    }

    #[test]
    fn test_deserialize_claim_with_defaults() {
        let json = r#"{
            "employee": "EMP-0001",
            "earning_component": "Medical Allowance",
            "payroll_date": "2026-05-31",
            "claimed_amount": "1500"
        }"#;
        let claim: EmployeeBenefitClaim = serde_json::from_str(json).unwrap();
        assert_eq!(claim.max_amount_eligible, Decimal::ZERO);
        assert_eq!(claim.claimed_amount, Decimal::from(1500));
    }
}
