//! Accrued earnings summary over the benefit ledger.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::models::BenefitTransactionType;
use crate::store::Database;

/// Filters of the accrued earnings summary. Unset filters match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccruedEarningsFilters {
    /// Only entries of this company.
    #[serde(default)]
    pub company: Option<String>,
    /// Only entries of this employee.
    #[serde(default)]
    pub employee: Option<String>,
    /// Only entries of this payroll period.
    #[serde(default)]
    pub payroll_period: Option<String>,
    /// Only entries of this component.
    #[serde(default)]
    pub salary_component: Option<String>,
    /// Only flexible (`true`) or only non-flexible (`false`) benefits.
    #[serde(default)]
    pub flexible_benefit: Option<bool>,
}

/// Accrued and paid totals of one benefit of one employee in a payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccruedEarningsRow {
    /// The employee.
    pub employee: String,
    /// Employee display name.
    pub employee_name: String,
    /// The payroll period.
    pub payroll_period: String,
    /// The accrual component.
    pub salary_component: String,
    /// Whether the component is a flexible benefit.
    pub flexible_benefit: bool,
    /// Yearly benefit amount of the first entry in the group.
    pub yearly_benefit: Decimal,
    /// Sum of accrual entries.
    pub total_accrued: Decimal,
    /// Sum of payout entries.
    pub total_payout: Decimal,
    /// Accrued but not yet paid.
    pub unpaid_accrual: Decimal,
    /// Unpaid accruals of non-flexible components are paid through additional
    /// salary created by hand.
    pub can_create_additional_salary: bool,
}

/// Summarises the benefit ledger per employee, payroll period, accrual
/// component and flexible flag.
///
/// Only components marked as accrual components are included. Rows are
/// ordered by employee, then component, then flexible flag.
pub fn accrued_earnings(
    config: &ConfigLoader,
    db: &Database,
    filters: &AccruedEarningsFilters,
) -> Vec<AccruedEarningsRow> {
    fn matches(filter: &Option<String>, value: &str) -> bool {
        filter.as_deref().is_none_or(|expected| expected == value)
    }

    let components = config.config().salary_components();
    let mut groups: BTreeMap<(&str, &str, bool, &str), AccruedEarningsRow> = BTreeMap::new();

    for entry in db.benefit_ledger.iter().filter(|entry| {
        matches(&filters.company, &entry.company)
            && matches(&filters.employee, &entry.employee)
            && matches(&filters.payroll_period, &entry.payroll_period)
            && matches(&filters.salary_component, &entry.salary_component)
            && filters
                .flexible_benefit
                .is_none_or(|flexible| flexible == entry.flexible_benefit)
            && components
                .get(&entry.salary_component)
                .is_some_and(|component| component.accrual_component)
    }) {
        let key = (
            entry.employee.as_str(),
            entry.salary_component.as_str(),
            entry.flexible_benefit,
            entry.payroll_period.as_str(),
        );
        let row = groups.entry(key).or_insert_with(|| AccruedEarningsRow {
            employee: entry.employee.clone(),
            employee_name: entry.employee_name.clone(),
            payroll_period: entry.payroll_period.clone(),
            salary_component: entry.salary_component.clone(),
            flexible_benefit: entry.flexible_benefit,
            yearly_benefit: entry.yearly_benefit,
            total_accrued: Decimal::ZERO,
            total_payout: Decimal::ZERO,
            unpaid_accrual: Decimal::ZERO,
            can_create_additional_salary: false,
        });
        match entry.transaction_type {
            BenefitTransactionType::Accrual => row.total_accrued += entry.amount,
            BenefitTransactionType::Payout => row.total_payout += entry.amount,
        }
    }

    groups
        .into_values()
        .map(|mut row| {
            row.unpaid_accrual = row.total_accrued - row.total_payout;
            row.can_create_additional_salary =
                !row.flexible_benefit && row.unpaid_accrual > Decimal::ZERO;
            row
        })
        .collect()
}
