//! The employee benefit ledger.
//!
//! Every benefit accrued on a salary slip, arrear or payroll correction and
//! every payout through a salary slip is one ledger entry. Claim eligibility
//! is derived from the accrual and payout totals of a payroll period.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigLoader, PayoutMethod};
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AdditionalSalary, BenefitLedgerEntry, BenefitTransactionType, ComponentType, Employee,
    SalarySlip,
};
use crate::rounding::flt;
use crate::store::Database;

use super::application::benefit_details_source;

const DOCTYPE: &str = "Employee Benefit Ledger";

/// Additional salary raised by these records is paid as arrears, not as a
/// benefit payout.
const ARREAR_DOCTYPES: [&str; 2] = ["Arrear", "Payroll Correction"];

/// Which entries to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerReference<'a> {
    /// Entries whose reference document is this record.
    Document(&'a str),
    /// Entries written for this salary slip.
    SalarySlip(&'a str),
}

/// Checks that a ledger entry books an earning component.
pub fn validate_benefit_ledger_entry(
    config: &ConfigLoader,
    entry: &BenefitLedgerEntry,
) -> HrmsResult<()> {
    let component = config.get_salary_component(&entry.salary_component)?;
    if component.component_type != ComponentType::Earning {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Salary Component {} must be of type 'Earning' to be used in Employee Benefit Ledger",
                entry.salary_component
            ),
        ));
    }
    Ok(())
}

/// Validates and stores a ledger entry, returning its name.
pub fn insert_benefit_ledger_entry(
    config: &ConfigLoader,
    db: &mut Database,
    entry: BenefitLedgerEntry,
) -> HrmsResult<String> {
    validate_benefit_ledger_entry(config, &entry)?;
    Ok(db.insert(entry))
}

/// Writes the ledger entries of a submitted salary slip and returns how many.
///
/// Each accrued benefit becomes an accrual entry. Earnings paid through
/// additional salary on a flexible or accrual component become payout
/// entries, unless the additional salary was raised by an arrear or payroll
/// correction. Flexible entries reference the benefit application or
/// structure assignment their yearly amount comes from.
pub fn create_ledger_entries_for_salary_slip(
    config: &ConfigLoader,
    db: &mut Database,
    slip: &SalarySlip,
) -> HrmsResult<usize> {
    let Some(payroll_period) = slip.payroll_period.as_deref() else {
        debug!(salary_slip = %slip.name, "No payroll period, skipping benefit ledger");
        return Ok(0);
    };
    let employee_name = db.get::<Employee>(&slip.employee)?.employee_name.clone();
    let source = db
        .assigned_salary_structure(&slip.employee, slip.end_date)
        .and_then(|assignment| {
            benefit_details_source(db, &slip.employee, Some(payroll_period), assignment)
        });

    let mut components: Vec<(&str, Decimal, BenefitTransactionType)> = slip
        .accrued_benefits
        .iter()
        .map(|row| {
            (
                row.salary_component.as_str(),
                row.amount,
                BenefitTransactionType::Accrual,
            )
        })
        .collect();
    for row in &slip.earnings {
        let Some(additional_salary) = row.additional_salary.as_deref() else {
            continue;
        };
        let raised_by_arrear = db
            .get::<AdditionalSalary>(additional_salary)
            .is_ok_and(|additional| ARREAR_DOCTYPES.contains(&additional.ref_doctype.as_str()));
        let is_benefit = config
            .config()
            .salary_components()
            .get(&row.salary_component)
            .is_some_and(|component| component.is_flexible_benefit || component.accrual_component);
        if is_benefit && !raised_by_arrear {
            components.push((
                row.salary_component.as_str(),
                row.amount,
                BenefitTransactionType::Payout,
            ));
        }
    }

    let mut entries = Vec::with_capacity(components.len());
    for (component_name, amount, transaction_type) in components {
        if amount.is_zero() {
            continue;
        }
        let flexible_benefit = config.get_salary_component(component_name)?.is_flexible_benefit;
        let flexible_source = source.filter(|_| flexible_benefit);
        let entry = BenefitLedgerEntry {
            name: String::new(),
            employee: slip.employee.clone(),
            employee_name: employee_name.clone(),
            company: slip.company.clone(),
            posting_date: Some(slip.posting_date),
            payroll_period: payroll_period.to_string(),
            salary_component: component_name.to_string(),
            transaction_type,
            amount,
            yearly_benefit: flexible_source
                .and_then(|source| source.yearly_benefit(component_name))
                .unwrap_or_default(),
            flexible_benefit,
            reference_doctype: flexible_source.map(|source| source.doctype().to_string()),
            reference_document: flexible_source.map(|source| source.name().to_string()),
            salary_slip: Some(slip.name.clone()),
            remarks: None,
        };
        validate_benefit_ledger_entry(config, &entry)?;
        entries.push(entry);
    }

    let count = entries.len();
    for entry in entries {
        db.insert(entry);
    }
    debug!(salary_slip = %slip.name, entries = count, "Wrote benefit ledger entries");
    Ok(count)
}

/// Deletes ledger entries and returns how many were removed.
pub fn delete_benefit_ledger_entries(db: &mut Database, reference: LedgerReference<'_>) -> usize {
    let before = db.benefit_ledger.len();
    db.benefit_ledger.retain(|entry| match reference {
        LedgerReference::Document(name) => entry.reference_document.as_deref() != Some(name),
        LedgerReference::SalarySlip(name) => entry.salary_slip.as_deref() != Some(name),
    });
    before - db.benefit_ledger.len()
}

/// Accrued and paid totals of one benefit in a payroll period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BenefitAmounts {
    /// Sum of accrual entries.
    pub accrual: Decimal,
    /// Sum of payout entries.
    pub payout: Decimal,
}

/// Sums the ledger entries of a benefit by transaction type.
pub fn benefit_amounts(
    db: &Database,
    employee: &str,
    payroll_period: &str,
    salary_component: &str,
) -> BenefitAmounts {
    db.benefit_ledger
        .iter()
        .filter(|entry| {
            entry.employee == employee
                && entry.payroll_period == payroll_period
                && entry.salary_component == salary_component
        })
        .fold(BenefitAmounts::default(), |mut amounts, entry| {
            match entry.transaction_type {
                BenefitTransactionType::Accrual => amounts.accrual += entry.amount,
                BenefitTransactionType::Payout => amounts.payout += entry.amount,
            }
            amounts
        })
}

/// A benefit an employee may claim.
#[derive(Debug, Clone, Copy)]
pub struct ClaimableBenefit<'a> {
    /// The salary component.
    pub salary_component: &'a str,
    /// How the benefit is paid out.
    pub payout_method: Option<PayoutMethod>,
    /// The yearly benefit amount.
    pub yearly_amount: Decimal,
}

/// The most an employee can claim of a benefit.
///
/// Benefits accrued per cycle can be claimed up to what has accrued,
/// including the current cycle's amount, less what was paid. Benefits
/// claimable in full can be claimed up to the yearly amount less what was
/// paid. Fails when more was paid than accrued.
pub fn max_claim_eligible(
    config: &ConfigLoader,
    db: &Database,
    employee: &str,
    payroll_period: &str,
    benefit: &ClaimableBenefit<'_>,
    current_cycle_amount: Decimal,
) -> HrmsResult<Decimal> {
    let precision = config.currency_precision();
    let amounts = benefit_amounts(db, employee, payroll_period, benefit.salary_component);
    let accrued = flt(amounts.accrual, precision);
    let paid = flt(amounts.payout, precision);

    match benefit.payout_method {
        Some(PayoutMethod::AccruePerCycle) => {
            let accrued = accrued + current_cycle_amount;
            if accrued < paid {
                return Err(HrmsError::CalculationError {
                    message: format!(
                        "Accrued amount {} is less than paid amount {} for Benefit {} in payroll period {}",
                        accrued, paid, benefit.salary_component, payroll_period
                    ),
                });
            }
            Ok(flt(accrued - paid, precision))
        }
        Some(PayoutMethod::AllowClaimForFullAmount) => Ok(benefit.yearly_amount - paid),
        None => Ok(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(
        component: &str,
        transaction_type: BenefitTransactionType,
        amount: &str,
        reference: Option<&str>,
    ) -> BenefitLedgerEntry {
        BenefitLedgerEntry {
            name: String::new(),
            employee: "EMP-0001".to_string(),
            employee_name: "Asha Rao".to_string(),
            company: "Acme".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2026, 4, 30),
            payroll_period: "FY 2026-27".to_string(),
            salary_component: component.to_string(),
            transaction_type,
            amount: dec(amount),
            yearly_benefit: dec("12000"),
            flexible_benefit: true,
            reference_doctype: reference.map(|_| "Arrear".to_string()),
            reference_document: reference.map(str::to_string),
            salary_slip: Some("Sal Slip-00001".to_string()),
            remarks: None,
        }
    }

    fn benefit(payout_method: PayoutMethod) -> ClaimableBenefit<'static> {
        ClaimableBenefit {
            salary_component: "Medical Allowance",
            payout_method: Some(payout_method),
            yearly_amount: dec("12000"),
        }
    }

    #[test]
    fn test_deduction_component_is_rejected() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let mut db = Database::default();
        let result = insert_benefit_ledger_entry(
            &config,
            &mut db,
            entry("Provident Fund", BenefitTransactionType::Accrual, "100", None),
        );
        match result {
            Err(HrmsError::Validation { message, .. }) => {
                assert!(message.contains("must be of type 'Earning'"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
        assert!(db.benefit_ledger.is_empty());
    }

    #[test]
    fn test_amounts_by_transaction_type() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let mut db = Database::default();
        for (transaction_type, amount) in [
            (BenefitTransactionType::Accrual, "1000"),
            (BenefitTransactionType::Accrual, "1000"),
            (BenefitTransactionType::Payout, "1500"),
        ] {
            insert_benefit_ledger_entry(
                &config,
                &mut db,
                entry("Medical Allowance", transaction_type, amount, None),
            )
            .unwrap();
        }

        let amounts = benefit_amounts(&db, "EMP-0001", "FY 2026-27", "Medical Allowance");
        assert_eq!(amounts.accrual, dec("2000"));
        assert_eq!(amounts.payout, dec("1500"));
        assert_eq!(
            benefit_amounts(&db, "EMP-0001", "FY 2027-28", "Medical Allowance"),
            BenefitAmounts::default()
        );
    }

    #[test]
    fn test_accrue_per_cycle_eligibility() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let mut db = Database::default();
        db.benefit_ledger.push(entry(
            "Medical Allowance",
            BenefitTransactionType::Accrual,
            "3000",
            None,
        ));
        db.benefit_ledger.push(entry(
            "Medical Allowance",
            BenefitTransactionType::Payout,
            "1000",
            None,
        ));

        let eligible = max_claim_eligible(
            &config,
            &db,
            "EMP-0001",
            "FY 2026-27",
            &benefit(PayoutMethod::AccruePerCycle),
            dec("1000"),
        )
        .unwrap();
        assert_eq!(eligible, dec("3000"));
    }

    #[test]
    fn test_overpaid_accrual_is_an_error() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let mut db = Database::default();
        db.benefit_ledger.push(entry(
            "Medical Allowance",
            BenefitTransactionType::Payout,
            "500",
            None,
        ));

        let result = max_claim_eligible(
            &config,
            &db,
            "EMP-0001",
            "FY 2026-27",
            &benefit(PayoutMethod::AccruePerCycle),
            Decimal::ZERO,
        );
        assert!(matches!(result, Err(HrmsError::CalculationError { .. })));
    }

    #[test]
    fn test_full_amount_eligibility() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let mut db = Database::default();
        db.benefit_ledger.push(entry(
            "Medical Allowance",
            BenefitTransactionType::Payout,
            "4500",
            None,
        ));

        let eligible = max_claim_eligible(
            &config,
            &db,
            "EMP-0001",
            "FY 2026-27",
            &benefit(PayoutMethod::AllowClaimForFullAmount),
            dec("1000"),
        )
        .unwrap();
        assert_eq!(eligible, dec("7500"));
    }

    #[test]
    fn test_delete_by_reference_and_salary_slip() {
        let mut db = Database::default();
        db.benefit_ledger.push(entry(
            "Medical Allowance",
            BenefitTransactionType::Accrual,
            "100",
            Some("HR-ARR-00001"),
        ));
        db.benefit_ledger.push(entry(
            "Medical Allowance",
            BenefitTransactionType::Accrual,
            "100",
            None,
        ));

        let deleted =
            delete_benefit_ledger_entries(&mut db, LedgerReference::Document("HR-ARR-00001"));
        assert_eq!(deleted, 1);
        assert_eq!(db.benefit_ledger.len(), 1);

        let deleted =
            delete_benefit_ledger_entries(&mut db, LedgerReference::SalarySlip("Sal Slip-00001"));
        assert_eq!(deleted, 1);
        assert!(db.benefit_ledger.is_empty());
    }
}
