//! Leave ledger queries and balance.
//!
//! The balance of a leave type on a date is the sum of ledger entries that
//! belong to the submitted allocation covering that date and that start on
//! or before the date. Once an allocation ends its leaves expire, so a date
//! with no covering allocation has a balance of zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{HrmsError, HrmsResult};
use crate::models::{LeaveAllocation, LeaveLedgerEntry, LeaveTransactionType};
use crate::store::Database;

/// The submitted allocation of a leave type covering a date, if any.
pub fn allocation_on_date<'a>(
    db: &'a Database,
    employee: &str,
    leave_type: &str,
    date: NaiveDate,
) -> Option<&'a LeaveAllocation> {
    db.leave_allocations.iter().find(|allocation| {
        allocation.employee == employee
            && allocation.leave_type == leave_type
            && allocation.docstatus.is_submitted()
            && allocation.from_date <= date
            && allocation.to_date >= date
    })
}

/// Sum of the ledger entries of an allocation that start on or before `date`.
pub fn allocation_balance_on(
    db: &Database,
    allocation: &LeaveAllocation,
    date: NaiveDate,
) -> Decimal {
    db.leave_ledger
        .iter()
        .filter(|entry| {
            entry.employee == allocation.employee
                && entry.leave_type == allocation.leave_type
                && entry.from_date >= allocation.from_date
                && entry.from_date <= date
                && entry.from_date <= allocation.to_date
        })
        .map(|entry| entry.leaves)
        .sum()
}

/// Returns the leave balance of an employee for a leave type on a date.
///
/// # Examples
///
/// ```
/// use hrms_rules::leave::leave_balance_on;
/// use hrms_rules::store::Database;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let db = Database::default();
/// let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// assert_eq!(leave_balance_on(&db, "EMP-0001", "Casual Leave", date), Decimal::ZERO);
/// ```
pub fn leave_balance_on(
    db: &Database,
    employee: &str,
    leave_type: &str,
    date: NaiveDate,
) -> Decimal {
    match allocation_on_date(db, employee, leave_type, date) {
        Some(allocation) => allocation_balance_on(db, allocation, date),
        None => Decimal::ZERO,
    }
}

/// Records leave taken as a negative ledger entry of one leave per calendar day.
///
/// Fails when no submitted allocation covers `from_date`.
pub fn record_leave_taken(
    db: &mut Database,
    employee: &str,
    leave_type: &str,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reference: &str,
) -> HrmsResult<Decimal> {
    if from_date > to_date {
        return Err(HrmsError::validation(
            "Leave Application",
            "To date cannot be before from date",
        ));
    }
    if allocation_on_date(db, employee, leave_type, from_date).is_none() {
        return Err(HrmsError::validation(
            "Leave Application",
            format!(
                "No leave allocation found for {} for {} on {}",
                employee, leave_type, from_date
            ),
        ));
    }

    let days = Decimal::from((to_date - from_date).num_days() + 1);
    db.leave_ledger.push(LeaveLedgerEntry {
        employee: employee.to_string(),
        leave_type: leave_type.to_string(),
        transaction_type: LeaveTransactionType::LeaveApplication,
        transaction_name: reference.to_string(),
        leaves: -days,
        from_date,
        to_date,
        is_carry_forward: false,
    });

    debug!(employee, leave_type, %from_date, %to_date, %days, "Recorded leave taken");
    Ok(days)
}
