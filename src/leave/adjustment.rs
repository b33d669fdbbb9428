//! Leave adjustment: manual increase or decrease of an allocation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::ConfigLoader;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AdjustmentType, DocStatus, LeaveAdjustment, LeaveAllocation, LeaveLedgerEntry,
    LeaveTransactionType, LifecycleAction,
};
use crate::rounding::flt;
use crate::store::Database;

use super::balance::{allocation_balance_on, allocation_on_date};

const DOCTYPE: &str = "Leave Adjustment";

/// Validates a leave adjustment against its allocation.
///
/// `leaves_to_adjust` is rounded to the float precision and must be
/// positive. The allocation must be submitted, belong to the same employee
/// and leave type, and cover the posting date. Only one submitted adjustment
/// per allocation and posting date is allowed. Allocating may not take the
/// allocation above the leave type's maximum, and reducing may not make the
/// balance on the posting date negative unless the leave type allows it.
pub fn validate_leave_adjustment(
    config: &ConfigLoader,
    db: &Database,
    adjustment: &mut LeaveAdjustment,
) -> HrmsResult<()> {
    adjustment.leaves_to_adjust = flt(adjustment.leaves_to_adjust, config.float_precision());
    if adjustment.leaves_to_adjust <= Decimal::ZERO {
        return Err(HrmsError::validation(
            DOCTYPE,
            "Leaves to adjust must be greater than zero",
        ));
    }

    let allocation = db.get::<LeaveAllocation>(&adjustment.leave_allocation)?;
    if !allocation.docstatus.is_submitted() {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!("Leave Allocation {} is not submitted", allocation.name),
        ));
    }
    if allocation.employee != adjustment.employee
        || allocation.leave_type != adjustment.leave_type
    {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Leave Allocation {} does not belong to {} for {}",
                allocation.name, adjustment.employee, adjustment.leave_type
            ),
        ));
    }
    if adjustment.posting_date < allocation.from_date
        || adjustment.posting_date > allocation.to_date
    {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Posting date {} is outside Leave Allocation {} ({} to {})",
                adjustment.posting_date, allocation.name, allocation.from_date, allocation.to_date
            ),
        ));
    }

    if let Some(existing) = db.leave_adjustments.iter().find(|other| {
        other.name != adjustment.name
            && other.docstatus.is_submitted()
            && other.leave_allocation == adjustment.leave_allocation
            && other.posting_date == adjustment.posting_date
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "Leave Allocation {} was already adjusted on {}",
                allocation.name, adjustment.posting_date
            ),
        });
    }

    let leave_type = config.get_leave_type(&allocation.leave_type)?;
    match adjustment.adjustment_type {
        AdjustmentType::Allocate => {
            if let Some(max) = leave_type.max_leaves() {
                let new_total = allocation.total_leaves_allocated + adjustment.leaves_to_adjust;
                if new_total > max {
                    return Err(HrmsError::validation(
                        DOCTYPE,
                        format!(
                            "Total allocated leaves {} would exceed the maximum allocation of {} for {}",
                            new_total, max, allocation.leave_type
                        ),
                    ));
                }
            }
        }
        AdjustmentType::Reduce => {
            let balance = allocation_balance_on(db, allocation, adjustment.posting_date);
            if !leave_type.allow_negative && balance < adjustment.leaves_to_adjust {
                return Err(HrmsError::validation(
                    DOCTYPE,
                    format!(
                        "Reducing {} leaves would make the balance negative, only {} available on {}",
                        adjustment.leaves_to_adjust, balance, adjustment.posting_date
                    ),
                ));
            }
        }
    }

    Ok(())
}

/// Validates and submits a leave adjustment.
///
/// Writes a ledger entry of the signed amount from the posting date to the
/// end of the allocation and updates the allocation's total.
pub fn submit_leave_adjustment(
    config: &ConfigLoader,
    db: &mut Database,
    mut adjustment: LeaveAdjustment,
) -> HrmsResult<LeaveAdjustment> {
    validate_leave_adjustment(config, db, &mut adjustment)?;
    adjustment.docstatus =
        adjustment
            .docstatus
            .transition(LifecycleAction::Submit, DOCTYPE, &adjustment.name)?;

    let allocation = db.get_mut::<LeaveAllocation>(&adjustment.leave_allocation)?;
    allocation.total_leaves_allocated += adjustment.signed_leaves();
    let to_date = allocation.to_date;

    let name = db.insert(adjustment);
    let adjustment = db.get::<LeaveAdjustment>(&name)?.clone();
    db.leave_ledger.push(LeaveLedgerEntry {
        employee: adjustment.employee.clone(),
        leave_type: adjustment.leave_type.clone(),
        transaction_type: LeaveTransactionType::LeaveAdjustment,
        transaction_name: name.clone(),
        leaves: adjustment.signed_leaves(),
        from_date: adjustment.posting_date,
        to_date,
        is_carry_forward: false,
    });

    info!(
        adjustment = %name,
        allocation = %adjustment.leave_allocation,
        leaves = %adjustment.signed_leaves(),
        "Submitted leave adjustment"
    );
    Ok(adjustment)
}

/// Cancels a submitted leave adjustment, removing its ledger entry and
/// restoring the allocation's total.
pub fn cancel_leave_adjustment(db: &mut Database, name: &str) -> HrmsResult<LeaveAdjustment> {
    let mut adjustment = db.get::<LeaveAdjustment>(name)?.clone();
    adjustment.docstatus = adjustment
        .docstatus
        .transition(LifecycleAction::Cancel, DOCTYPE, name)?;

    let allocation = db.get_mut::<LeaveAllocation>(&adjustment.leave_allocation)?;
    allocation.total_leaves_allocated -= adjustment.signed_leaves();
    db.leave_ledger.retain(|entry| {
        !(entry.transaction_type == LeaveTransactionType::LeaveAdjustment
            && entry.transaction_name == name)
    });
    db.insert(adjustment.clone());

    info!(adjustment = %name, "Cancelled leave adjustment");
    Ok(adjustment)
}

/// Creates and submits an adjustment against an existing allocation.
pub fn adjust_allocation(
    config: &ConfigLoader,
    db: &mut Database,
    allocation_name: &str,
    adjustment_type: AdjustmentType,
    leaves_to_adjust: Decimal,
    posting_date: NaiveDate,
) -> HrmsResult<LeaveAdjustment> {
    let allocation = db.get::<LeaveAllocation>(allocation_name)?;
    let adjustment = LeaveAdjustment {
        name: String::new(),
        employee: allocation.employee.clone(),
        leave_type: allocation.leave_type.clone(),
        leave_allocation: allocation.name.clone(),
        posting_date,
        adjustment_type,
        leaves_to_adjust,
        docstatus: DocStatus::Draft,
    };
    submit_leave_adjustment(config, db, adjustment)
}

/// The submitted allocation an adjustment posted on `posting_date` would apply to.
pub fn leave_allocation_for_posting_date<'a>(
    db: &'a Database,
    employee: &str,
    leave_type: &str,
    posting_date: NaiveDate,
) -> Option<&'a LeaveAllocation> {
    allocation_on_date(db, employee, leave_type, posting_date)
}

/// Leave types with a submitted allocation covering `date`, sorted by name.
pub fn allocated_leave_types(db: &Database, employee: &str, date: NaiveDate) -> Vec<String> {
    let mut leave_types: Vec<String> = db
        .leave_allocations
        .iter()
        .filter(|allocation| {
            allocation.employee == employee
                && allocation.docstatus.is_submitted()
                && allocation.from_date <= date
                && allocation.to_date >= date
        })
        .map(|allocation| allocation.leave_type.clone())
        .collect();
    leave_types.sort();
    leave_types.dedup();
    leave_types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::{leave_balance_on, record_leave_taken, submit_leave_allocation};
    use crate::models::{Employee, EmployeeStatus};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(leave_type: &str, leaves: &str) -> (ConfigLoader, Database, String) {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let mut db = Database::default();
        db.insert(Employee {
            id: "EMP-0001".to_string(),
            employee_name: "Asha Rao".to_string(),
            company: "Acme".to_string(),
            date_of_joining: date(2024, 1, 1),
            relieving_date: None,
            status: EmployeeStatus::Active,
            holiday_list: None,
        });
        let allocation = submit_leave_allocation(
            &config,
            &mut db,
            LeaveAllocation {
                name: String::new(),
                employee: "EMP-0001".to_string(),
                leave_type: leave_type.to_string(),
                from_date: date(2026, 3, 1),
                to_date: date(2026, 3, 31),
                new_leaves_allocated: dec(leaves),
                carry_forward: false,
                carry_forwarded_leaves: Decimal::ZERO,
                total_leaves_allocated: Decimal::ZERO,
                earned_leave_schedule: vec![],
                docstatus: DocStatus::Draft,
            },
            date(2026, 3, 1),
        )
        .unwrap();
        (config, db, allocation.name)
    }

    fn balance(db: &Database, leave_type: &str, on: NaiveDate) -> Decimal {
        leave_balance_on(db, "EMP-0001", leave_type, on)
    }

    fn adjust(
        config: &ConfigLoader,
        db: &mut Database,
        allocation: &str,
        adjustment_type: AdjustmentType,
        leaves: &str,
        posting_date: NaiveDate,
    ) -> HrmsResult<LeaveAdjustment> {
        adjust_allocation(config, db, allocation, adjustment_type, dec(leaves), posting_date)
    }

    fn take_leave(db: &mut Database, from_date: NaiveDate, to_date: NaiveDate) {
        record_leave_taken(db, "EMP-0001", "Casual Leave", from_date, to_date, "HR-LAP-00001")
            .unwrap();
    }

    #[test]
    fn test_allocate_increases_balance() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Allocate,
            "2",
            date(2026, 3, 10),
        )
        .unwrap();

        assert_eq!(balance(&db, "Casual Leave", date(2026, 3, 10)), dec("12"));
        assert_eq!(
            db.get::<LeaveAllocation>(&allocation).unwrap().total_leaves_allocated,
            dec("12")
        );
    }

    #[test]
    fn test_reduce_decreases_balance() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "3",
            date(2026, 3, 10),
        )
        .unwrap();

        assert_eq!(balance(&db, "Casual Leave", date(2026, 3, 31)), dec("7"));
    }

    #[test]
    fn test_adjustment_after_leave_taken() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        take_leave(&mut db, date(2026, 3, 16), date(2026, 3, 18));
        adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Allocate,
            "2",
            date(2026, 3, 31),
        )
        .unwrap();

        // 10 - 3 + 2
        assert_eq!(balance(&db, "Casual Leave", date(2026, 3, 31)), dec("9"));
    }

    #[test]
    fn test_leaves_are_rounded_to_float_precision() {
        let (config, mut db, allocation) = setup("Casual Leave", "5");
        let adjustment = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Allocate,
            "5.126",
            date(2026, 3, 10),
        )
        .unwrap();
        assert_eq!(adjustment.leaves_to_adjust, dec("5.13"));
    }

    #[test]
    fn test_zero_leaves_are_rejected() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        let result = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Allocate,
            "0.001",
            date(2026, 3, 10),
        );
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
    }

    #[test]
    fn test_duplicate_adjustment_on_same_date_is_rejected() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        let first = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "3",
            date(2026, 3, 10),
        )
        .unwrap();

        let result = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Allocate,
            "1",
            date(2026, 3, 10),
        );
        match result {
            Err(HrmsError::Duplicate { existing, .. }) => assert_eq!(existing, first.name),
            other => panic!("Expected Duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_allocate_above_max_is_rejected() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        let result = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Allocate,
            "3",
            date(2026, 3, 10),
        );
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
        assert_eq!(balance(&db, "Casual Leave", date(2026, 3, 10)), dec("10"));
    }

    #[test]
    fn test_reduce_below_zero_is_rejected() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        take_leave(&mut db, date(2026, 3, 1), date(2026, 3, 7));

        let result = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "5",
            date(2026, 3, 21),
        );
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
    }

    #[test]
    fn test_reduce_below_zero_allowed_for_negative_leave_types() {
        let (config, mut db, allocation) = setup("Compensatory Off", "2");
        adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "5",
            date(2026, 3, 21),
        )
        .unwrap();
        assert_eq!(balance(&db, "Compensatory Off", date(2026, 3, 21)), dec("-3"));
    }

    #[test]
    fn test_posting_date_outside_allocation_is_rejected() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        let result = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "1",
            date(2026, 4, 1),
        );
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
    }

    #[test]
    fn test_cancel_restores_balance() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        let adjustment = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "4",
            date(2026, 3, 10),
        )
        .unwrap();
        assert_eq!(balance(&db, "Casual Leave", date(2026, 3, 10)), dec("6"));

        let cancelled = cancel_leave_adjustment(&mut db, &adjustment.name).unwrap();
        assert_eq!(cancelled.docstatus, DocStatus::Cancelled);
        assert_eq!(balance(&db, "Casual Leave", date(2026, 3, 10)), dec("10"));
        assert_eq!(
            db.get::<LeaveAllocation>(&allocation).unwrap().total_leaves_allocated,
            dec("10")
        );

        // A cancelled adjustment no longer blocks the date
        adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "1",
            date(2026, 3, 10),
        )
        .unwrap();
        assert!(cancel_leave_adjustment(&mut db, &adjustment.name).is_err());
    }

    #[test]
    fn test_cancel_without_allocation_keeps_ledger_entry() {
        let (config, mut db, allocation) = setup("Casual Leave", "10");
        let adjustment = adjust(
            &config,
            &mut db,
            &allocation,
            AdjustmentType::Reduce,
            "4",
            date(2026, 3, 10),
        )
        .unwrap();
        db.leave_allocations.retain(|other| other.name != allocation);

        let result = cancel_leave_adjustment(&mut db, &adjustment.name);
        assert!(matches!(result, Err(HrmsError::NotFound { .. })));
        assert!(db.leave_ledger.iter().any(|entry| entry.transaction_name == adjustment.name));
        assert_eq!(
            db.get::<LeaveAdjustment>(&adjustment.name).unwrap().docstatus,
            DocStatus::Submitted
        );
    }

    #[test]
    fn test_queries() {
        let (_config, db, allocation) = setup("Casual Leave", "10");
        let found = leave_allocation_for_posting_date(
            &db,
            "EMP-0001",
            "Casual Leave",
            date(2026, 3, 15),
        )
        .unwrap();
        assert_eq!(found.name, allocation);
        assert!(
            leave_allocation_for_posting_date(&db, "EMP-0001", "Casual Leave", date(2026, 4, 1))
                .is_none()
        );

        assert_eq!(
            allocated_leave_types(&db, "EMP-0001", date(2026, 3, 15)),
            vec!["Casual Leave".to_string()]
        );
        assert!(allocated_leave_types(&db, "EMP-0002", date(2026, 3, 15)).is_empty());
    }
}
