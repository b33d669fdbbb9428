//! Leave allocation validation and submission.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::ConfigLoader;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    Employee, LeaveAllocation, LeaveLedgerEntry, LeaveTransactionType, LifecycleAction,
};
use crate::rounding::flt;
use crate::store::Database;

use super::balance::allocation_balance_on;
use super::earned_leave::{
    EarnedLeaveScheduleParams, allocate_due_earned_leaves, build_earned_leave_schedule,
};

const DOCTYPE: &str = "Leave Allocation";

/// Validates a leave allocation and fills in its computed totals.
///
/// Checks the date range, that no other submitted allocation of the same
/// leave type overlaps it, and the leave type's allocation cap. When carry
/// forward is requested, the unused balance of the previous allocation is
/// added to the total, capped by the leave type's carry forward limit and by
/// what remains below its maximum allocation.
pub fn validate_leave_allocation(
    config: &ConfigLoader,
    db: &Database,
    allocation: &mut LeaveAllocation,
) -> HrmsResult<()> {
    if allocation.from_date > allocation.to_date {
        return Err(HrmsError::validation(
            DOCTYPE,
            "To date cannot be before from date",
        ));
    }
    db.get::<Employee>(&allocation.employee)?;
    let leave_type = config.get_leave_type(&allocation.leave_type)?;

    if let Some(existing) = db.leave_allocations.iter().find(|other| {
        other.name != allocation.name
            && other.employee == allocation.employee
            && other.leave_type == allocation.leave_type
            && other.docstatus.is_submitted()
            && other.from_date <= allocation.to_date
            && other.to_date >= allocation.from_date
    }) {
        return Err(HrmsError::Duplicate {
            doctype: DOCTYPE.to_string(),
            existing: existing.name.clone(),
            message: format!(
                "{} already has an allocation for {} between {} and {}",
                allocation.employee, allocation.leave_type, existing.from_date, existing.to_date
            ),
        });
    }

    allocation.new_leaves_allocated =
        flt(allocation.new_leaves_allocated, config.float_precision());
    if allocation.new_leaves_allocated < Decimal::ZERO {
        return Err(HrmsError::validation(
            DOCTYPE,
            "New leaves allocated cannot be negative",
        ));
    }
    if let Some(max) = leave_type.max_leaves() {
        if allocation.new_leaves_allocated > max {
            return Err(HrmsError::validation(
                DOCTYPE,
                format!(
                    "Total allocated leaves {} are more than maximum allocation allowed for {} ({})",
                    allocation.new_leaves_allocated, allocation.leave_type, max
                ),
            ));
        }
    }

    allocation.carry_forwarded_leaves = if allocation.carry_forward {
        if !leave_type.is_carry_forward {
            return Err(HrmsError::validation(
                DOCTYPE,
                format!("Leave Type {} cannot be carry-forwarded", allocation.leave_type),
            ));
        }
        let unused = carry_forwarded_leaves(db, allocation);
        if leave_type.maximum_carry_forwarded_leaves > Decimal::ZERO {
            unused.min(leave_type.maximum_carry_forwarded_leaves)
        } else {
            unused
        }
    } else {
        Decimal::ZERO
    };
    if let Some(max) = leave_type.max_leaves() {
        allocation.carry_forwarded_leaves = allocation
            .carry_forwarded_leaves
            .min(max - allocation.new_leaves_allocated)
            .max(Decimal::ZERO);
    }

    allocation.total_leaves_allocated =
        allocation.new_leaves_allocated + allocation.carry_forwarded_leaves;
    Ok(())
}

/// Unused leaves of the latest submitted allocation ending before this one starts.
fn carry_forwarded_leaves(db: &Database, allocation: &LeaveAllocation) -> Decimal {
    db.leave_allocations
        .iter()
        .filter(|previous| {
            previous.employee == allocation.employee
                && previous.leave_type == allocation.leave_type
                && previous.docstatus.is_submitted()
                && previous.to_date < allocation.from_date
        })
        .max_by_key(|previous| previous.to_date)
        .map(|previous| allocation_balance_on(db, previous, previous.to_date))
        .unwrap_or_default()
        .max(Decimal::ZERO)
}

/// Validates and submits a leave allocation.
///
/// Writes a carry-forward ledger entry and a ledger entry for the new
/// leaves. For earned leave types the schedule is built with `today` as the
/// assignment date and every row already due is credited straight away.
pub fn submit_leave_allocation(
    config: &ConfigLoader,
    db: &mut Database,
    mut allocation: LeaveAllocation,
    today: NaiveDate,
) -> HrmsResult<LeaveAllocation> {
    validate_leave_allocation(config, db, &mut allocation)?;
    allocation.docstatus =
        allocation
            .docstatus
            .transition(LifecycleAction::Submit, DOCTYPE, &allocation.name)?;

    let leave_type = config.get_leave_type(&allocation.leave_type)?;
    let is_earned_leave = leave_type.is_earned_leave();
    if let Some(policy) = &leave_type.earned_leave {
        if allocation.earned_leave_schedule.is_empty() {
            let employee = db.get::<Employee>(&allocation.employee)?;
            allocation.earned_leave_schedule =
                build_earned_leave_schedule(&EarnedLeaveScheduleParams {
                    policy,
                    date_of_joining: employee.date_of_joining,
                    from_date: allocation.from_date,
                    to_date: allocation.to_date,
                    assignment_date: today,
                    max_leaves_allowed: leave_type.max_leaves(),
                    float_precision: config.float_precision(),
                })?;
        }
    }

    let name = db.insert(allocation);
    let allocation = db.get::<LeaveAllocation>(&name)?.clone();

    for (leaves, is_carry_forward) in [
        (allocation.carry_forwarded_leaves, true),
        (allocation.new_leaves_allocated, false),
    ] {
        if leaves > Decimal::ZERO {
            db.leave_ledger.push(LeaveLedgerEntry {
                employee: allocation.employee.clone(),
                leave_type: allocation.leave_type.clone(),
                transaction_type: LeaveTransactionType::LeaveAllocation,
                transaction_name: name.clone(),
                leaves,
                from_date: allocation.from_date,
                to_date: allocation.to_date,
                is_carry_forward,
            });
        }
    }

    info!(
        allocation = %name,
        employee = %allocation.employee,
        leave_type = %allocation.leave_type,
        total = %allocation.total_leaves_allocated,
        carry_forwarded = %allocation.carry_forwarded_leaves,
        "Submitted leave allocation"
    );

    if is_earned_leave {
        allocate_due_earned_leaves(config, db, &name, today)?;
    }

    Ok(db.get::<LeaveAllocation>(&name)?.clone())
}
