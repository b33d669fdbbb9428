//! Leave rules: balances, allocations, adjustments and earned leave.
//!
//! Every change to a leave balance is recorded as a signed entry in the
//! leave ledger. Allocations, adjustments and leave taken each write their
//! own entries, and the balance on a date is derived from the ledger alone.

mod adjustment;
mod allocation;
mod balance;
mod earned_leave;

pub use adjustment::{
    adjust_allocation, allocated_leave_types, cancel_leave_adjustment,
    leave_allocation_for_posting_date, submit_leave_adjustment, validate_leave_adjustment,
};
pub use allocation::{submit_leave_allocation, validate_leave_allocation};
pub use balance::{allocation_balance_on, allocation_on_date, leave_balance_on, record_leave_taken};
pub use earned_leave::{
    EarnedLeaveRunSummary, EarnedLeaveScheduleParams, allocate_due_earned_leaves,
    build_earned_leave_schedule, retry_failed_allocations, run_earned_leave_scheduler,
};
