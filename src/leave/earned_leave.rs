//! Earned leave schedule and periodic crediting.
//!
//! An earned leave policy credits `annual_allocation / periods_per_year`
//! leaves per calendar-aligned period. The period in which the employee joins
//! is prorated by the days worked in it, and every credit that falls before
//! the date the policy is assigned is folded into one catch-up credit on that
//! date.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ConfigLoader;
use crate::dates::{add_months, days_in_month, days_inclusive};
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AllocateOnDay, AllocatedVia, EarnedLeaveFrequency, EarnedLeavePolicy, EarnedLeaveScheduleRow,
    LeaveAllocation, LeaveLedgerEntry, LeaveTransactionType,
};
use crate::rounding::round_earned_leaves;
use crate::store::Database;

const DOCTYPE: &str = "Leave Allocation";

/// Inputs for building an earned leave schedule.
#[derive(Debug, Clone)]
pub struct EarnedLeaveScheduleParams<'a> {
    /// The accrual policy of the leave type.
    pub policy: &'a EarnedLeavePolicy,
    /// The employee's date of joining.
    pub date_of_joining: NaiveDate,
    /// First day of the allocation.
    pub from_date: NaiveDate,
    /// Last day of the allocation.
    pub to_date: NaiveDate,
    /// The date the policy is assigned to the employee.
    pub assignment_date: NaiveDate,
    /// Cap on the total scheduled leaves.
    pub max_leaves_allowed: Option<Decimal>,
    /// Decimal places used when the policy has no rounding.
    pub float_precision: u32,
}

/// Builds the earned leave schedule of an allocation.
///
/// One row is produced per accrual period from the period containing
/// `from_date` up to `to_date`. Rows dated before the as-of date (the latest
/// of the assignment date, the date of joining and `from_date`, but no later
/// than `to_date`) are folded into a single row on the as-of date, credited
/// on assignment. Allocation
/// dates past `to_date` are clamped to it, and the running total never
/// exceeds `max_leaves_allowed`.
///
/// # Errors
///
/// Returns a validation error when `from_date` is after `to_date`, or when
/// the policy credits on the date of joining with a frequency other than
/// monthly.
///
/// # Examples
///
/// ```
/// use hrms_rules::leave::{build_earned_leave_schedule, EarnedLeaveScheduleParams};
/// use hrms_rules::models::{AllocateOnDay, EarnedLeaveFrequency, EarnedLeavePolicy};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let policy = EarnedLeavePolicy {
///     annual_allocation: Decimal::from(24),
///     frequency: EarnedLeaveFrequency::Quarterly,
///     allocate_on_day: AllocateOnDay::FirstDay,
///     rounding: None,
/// };
/// let jan_1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let rows = build_earned_leave_schedule(&EarnedLeaveScheduleParams {
///     policy: &policy,
///     date_of_joining: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     from_date: jan_1,
///     to_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
///     assignment_date: jan_1,
///     max_leaves_allowed: None,
///     float_precision: 2,
/// })
/// .unwrap();
///
/// assert_eq!(rows.len(), 4);
/// assert!(rows.iter().all(|row| row.number_of_leaves == Decimal::from(6)));
/// ```
pub fn build_earned_leave_schedule(
    params: &EarnedLeaveScheduleParams<'_>,
) -> HrmsResult<Vec<EarnedLeaveScheduleRow>> {
    let policy = params.policy;

    if params.from_date > params.to_date {
        return Err(HrmsError::validation(
            DOCTYPE,
            "To date cannot be before from date",
        ));
    }
    if policy.allocate_on_day == AllocateOnDay::DateOfJoining
        && policy.frequency != EarnedLeaveFrequency::Monthly
    {
        return Err(HrmsError::validation(
            DOCTYPE,
            "Allocation on the date of joining is only supported for monthly earned leave",
        ));
    }

    let months = policy.frequency.months_per_period();
    let per_period = policy.annual_allocation / Decimal::from(policy.frequency.periods_per_year());
    let as_of = params
        .assignment_date
        .max(params.date_of_joining)
        .max(params.from_date)
        .min(params.to_date);

    let mut planned = Vec::new();
    let mut period_start = period_start_containing(params.from_date, months)?;
    while period_start <= params.to_date {
        let period_end = add_months(period_start, months) - Duration::days(1);
        let amount = prorated_amount(per_period, period_start, period_end, params.date_of_joining);
        let amount = round_earned_leaves(amount, policy.rounding, params.float_precision);

        let allocation_date = match policy.allocate_on_day {
            AllocateOnDay::FirstDay => period_start,
            AllocateOnDay::LastDay => period_end,
            AllocateOnDay::DateOfJoining => {
                let day = params
                    .date_of_joining
                    .day()
                    .min(days_in_month(period_start.year(), period_start.month()));
                period_start + Duration::days(i64::from(day) - 1)
            }
        };
        planned.push((allocation_date.min(params.to_date), amount));
        period_start = period_end + Duration::days(1);
    }

    let (past, upcoming): (Vec<_>, Vec<_>) =
        planned.into_iter().partition(|(date, _)| *date < as_of);

    let mut rows: Vec<EarnedLeaveScheduleRow> = Vec::new();
    if !past.is_empty() {
        let catch_up: Decimal = past.iter().map(|(_, amount)| *amount).sum();
        rows.push(schedule_row(as_of, catch_up, AllocatedVia::Assignment));
    }
    for (date, amount) in upcoming {
        match rows.last_mut() {
            Some(last) if last.allocation_date == date => last.number_of_leaves += amount,
            _ => {
                let via = if date == as_of {
                    AllocatedVia::Assignment
                } else {
                    AllocatedVia::Scheduler
                };
                rows.push(schedule_row(date, amount, via));
            }
        }
    }

    if let Some(max) = params.max_leaves_allowed {
        let mut cumulative = Decimal::ZERO;
        rows.retain_mut(|row| {
            let room = (max - cumulative).max(Decimal::ZERO);
            if row.number_of_leaves > room {
                if room.is_zero() {
                    return false;
                }
                row.number_of_leaves = room;
            }
            cumulative += row.number_of_leaves;
            true
        });
    }

    Ok(rows)
}

fn schedule_row(date: NaiveDate, leaves: Decimal, via: AllocatedVia) -> EarnedLeaveScheduleRow {
    EarnedLeaveScheduleRow {
        allocation_date: date,
        number_of_leaves: leaves,
        allocated_via: via,
        attempted: false,
        is_allocated: false,
        failed: false,
        failed_reason: None,
    }
}

fn period_start_containing(date: NaiveDate, months: u32) -> HrmsResult<NaiveDate> {
    let start_month0 = (date.month0() / months) * months;
    NaiveDate::from_ymd_opt(date.year(), start_month0 + 1, 1).ok_or_else(|| {
        HrmsError::CalculationError {
            message: format!(
                "No accrual period starts in month {} of {}",
                start_month0 + 1,
                date.year()
            ),
        }
    })
}

fn prorated_amount(
    per_period: Decimal,
    period_start: NaiveDate,
    period_end: NaiveDate,
    date_of_joining: NaiveDate,
) -> Decimal {
    if period_end < date_of_joining {
        Decimal::ZERO
    } else if date_of_joining > period_start {
        per_period * Decimal::from(days_inclusive(date_of_joining, period_end))
            / Decimal::from(days_inclusive(period_start, period_end))
    } else {
        per_period
    }
}

/// Outcome of crediting the due rows of one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarnedLeaveRunSummary {
    /// The allocation processed.
    pub allocation: String,
    /// Leaves credited in this run.
    pub leaves_allocated: Decimal,
    /// Rows credited in this run.
    pub rows_allocated: u32,
    /// Rows that failed in this run.
    pub rows_failed: u32,
}

/// Credits every schedule row of an allocation due on or before `today`.
///
/// Each row is attempted once. A row whose credit would take the allocation
/// above the leave type's maximum is marked failed with a reason; other rows
/// add their leaves to the allocation and write a ledger entry from the row's
/// allocation date to the end of the allocation.
pub fn allocate_due_earned_leaves(
    config: &ConfigLoader,
    db: &mut Database,
    allocation_name: &str,
    today: NaiveDate,
) -> HrmsResult<EarnedLeaveRunSummary> {
    let mut allocation = db.get::<LeaveAllocation>(allocation_name)?.clone();
    if !allocation.docstatus.is_submitted() {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!(
                "Earned leaves can only be credited to a submitted allocation, {} is not",
                allocation_name
            ),
        ));
    }
    let max = config.get_leave_type(&allocation.leave_type)?.max_leaves();

    let mut summary = EarnedLeaveRunSummary {
        allocation: allocation.name.clone(),
        leaves_allocated: Decimal::ZERO,
        rows_allocated: 0,
        rows_failed: 0,
    };
    let mut entries = Vec::new();

    for row in allocation
        .earned_leave_schedule
        .iter_mut()
        .filter(|row| !row.attempted && row.allocation_date <= today)
    {
        row.attempted = true;
        let new_total = allocation.total_leaves_allocated + row.number_of_leaves;

        if let Some(max) = max.filter(|max| new_total > *max) {
            let reason = format!(
                "Allocating {} leaves would exceed the maximum of {} leaves",
                row.number_of_leaves, max
            );
            warn!(
                allocation = %allocation.name,
                allocation_date = %row.allocation_date,
                %reason,
                "Earned leave allocation failed"
            );
            row.failed = true;
            row.failed_reason = Some(reason);
            summary.rows_failed += 1;
            continue;
        }

        allocation.total_leaves_allocated = new_total;
        allocation.new_leaves_allocated += row.number_of_leaves;
        row.is_allocated = true;
        row.failed = false;
        row.failed_reason = None;
        summary.leaves_allocated += row.number_of_leaves;
        summary.rows_allocated += 1;

        if !row.number_of_leaves.is_zero() {
            entries.push(LeaveLedgerEntry {
                employee: allocation.employee.clone(),
                leave_type: allocation.leave_type.clone(),
                transaction_type: LeaveTransactionType::LeaveAllocation,
                transaction_name: allocation.name.clone(),
                leaves: row.number_of_leaves,
                from_date: row.allocation_date,
                to_date: allocation.to_date,
                is_carry_forward: false,
            });
        }
    }

    db.leave_ledger.extend(entries);
    db.insert(allocation);

    if summary.rows_allocated > 0 || summary.rows_failed > 0 {
        info!(
            allocation = %summary.allocation,
            leaves = %summary.leaves_allocated,
            rows_allocated = summary.rows_allocated,
            rows_failed = summary.rows_failed,
            "Processed earned leave schedule"
        );
    }
    Ok(summary)
}

/// Re-attempts the failed rows of an allocation that are due on or before `today`.
pub fn retry_failed_allocations(
    config: &ConfigLoader,
    db: &mut Database,
    allocation_name: &str,
    today: NaiveDate,
) -> HrmsResult<EarnedLeaveRunSummary> {
    let allocation = db.get_mut::<LeaveAllocation>(allocation_name)?;
    for row in allocation
        .earned_leave_schedule
        .iter_mut()
        .filter(|row| row.attempted && row.failed && row.allocation_date <= today)
    {
        row.attempted = false;
        row.failed = false;
        row.failed_reason = None;
    }
    allocate_due_earned_leaves(config, db, allocation_name, today)
}

/// Credits the due rows of every submitted allocation.
///
/// This is the periodic job a host runs once a day.
pub fn run_earned_leave_scheduler(
    config: &ConfigLoader,
    db: &mut Database,
    today: NaiveDate,
) -> HrmsResult<Vec<EarnedLeaveRunSummary>> {
    let due: Vec<String> = db
        .leave_allocations
        .iter()
        .filter(|allocation| {
            allocation.docstatus.is_submitted()
                && allocation
                    .earned_leave_schedule
                    .iter()
                    .any(|row| !row.attempted && row.allocation_date <= today)
        })
        .map(|allocation| allocation.name.clone())
        .collect();

    due.iter()
        .map(|name| allocate_due_earned_leaves(config, db, name, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocStatus, EarnedLeaveRounding};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn policy(
        frequency: EarnedLeaveFrequency,
        allocate_on_day: AllocateOnDay,
        rounding: Option<EarnedLeaveRounding>,
    ) -> EarnedLeavePolicy {
        EarnedLeavePolicy {
            annual_allocation: dec("24"),
            frequency,
            allocate_on_day,
            rounding,
        }
    }

    fn schedule(
        policy: &EarnedLeavePolicy,
        date_of_joining: NaiveDate,
        assignment_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Vec<EarnedLeaveScheduleRow> {
        build_earned_leave_schedule(&EarnedLeaveScheduleParams {
            policy,
            date_of_joining,
            from_date: date(2026, 1, 1),
            to_date,
            assignment_date,
            max_leaves_allowed: None,
            float_precision: 2,
        })
        .unwrap()
    }

    fn amounts(rows: &[EarnedLeaveScheduleRow]) -> Vec<(NaiveDate, Decimal)> {
        rows.iter()
            .map(|row| (row.allocation_date, row.number_of_leaves))
            .collect()
    }

    #[test]
    fn test_monthly_schedule_credits_two_leaves_per_month() {
        let policy = policy(EarnedLeaveFrequency::Monthly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2026, 12, 31));

        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|row| row.number_of_leaves == dec("2")));
        assert_eq!(rows[0].allocated_via, AllocatedVia::Assignment);
        assert_eq!(rows[1].allocated_via, AllocatedVia::Scheduler);
        assert_eq!(rows[11].allocation_date, date(2026, 12, 1));
    }

    #[test]
    fn test_half_yearly_schedule() {
        let policy = policy(EarnedLeaveFrequency::HalfYearly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2026, 12, 31));

        assert_eq!(
            amounts(&rows),
            vec![(date(2026, 1, 1), dec("12")), (date(2026, 7, 1), dec("12"))]
        );
    }

    #[test]
    fn test_yearly_schedule_over_two_years() {
        let policy = policy(EarnedLeaveFrequency::Yearly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2027, 12, 31));

        assert_eq!(
            amounts(&rows),
            vec![(date(2026, 1, 1), dec("24")), (date(2027, 1, 1), dec("24"))]
        );
    }

    #[test]
    fn test_first_quarter_is_prorated_from_date_of_joining() {
        let policy = policy(
            EarnedLeaveFrequency::Quarterly,
            AllocateOnDay::FirstDay,
            Some(EarnedLeaveRounding::Half),
        );
        // Joined May 1: 61 of the 91 days of Q2, 6 * 61 / 91 = 4.02
        let rows = schedule(&policy, date(2026, 5, 1), date(2026, 5, 1), date(2026, 12, 31));

        assert_eq!(
            amounts(&rows),
            vec![
                (date(2026, 5, 1), dec("4")),
                (date(2026, 7, 1), dec("6")),
                (date(2026, 10, 1), dec("6")),
            ]
        );
        assert_eq!(rows[0].allocated_via, AllocatedVia::Assignment);
    }

    #[test]
    fn test_past_quarters_fold_into_catch_up_row() {
        let policy = policy(EarnedLeaveFrequency::Quarterly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 5, 1), date(2026, 12, 31));

        assert_eq!(
            amounts(&rows),
            vec![
                (date(2026, 5, 1), dec("12")),
                (date(2026, 7, 1), dec("6")),
                (date(2026, 10, 1), dec("6")),
            ]
        );
    }

    #[test]
    fn test_last_day_allocation_with_catch_up() {
        let policy = policy(EarnedLeaveFrequency::Quarterly, AllocateOnDay::LastDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 8, 31), date(2026, 12, 31));

        assert_eq!(
            amounts(&rows),
            vec![
                (date(2026, 8, 31), dec("12")),
                (date(2026, 9, 30), dec("6")),
                (date(2026, 12, 31), dec("6")),
            ]
        );
    }

    #[test]
    fn test_date_of_joining_day_is_clamped_to_month_length() {
        let policy = policy(
            EarnedLeaveFrequency::Monthly,
            AllocateOnDay::DateOfJoining,
            Some(EarnedLeaveRounding::Half),
        );
        let rows = schedule(&policy, date(2026, 1, 31), date(2026, 1, 31), date(2026, 12, 31));

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].allocation_date, date(2026, 1, 31));
        assert_eq!(rows[0].number_of_leaves, dec("0"));
        assert_eq!(rows[1].allocation_date, date(2026, 2, 28));
        assert!(rows[1..].iter().all(|row| row.number_of_leaves == dec("2")));
    }

    #[test]
    fn test_date_of_joining_requires_monthly_frequency() {
        let policy = policy(EarnedLeaveFrequency::Quarterly, AllocateOnDay::DateOfJoining, None);
        let result = build_earned_leave_schedule(&EarnedLeaveScheduleParams {
            policy: &policy,
            date_of_joining: date(2024, 1, 15),
            from_date: date(2026, 1, 1),
            to_date: date(2026, 12, 31),
            assignment_date: date(2026, 1, 1),
            max_leaves_allowed: None,
            float_precision: 2,
        });
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
    }

    #[test]
    fn test_allocation_date_is_clamped_to_schedule_end() {
        let policy = policy(EarnedLeaveFrequency::Quarterly, AllocateOnDay::LastDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2026, 11, 15));

        assert_eq!(rows.last().unwrap().allocation_date, date(2026, 11, 15));
    }

    #[test]
    fn test_schedule_is_capped_at_max_leaves() {
        let policy = policy(EarnedLeaveFrequency::Monthly, AllocateOnDay::FirstDay, None);
        let rows = build_earned_leave_schedule(&EarnedLeaveScheduleParams {
            policy: &policy,
            date_of_joining: date(2024, 1, 1),
            from_date: date(2026, 1, 1),
            to_date: date(2026, 12, 31),
            assignment_date: date(2026, 1, 1),
            max_leaves_allowed: Some(dec("5")),
            float_precision: 2,
        })
        .unwrap();

        assert_eq!(
            amounts(&rows),
            vec![
                (date(2026, 1, 1), dec("2")),
                (date(2026, 2, 1), dec("2")),
                (date(2026, 3, 1), dec("1")),
            ]
        );
    }

    fn earned_allocation(
        db: &mut Database,
        leave_type: &str,
        rows: Vec<EarnedLeaveScheduleRow>,
    ) -> String {
        db.insert(LeaveAllocation {
            name: String::new(),
            employee: "EMP-0001".to_string(),
            leave_type: leave_type.to_string(),
            from_date: date(2026, 1, 1),
            to_date: date(2026, 12, 31),
            new_leaves_allocated: Decimal::ZERO,
            carry_forward: false,
            carry_forwarded_leaves: Decimal::ZERO,
            total_leaves_allocated: Decimal::ZERO,
            earned_leave_schedule: rows,
            docstatus: DocStatus::Submitted,
        })
    }

    #[test]
    fn test_allocate_due_rows_credits_ledger() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let policy = policy(EarnedLeaveFrequency::Monthly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2026, 12, 31));
        let mut db = Database::default();
        let name = earned_allocation(&mut db, "Earned Leave", rows);

        let summary =
            allocate_due_earned_leaves(&config, &mut db, &name, date(2026, 3, 15)).unwrap();
        assert_eq!(summary.rows_allocated, 3);
        assert_eq!(summary.leaves_allocated, dec("6"));

        let allocation = db.get::<LeaveAllocation>(&name).unwrap();
        assert_eq!(allocation.total_leaves_allocated, dec("6"));
        assert_eq!(db.leave_ledger.len(), 3);

        // A second run on the same day credits nothing new
        let summary =
            allocate_due_earned_leaves(&config, &mut db, &name, date(2026, 3, 15)).unwrap();
        assert_eq!(summary.rows_allocated, 0);
    }

    #[test]
    fn test_rows_exceeding_max_are_marked_failed_and_retried() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let policy = policy(EarnedLeaveFrequency::Monthly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2026, 12, 31));
        let mut db = Database::default();
        let name = earned_allocation(&mut db, "Capped Earned Leave", rows);

        let summary =
            allocate_due_earned_leaves(&config, &mut db, &name, date(2026, 6, 1)).unwrap();
        assert_eq!(summary.rows_allocated, 5);
        assert_eq!(summary.rows_failed, 1);

        let allocation = db.get::<LeaveAllocation>(&name).unwrap();
        let failed = &allocation.earned_leave_schedule[5];
        assert!(failed.attempted && failed.failed && !failed.is_allocated);
        assert!(failed.failed_reason.as_ref().unwrap().contains("maximum of 10"));

        // Still over the cap, so the retry fails again
        let summary = retry_failed_allocations(&config, &mut db, &name, date(2026, 6, 1)).unwrap();
        assert_eq!(summary.rows_failed, 1);
        assert_eq!(summary.rows_allocated, 0);
    }

    #[test]
    fn test_scheduler_skips_draft_allocations() {
        let config = ConfigLoader::load("./config/hrms").unwrap();
        let policy = policy(EarnedLeaveFrequency::Monthly, AllocateOnDay::FirstDay, None);
        let rows = schedule(&policy, date(2024, 1, 1), date(2026, 1, 1), date(2026, 12, 31));
        let mut db = Database::default();
        let submitted = earned_allocation(&mut db, "Earned Leave", rows.clone());
        let draft = earned_allocation(&mut db, "Earned Leave", rows);
        db.get_mut::<LeaveAllocation>(&draft).unwrap().docstatus = DocStatus::Draft;

        let summaries = run_earned_leave_scheduler(&config, &mut db, date(2026, 2, 1)).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].allocation, submitted);
        assert_eq!(summaries[0].leaves_allocated, dec("4"));
    }

    fn frequency_strategy() -> impl Strategy<Value = EarnedLeaveFrequency> {
        prop_oneof![
            Just(EarnedLeaveFrequency::Monthly),
            Just(EarnedLeaveFrequency::Quarterly),
            Just(EarnedLeaveFrequency::HalfYearly),
            Just(EarnedLeaveFrequency::Yearly),
        ]
    }

    fn allocate_on_strategy() -> impl Strategy<Value = AllocateOnDay> {
        prop_oneof![Just(AllocateOnDay::FirstDay), Just(AllocateOnDay::LastDay)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Rows are dated within the allocation, in order, never negative,
        /// and never exceed the cap in total.
        #[test]
        fn prop_schedule_rows_are_ordered_and_capped(
            annual in 1u32..=60,
            frequency in frequency_strategy(),
            allocate_on_day in allocate_on_strategy(),
            joining_offset in 0i64..=700,
            assignment_offset in 0i64..=365,
            max in proptest::option::of(1u32..=40),
        ) {
            let policy = EarnedLeavePolicy {
                annual_allocation: Decimal::from(annual),
                frequency,
                allocate_on_day,
                rounding: None,
            };
            let from_date = date(2026, 1, 1);
            let to_date = date(2026, 12, 31);
            let date_of_joining = date(2025, 6, 1) + Duration::days(joining_offset);
            let assignment_date = from_date + Duration::days(assignment_offset);
            let rows = build_earned_leave_schedule(&EarnedLeaveScheduleParams {
                policy: &policy,
                date_of_joining,
                from_date,
                to_date,
                assignment_date,
                max_leaves_allowed: max.map(Decimal::from),
                float_precision: 2,
            }).unwrap();

            let as_of = assignment_date.max(date_of_joining).max(from_date);
            let mut previous: Option<NaiveDate> = None;
            let mut total = Decimal::ZERO;
            for row in &rows {
                prop_assert!(row.number_of_leaves >= Decimal::ZERO);
                prop_assert!(row.allocation_date <= to_date);
                prop_assert!(row.allocation_date >= as_of.min(to_date));
                if let Some(previous) = previous {
                    prop_assert!(row.allocation_date > previous);
                }
                previous = Some(row.allocation_date);
                total += row.number_of_leaves;
            }
            if let Some(max) = max {
                prop_assert!(total <= Decimal::from(max));
            }
        }
    }
}
