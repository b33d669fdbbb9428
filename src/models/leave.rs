//! Leave allocation, ledger, adjustment and earned-leave schedule records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocStatus;

/// How often earned leave is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarnedLeaveFrequency {
    /// Every calendar month.
    Monthly,
    /// Every calendar quarter (Jan, Apr, Jul, Oct).
    Quarterly,
    /// Every half year (Jan, Jul).
    HalfYearly,
    /// Once a year.
    Yearly,
}

impl EarnedLeaveFrequency {
    /// Number of accrual periods in a year.
    pub fn periods_per_year(self) -> u32 {
        match self {
            EarnedLeaveFrequency::Monthly => 12,
            EarnedLeaveFrequency::Quarterly => 4,
            EarnedLeaveFrequency::HalfYearly => 2,
            EarnedLeaveFrequency::Yearly => 1,
        }
    }

    /// Number of calendar months in one accrual period.
    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }
}

/// The day within an accrual period on which leave is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocateOnDay {
    /// First day of the period.
    FirstDay,
    /// Last day of the period.
    LastDay,
    /// The employee's day-of-month of joining (monthly accrual only).
    DateOfJoining,
}

/// Rounding applied to each earned-leave credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EarnedLeaveRounding {
    /// Round to the nearest quarter day.
    #[serde(rename = "0.25")]
    Quarter,
    /// Round to the nearest half day.
    #[serde(rename = "0.5")]
    Half,
    /// Round to whole days.
    #[serde(rename = "1.0")]
    Whole,
}

/// The accrual policy of an earned leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedLeavePolicy {
    /// Leaves earned over a full year.
    pub annual_allocation: Decimal,
    /// Accrual frequency.
    pub frequency: EarnedLeaveFrequency,
    /// Day within each period on which leave is credited.
    pub allocate_on_day: AllocateOnDay,
    /// Optional rounding of each credit.
    #[serde(default)]
    pub rounding: Option<EarnedLeaveRounding>,
}

/// How a schedule row is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatedVia {
    /// Credited when the policy is assigned (catch-up for past periods).
    Assignment,
    /// Credited by the periodic allocation run.
    Scheduler,
}

/// One planned credit of earned leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedLeaveScheduleRow {
    /// The date on which the leave is credited.
    pub allocation_date: NaiveDate,
    /// Leaves credited on that date.
    pub number_of_leaves: Decimal,
    /// Whether the row is credited on assignment or by the scheduler.
    pub allocated_via: AllocatedVia,
    /// The allocation run has processed this row.
    #[serde(default)]
    pub attempted: bool,
    /// The leaves were credited.
    #[serde(default)]
    pub is_allocated: bool,
    /// Crediting failed.
    #[serde(default)]
    pub failed: bool,
    /// Why crediting failed.
    #[serde(default)]
    pub failed_reason: Option<String>,
}

/// Leaves granted to an employee for a leave type over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveAllocation {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee the leaves are granted to.
    pub employee: String,
    /// The leave type.
    pub leave_type: String,
    /// First day the leaves can be used.
    pub from_date: NaiveDate,
    /// Last day the leaves can be used.
    pub to_date: NaiveDate,
    /// Newly granted leaves.
    #[serde(default)]
    pub new_leaves_allocated: Decimal,
    /// Carry unused leaves forward from the previous allocation.
    #[serde(default)]
    pub carry_forward: bool,
    /// Leaves carried forward, computed on submit.
    #[serde(default)]
    pub carry_forwarded_leaves: Decimal,
    /// New plus carried forward leaves, including adjustments and earned credits.
    #[serde(default)]
    pub total_leaves_allocated: Decimal,
    /// Planned earned-leave credits.
    #[serde(default)]
    pub earned_leave_schedule: Vec<EarnedLeaveScheduleRow>,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

/// The record type that produced a leave ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveTransactionType {
    /// A leave allocation (including earned credits and carry forward).
    LeaveAllocation,
    /// Leave taken.
    LeaveApplication,
    /// A leave adjustment.
    LeaveAdjustment,
}

/// A signed movement of leave balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveLedgerEntry {
    /// The employee.
    pub employee: String,
    /// The leave type.
    pub leave_type: String,
    /// What produced the entry.
    pub transaction_type: LeaveTransactionType,
    /// Name of the record that produced the entry.
    pub transaction_name: String,
    /// Leaves added (positive) or consumed (negative).
    pub leaves: Decimal,
    /// First day the entry applies.
    pub from_date: NaiveDate,
    /// Last day the entry applies.
    pub to_date: NaiveDate,
    /// Whether the entry carries leaves forward from a previous allocation.
    #[serde(default)]
    pub is_carry_forward: bool,
}

/// Direction of a leave adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Add leaves to the allocation.
    Allocate,
    /// Remove leaves from the allocation.
    Reduce,
}

/// A manual increase or decrease of an allocation's leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveAdjustment {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The leave type.
    pub leave_type: String,
    /// The allocation being adjusted.
    pub leave_allocation: String,
    /// The date the adjustment takes effect.
    pub posting_date: NaiveDate,
    /// Direction of the adjustment.
    pub adjustment_type: AdjustmentType,
    /// Number of leaves to add or remove.
    pub leaves_to_adjust: Decimal,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

impl LeaveAdjustment {
    /// The signed ledger amount of the adjustment.
    pub fn signed_leaves(&self) -> Decimal {
        match self.adjustment_type {
            AdjustmentType::Allocate => self.leaves_to_adjust,
            AdjustmentType::Reduce => -self.leaves_to_adjust,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_frequency_periods() {
        assert_eq!(EarnedLeaveFrequency::Monthly.months_per_period(), 1);
        assert_eq!(EarnedLeaveFrequency::Quarterly.months_per_period(), 3);
        assert_eq!(EarnedLeaveFrequency::HalfYearly.months_per_period(), 6);
        assert_eq!(EarnedLeaveFrequency::Yearly.months_per_period(), 12);
    }

    #[test]
    fn test_rounding_deserializes_from_step_strings() {
        let rounding: EarnedLeaveRounding = serde_json::from_str("\"0.5\"").unwrap();
        assert_eq!(rounding, EarnedLeaveRounding::Half);
        let rounding: EarnedLeaveRounding = serde_json::from_str("\"0.25\"").unwrap();
        assert_eq!(rounding, EarnedLeaveRounding::Quarter);
    }

    #[test]
    fn test_policy_deserialization() {
        let json = r#"{
            "annual_allocation": "24",
            "frequency": "half_yearly",
            "allocate_on_day": "last_day"
        }"#;
        let policy: EarnedLeavePolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.frequency, EarnedLeaveFrequency::HalfYearly);
        assert_eq!(policy.allocate_on_day, AllocateOnDay::LastDay);
        assert_eq!(policy.rounding, None);
        assert_eq!(policy.annual_allocation, Decimal::from(24));
    }

    #[test]
    fn test_signed_leaves() {
        let mut adjustment = LeaveAdjustment {
            name: String::new(),
            employee: "EMP-0001".to_string(),
            leave_type: "Casual Leave".to_string(),
            leave_allocation: "HR-LAL-2026-00001".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            adjustment_type: AdjustmentType::Reduce,
            leaves_to_adjust: Decimal::from_str("2.5").unwrap(),
            docstatus: DocStatus::Draft,
        };
        assert_eq!(adjustment.signed_leaves(), Decimal::from_str("-2.5").unwrap());

        adjustment.adjustment_type = AdjustmentType::Allocate;
        assert_eq!(adjustment.signed_leaves(), Decimal::from_str("2.5").unwrap());
    }
}
