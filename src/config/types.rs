//! Configuration types for the payroll and leave rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{ComponentType, EarnedLeavePolicy};

fn default_precision() -> u32 {
    2
}

/// System-wide settings from `settings.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Default currency of amounts.
    pub currency: String,
    /// Decimal places of currency amounts.
    #[serde(default = "default_precision")]
    pub currency_precision: u32,
    /// Decimal places of leave counts and other non-currency figures.
    #[serde(default = "default_precision")]
    pub float_precision: u32,
    /// Count holidays as working days when computing salary slip working days.
    #[serde(default)]
    pub include_holidays_in_total_working_days: bool,
}

/// A leave type from `leave_types.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveType {
    /// Maximum leaves that may be allocated in one allocation. Zero means unlimited.
    #[serde(default)]
    pub max_leaves_allowed: Decimal,
    /// Allow the balance to go below zero.
    #[serde(default)]
    pub allow_negative: bool,
    /// Unused leaves may be carried forward to the next allocation.
    #[serde(default)]
    pub is_carry_forward: bool,
    /// Cap on leaves carried forward. Zero means unlimited.
    #[serde(default)]
    pub maximum_carry_forwarded_leaves: Decimal,
    /// Accrual policy for earned leave types.
    #[serde(default)]
    pub earned_leave: Option<EarnedLeavePolicy>,
}

impl LeaveType {
    /// Returns true if leaves of this type are earned over time.
    pub fn is_earned_leave(&self) -> bool {
        self.earned_leave.is_some()
    }

    /// The allocation cap, or `None` when unlimited.
    pub fn max_leaves(&self) -> Option<Decimal> {
        (self.max_leaves_allowed > Decimal::ZERO).then_some(self.max_leaves_allowed)
    }
}

/// How an overtime type computes the hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeCalculationMethod {
    /// A fixed hourly rate configured on the type.
    FixedHourlyRate,
    /// Derived from the employee's salary components.
    SalaryComponentBased,
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

/// An overtime type from `overtime_types.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimeType {
    /// How the hourly rate is computed.
    pub overtime_calculation_method: OvertimeCalculationMethod,
    /// The hourly rate for fixed-rate types.
    #[serde(default)]
    pub hourly_rate: Decimal,
    /// Earning components the rate is derived from for component-based types.
    #[serde(default)]
    pub applicable_salary_components: Vec<String>,
    /// Multiplier on regular days.
    #[serde(default = "default_multiplier")]
    pub standard_multiplier: Decimal,
    /// Multiplier on weekly offs.
    #[serde(default = "default_multiplier")]
    pub weekend_multiplier: Decimal,
    /// Multiplier on public holidays.
    #[serde(default = "default_multiplier")]
    pub public_holiday_multiplier: Decimal,
    /// Apply the weekend multiplier on weekly offs.
    #[serde(default)]
    pub applicable_for_weekend: bool,
    /// Apply the public holiday multiplier on public holidays.
    #[serde(default)]
    pub applicable_for_public_holiday: bool,
    /// The earning component overtime is paid through.
    pub overtime_salary_component: String,
    /// Cap on overtime hours per day. Zero means no cap.
    #[serde(default)]
    pub maximum_overtime_hours_allowed: Decimal,
}

/// How a flexible benefit is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    /// Accrued every payroll cycle, paid only on claim.
    AccruePerCycle,
    /// The full yearly amount may be claimed at any time.
    AllowClaimForFullAmount,
}

/// A salary component from `salary_components.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryComponent {
    /// Earning or deduction.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Included in arrear and payroll correction computations.
    #[serde(default)]
    pub arrear_component: bool,
    /// A tax computed from taxable salary.
    #[serde(default)]
    pub variable_based_on_taxable_salary: bool,
    /// Disabled components are ignored.
    #[serde(default)]
    pub disabled: bool,
    /// A flexible benefit employees apply for.
    #[serde(default)]
    pub is_flexible_benefit: bool,
    /// Accrued each cycle instead of being paid.
    #[serde(default)]
    pub accrual_component: bool,
    /// Payout method of benefit components.
    #[serde(default)]
    pub payout_method: Option<PayoutMethod>,
    /// Prorated by payment days on salary slips.
    #[serde(default)]
    pub depends_on_payment_days: bool,
}

/// Leave types file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveTypesConfig {
    /// Map of leave type name to leave type.
    pub leave_types: HashMap<String, LeaveType>,
}

/// Overtime types file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimeTypesConfig {
    /// Map of overtime type name to overtime type.
    pub overtime_types: HashMap<String, OvertimeType>,
}

/// Salary components file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryComponentsConfig {
    /// Map of component name to component.
    pub salary_components: HashMap<String, SalaryComponent>,
}

/// The complete configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct HrmsConfig {
    settings: Settings,
    leave_types: HashMap<String, LeaveType>,
    overtime_types: HashMap<String, OvertimeType>,
    salary_components: HashMap<String, SalaryComponent>,
}

impl HrmsConfig {
    /// Creates a new HrmsConfig from its component parts.
    pub fn new(
        settings: Settings,
        leave_types: HashMap<String, LeaveType>,
        overtime_types: HashMap<String, OvertimeType>,
        salary_components: HashMap<String, SalaryComponent>,
    ) -> Self {
        Self {
            settings,
            leave_types,
            overtime_types,
            salary_components,
        }
    }

    /// Returns the system settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns all leave types.
    pub fn leave_types(&self) -> &HashMap<String, LeaveType> {
        &self.leave_types
    }

    /// Returns all overtime types.
    pub fn overtime_types(&self) -> &HashMap<String, OvertimeType> {
        &self.overtime_types
    }

    /// Returns all salary components.
    pub fn salary_components(&self) -> &HashMap<String, SalaryComponent> {
        &self.salary_components
    }
}
