//! Overtime type validation.

use crate::config::{OvertimeCalculationMethod, OvertimeType};
use crate::error::{HrmsError, HrmsResult};

/// Checks that a component-based overtime type lists the components its
/// hourly rate is derived from.
///
/// # Example
///
/// ```
/// use hrms_rules::config::{OvertimeCalculationMethod, OvertimeType};
/// use hrms_rules::payroll::validate_overtime_type;
/// use rust_decimal::Decimal;
///
/// let overtime_type = OvertimeType {
///     overtime_calculation_method: OvertimeCalculationMethod::SalaryComponentBased,
///     hourly_rate: Decimal::ZERO,
///     applicable_salary_components: vec![],
///     standard_multiplier: Decimal::ONE,
///     weekend_multiplier: Decimal::ONE,
///     public_holiday_multiplier: Decimal::ONE,
///     applicable_for_weekend: false,
///     applicable_for_public_holiday: false,
///     overtime_salary_component: "Overtime Allowance".to_string(),
///     maximum_overtime_hours_allowed: Decimal::ZERO,
/// };
///
/// assert!(validate_overtime_type("Weekday OT", &overtime_type).is_err());
/// ```
pub fn validate_overtime_type(name: &str, overtime_type: &OvertimeType) -> HrmsResult<()> {
    if overtime_type.overtime_calculation_method == OvertimeCalculationMethod::SalaryComponentBased
        && overtime_type.applicable_salary_components.is_empty()
    {
        return Err(HrmsError::Validation {
            doctype: format!("Overtime Type {}", name),
            message: "Select Applicable Components for Overtime Type".to_string(),
        });
    }
    Ok(())
}
