//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the rules
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{HrmsError, HrmsResult};
use crate::payroll::validate_overtime_type;

use super::types::{
    HrmsConfig, LeaveType, LeaveTypesConfig, OvertimeType, OvertimeTypesConfig, SalaryComponent,
    SalaryComponentsConfig, Settings,
};

/// Loads and provides access to the rules configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to look up leave types, overtime types and salary
/// components by name.
///
/// # Directory Structure
///
/// ```text
/// config/hrms/
/// ├── settings.yaml            # Currency and precision settings
/// ├── leave_types.yaml         # Leave types and earned-leave policies
/// ├── overtime_types.yaml      # Overtime rates and multipliers
/// └── salary_components.yaml   # Salary component flags
/// ```
///
/// # Example
///
/// ```no_run
/// use hrms_rules::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/hrms").unwrap();
/// let leave_type = loader.get_leave_type("Earned Leave").unwrap();
/// assert!(leave_type.is_earned_leave());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: HrmsConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing, contains invalid YAML, or
    /// defines an overtime type that fails validation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hrms_rules::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/hrms")?;
    /// # Ok::<(), hrms_rules::error::HrmsError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> HrmsResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<Settings>(&path.join("settings.yaml"))?;
        let leave_types = Self::load_yaml::<LeaveTypesConfig>(&path.join("leave_types.yaml"))?;
        let overtime_types =
            Self::load_yaml::<OvertimeTypesConfig>(&path.join("overtime_types.yaml"))?;
        let salary_components =
            Self::load_yaml::<SalaryComponentsConfig>(&path.join("salary_components.yaml"))?;

        for (name, overtime_type) in &overtime_types.overtime_types {
            validate_overtime_type(name, overtime_type)?;
        }

        debug!(
            path = %path.display(),
            leave_types = leave_types.leave_types.len(),
            overtime_types = overtime_types.overtime_types.len(),
            salary_components = salary_components.salary_components.len(),
            "Loaded configuration"
        );

        Ok(Self::from_config(HrmsConfig::new(
            settings,
            leave_types.leave_types,
            overtime_types.overtime_types,
            salary_components.salary_components,
        )))
    }

    /// Wraps an already assembled configuration.
    pub fn from_config(config: HrmsConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> HrmsResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| HrmsError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| HrmsError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &HrmsConfig {
        &self.config
    }

    /// Returns the system settings.
    pub fn settings(&self) -> &Settings {
        self.config.settings()
    }

    /// Decimal places of currency amounts.
    pub fn currency_precision(&self) -> u32 {
        self.config.settings().currency_precision
    }

    /// Decimal places of leave counts.
    pub fn float_precision(&self) -> u32 {
        self.config.settings().float_precision
    }

    /// Gets a leave type by name.
    pub fn get_leave_type(&self, name: &str) -> HrmsResult<&LeaveType> {
        self.config
            .leave_types()
            .get(name)
            .ok_or_else(|| HrmsError::not_found("Leave Type", name))
    }

    /// Gets an overtime type by name.
    pub fn get_overtime_type(&self, name: &str) -> HrmsResult<&OvertimeType> {
        self.config
            .overtime_types()
            .get(name)
            .ok_or_else(|| HrmsError::not_found("Overtime Type", name))
    }

    /// Gets a salary component by name.
    pub fn get_salary_component(&self, name: &str) -> HrmsResult<&SalaryComponent> {
        self.config
            .salary_components()
            .get(name)
            .ok_or_else(|| HrmsError::not_found("Salary Component", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OvertimeCalculationMethod, PayoutMethod};
    use crate::models::{ComponentType, EarnedLeaveFrequency};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/hrms"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().currency, "INR");
        assert_eq!(loader.currency_precision(), 2);
        assert_eq!(loader.float_precision(), 2);
    }

    #[test]
    fn test_get_earned_leave_type() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let leave_type = loader.get_leave_type("Earned Leave").unwrap();
        let policy = leave_type.earned_leave.as_ref().unwrap();
        assert_eq!(policy.frequency, EarnedLeaveFrequency::Monthly);
        assert_eq!(policy.annual_allocation, dec("24"));
        assert_eq!(leave_type.max_leaves(), None);
    }

    #[test]
    fn test_get_leave_type_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_leave_type("unknown") {
            Err(HrmsError::NotFound { doctype, name }) => {
                assert_eq!(doctype, "Leave Type");
                assert_eq!(name, "unknown");
            }
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_overtime_type() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let fixed = loader.get_overtime_type("Fixed Rate OT").unwrap();
        assert_eq!(
            fixed.overtime_calculation_method,
            OvertimeCalculationMethod::FixedHourlyRate
        );
        assert_eq!(fixed.hourly_rate, dec("200"));

        let component_based = loader.get_overtime_type("Component Based OT").unwrap();
        assert_eq!(
            component_based.applicable_salary_components,
            vec!["Basic Salary".to_string()]
        );
    }

    #[test]
    fn test_get_salary_component() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let basic = loader.get_salary_component("Basic Salary").unwrap();
        assert_eq!(basic.component_type, ComponentType::Earning);
        assert!(basic.arrear_component);
        assert!(basic.depends_on_payment_days);

        let medical = loader.get_salary_component("Medical Allowance").unwrap();
        assert!(medical.is_flexible_benefit);
        assert_eq!(medical.payout_method, Some(PayoutMethod::AccruePerCycle));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(HrmsError::ConfigNotFound { path }) => {
                assert!(path.contains("settings.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }
}
