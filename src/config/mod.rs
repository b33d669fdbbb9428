//! Configuration loading and management for the payroll and leave rules.
//!
//! This module provides functionality to load the rules configuration from
//! YAML files: system settings, leave types, overtime types and salary
//! components.
//!
//! # Example
//!
//! ```no_run
//! use hrms_rules::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/hrms").unwrap();
//! println!("Currency: {}", config.settings().currency);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    HrmsConfig, LeaveType, LeaveTypesConfig, OvertimeCalculationMethod, OvertimeType,
    OvertimeTypesConfig, PayoutMethod, SalaryComponent, SalaryComponentsConfig, Settings,
};
