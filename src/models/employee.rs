//! Employee model and holiday records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The employment status of an employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed.
    #[default]
    Active,
    /// Temporarily inactive.
    Inactive,
    /// Suspended.
    Suspended,
    /// No longer employed.
    Left,
}

/// Represents an employee the payroll rules apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub employee_name: String,
    /// The company the employee belongs to.
    pub company: String,
    /// The date the employee joined.
    pub date_of_joining: NaiveDate,
    /// The last working day, once known.
    #[serde(default)]
    pub relieving_date: Option<NaiveDate>,
    /// Employment status.
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Name of the holiday list that applies to the employee.
    #[serde(default)]
    pub holiday_list: Option<String>,
}

impl Employee {
    /// Returns true if the employee is currently active.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrms_rules::models::{Employee, EmployeeStatus};
    /// use chrono::NaiveDate;
    ///
    /// let employee = Employee {
    ///     id: "EMP-0001".to_string(),
    ///     employee_name: "Asha Rao".to_string(),
    ///     company: "Acme".to_string(),
    ///     date_of_joining: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
    ///     relieving_date: None,
    ///     status: EmployeeStatus::Active,
    ///     holiday_list: None,
    /// };
    /// assert!(employee.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// A holiday in a holiday list.
///
/// Weekly offs (e.g. Sundays) are holidays with `weekly_off` set; all other
/// holidays are treated as public holidays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The holiday date.
    pub date: NaiveDate,
    /// Whether the holiday is a weekly off rather than a public holiday.
    #[serde(default)]
    pub weekly_off: bool,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}
