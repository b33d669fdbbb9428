//! Attendance and overtime slip records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocStatus;

/// Attendance status for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present.
    Present,
    /// Absent.
    Absent,
    /// Present for half the day.
    HalfDay,
    /// On leave.
    OnLeave,
    /// Working from home.
    WorkFromHome,
}

/// A marked attendance for one employee and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Record name.
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The attendance date.
    pub attendance_date: NaiveDate,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
    /// Overtime type applied to the day, if any.
    #[serde(default)]
    pub overtime_type: Option<String>,
    /// Overtime worked in hours.
    #[serde(default)]
    pub actual_overtime_duration: Decimal,
    /// Standard working hours of the shift.
    #[serde(default)]
    pub standard_working_hours: Decimal,
}

/// One day of overtime on an overtime slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeDetail {
    /// The attendance the row was fetched from. Manual rows have none.
    #[serde(default)]
    pub reference_document: Option<String>,
    /// The overtime date.
    pub date: NaiveDate,
    /// The overtime type.
    pub overtime_type: String,
    /// Overtime hours.
    pub overtime_duration: Decimal,
    /// Standard working hours of the day, used for component-based rates.
    #[serde(default)]
    pub standard_working_hours: Decimal,
}

/// Overtime worked by an employee in a payroll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeSlip {
    /// Record name, assigned by the store.
    #[serde(default)]
    pub name: String,
    /// The employee.
    pub employee: String,
    /// The company.
    #[serde(default)]
    pub company: String,
    /// The date used to derive the payroll cycle.
    pub posting_date: NaiveDate,
    /// First day of the cycle.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the cycle.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Overtime rows.
    #[serde(default)]
    pub overtime_details: Vec<OvertimeDetail>,
    /// Sum of the row durations.
    #[serde(default)]
    pub total_overtime_duration: Decimal,
    /// Lifecycle status.
    #[serde(default)]
    pub docstatus: DocStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_overtime_slip_without_dates() {
        let json = r#"{
            "employee": "EMP-0001",
            "posting_date": "2026-03-15",
            "overtime_details": [
                {"date": "2026-03-02", "overtime_type": "Standard OT", "overtime_duration": "2.5"}
            ]
        }"#;
        let slip: OvertimeSlip = serde_json::from_str(json).unwrap();
        assert_eq!(slip.start_date, None);
        assert_eq!(slip.overtime_details.len(), 1);
        assert_eq!(slip.overtime_details[0].reference_document, None);
        assert_eq!(slip.docstatus, DocStatus::Draft);
    }

    #[test]
    fn test_attendance_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::HalfDay).unwrap(),
            "\"half_day\""
        );
    }
}
