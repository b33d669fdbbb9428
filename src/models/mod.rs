//! Core data models for the HR payroll rules engine.
//!
//! This module contains the records the rules read and write. Each record
//! carries a [`DocStatus`]; persistence lives in [`crate::store`].

mod arrear;
mod benefit;
mod common;
mod employee;
mod leave;
mod overtime;
mod salary;

pub use arrear::{Arrear, ComponentAmount, PayrollCorrection};
pub use benefit::{
    BenefitApplicationRow, BenefitLedgerEntry, BenefitTransactionType, EmployeeBenefitApplication,
    EmployeeBenefitClaim,
};
pub use common::{AuditStep, DocStatus, LifecycleAction};
pub use employee::{Employee, EmployeeStatus, Holiday};
pub use leave::{
    AdjustmentType, AllocateOnDay, AllocatedVia, EarnedLeaveFrequency, EarnedLeavePolicy,
    EarnedLeaveRounding, EarnedLeaveScheduleRow, LeaveAdjustment, LeaveAllocation,
    LeaveLedgerEntry, LeaveTransactionType,
};
pub use overtime::{AttendanceRecord, AttendanceStatus, OvertimeDetail, OvertimeSlip};
pub use salary::{
    AccruedBenefit, AdditionalSalary, BenefitDetail, ComponentType, PayrollFrequency,
    PayrollPeriod, SalaryDetail, SalarySlip, SalaryStructure, SalaryStructureAssignment,
    StructureLine,
};
