//! HR payroll rules engine
//!
//! This crate provides the business rules of an HR payroll system: leave
//! allocations and adjustments, earned leave accrual, overtime slips, salary
//! arrears, payroll corrections for leave without pay, and employee benefit
//! applications, claims and the benefit ledger.
//!
//! Records live in an in-memory [`store::Database`]. Each record type exposes
//! its lifecycle as plain functions that validate the record, move it between
//! draft, submitted and cancelled, and write its side effects to the store.

#![warn(missing_docs)]

pub mod api;
pub mod benefits;
pub mod config;
pub mod dates;
pub mod error;
pub mod leave;
pub mod models;
pub mod payroll;
pub mod rounding;
pub mod store;
