//! In-memory record store.
//!
//! The rules only need a handful of queries over a few tables, so the store
//! keeps plain vectors and lets each rule module filter them.

mod database;
mod record;

pub use database::Database;
pub use record::Record;
