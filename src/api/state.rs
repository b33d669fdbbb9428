//! Application state for the HR payroll rules API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Local, NaiveDate};

use crate::config::ConfigLoader;
use crate::error::HrmsResult;
use crate::store::Database;

/// Shared application state.
///
/// Holds the loaded configuration and the record store. Every request works
/// on the store under one lock, so operations never interleave.
#[derive(Clone)]
pub struct AppState {
    /// The loaded rules configuration.
    config: Arc<ConfigLoader>,
    /// The record store.
    db: Arc<RwLock<Database>>,
    /// Fixed current date, if set.
    today: Option<NaiveDate>,
}

impl AppState {
    /// Creates a new application state with the given configuration and store.
    pub fn new(config: ConfigLoader, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(RwLock::new(db)),
            today: None,
        }
    }

    /// Pins the current date used by date-dependent rules.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The current date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Runs a read-only operation against the store.
    pub fn read<T>(&self, operation: impl FnOnce(&ConfigLoader, &Database) -> T) -> T {
        let db = self.db.read().unwrap_or_else(PoisonError::into_inner);
        operation(&self.config, &db)
    }

    /// Runs an operation that writes to the store.
    ///
    /// The operation works on a copy of the store that replaces it only when
    /// the operation succeeds, so a failed operation leaves no partial writes.
    pub fn write<T>(
        &self,
        operation: impl FnOnce(&ConfigLoader, &mut Database) -> HrmsResult<T>,
    ) -> HrmsResult<T> {
        let mut db = self.db.write().unwrap_or_else(PoisonError::into_inner);
        let mut draft = db.clone();
        let result = operation(&self.config, &mut draft)?;
        *db = draft;
        Ok(result)
    }
}
