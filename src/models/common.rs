//! Record status and audit trail types shared by every record.

use serde::{Deserialize, Serialize};

use crate::error::{HrmsError, HrmsResult};

/// The lifecycle status of a record.
///
/// Records start as drafts, become binding once submitted and may later be
/// cancelled. Only submitted records count towards balances, ledgers and
/// duplicate checks.
///
/// # Example
///
/// ```
/// use hrms_rules::models::DocStatus;
///
/// assert_eq!(serde_json::to_string(&DocStatus::Submitted).unwrap(), "\"submitted\"");
/// assert!(DocStatus::Submitted.is_submitted());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    /// Saved but not yet binding.
    #[default]
    Draft,
    /// Binding; side effects have been written.
    Submitted,
    /// Reversed after submission.
    Cancelled,
}

/// An action that moves a record between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Draft to Submitted.
    Submit,
    /// Submitted to Cancelled.
    Cancel,
}

impl LifecycleAction {
    fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::Cancel => "cancel",
        }
    }
}

impl DocStatus {
    /// Returns true for submitted records.
    pub fn is_submitted(self) -> bool {
        self == DocStatus::Submitted
    }

    /// Returns true for records that have not been cancelled.
    pub fn is_active(self) -> bool {
        self != DocStatus::Cancelled
    }

    /// Returns the status a record moves to under `action`.
    ///
    /// Fails with [`HrmsError::InvalidTransition`] when the action is not
    /// allowed from the current status.
    pub fn transition(
        self,
        action: LifecycleAction,
        doctype: &str,
        name: &str,
    ) -> HrmsResult<DocStatus> {
        match (self, action) {
            (DocStatus::Draft, LifecycleAction::Submit) => Ok(DocStatus::Submitted),
            (DocStatus::Submitted, LifecycleAction::Cancel) => Ok(DocStatus::Cancelled),
            (status, action) => Err(HrmsError::InvalidTransition {
                doctype: doctype.to_string(),
                name: name.to_string(),
                action: action.as_str().to_string(),
                status,
            }),
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Overtime and arrear computations return their steps so that a caller can
/// show how each amount was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}
