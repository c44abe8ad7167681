//! The operation status state machine.
//!
//! Legal transitions:
//!
//! ```text
//! scheduled -> postponed | cancelled | completed
//! postponed -> scheduled | cancelled | completed
//! cancelled -> (terminal)
//! completed -> (terminal)
//! ```
//!
//! A terminal state accepts an idempotent re-request of itself (no-op
//! success) and rejects everything else as a conflict. A `postponed` target
//! carries a mandatory new date; leaving `postponed` clears the stale date so
//! it can never be mistaken for current.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use otr_model::{Operation, OperationStatus};

use crate::error::{ConflictError, RecordResult, ValidationError};

/// A requested status change for one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    /// Target status.
    pub status: OperationStatus,
    /// New date, required when the target is `postponed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postponed_date: Option<DateTime<Utc>>,
}

/// The planned effect of a legal transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPlan {
    /// Re-request of the current terminal state: nothing to write.
    NoOp,
    /// Apply this element patch to the operation.
    Apply(Value),
}

/// Validates a transition request against the operation's current status and
/// returns the element patch to apply.
///
/// Pure function: the only side effects of a transition happen when the
/// caller hands the returned patch to the store.
pub fn plan_transition(
    current: &Operation,
    request: &TransitionRequest,
) -> RecordResult<TransitionPlan> {
    if current.status.is_terminal() {
        if request.status == current.status {
            return Ok(TransitionPlan::NoOp);
        }
        return Err(ConflictError::TerminalState {
            operation_id: current.operation_id.clone(),
            current: current.status,
            requested: request.status,
        }
        .into());
    }

    let patch = match request.status {
        OperationStatus::Postponed => {
            let date = request
                .postponed_date
                .ok_or(ValidationError::MissingPostponedDate)?;
            json!({ "status": request.status, "postponedDate": date })
        }
        // Any move out of postponed retires the stale date.
        _ => json!({ "status": request.status, "postponedDate": null }),
    };
    Ok(TransitionPlan::Apply(patch))
}
