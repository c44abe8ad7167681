//! The embedded surgical operation record and its enums.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clinical::{IntraOpMonitoring, PreOpAssessment, RecoveryStatus};

/// Lifecycle status of an operation.
///
/// `Scheduled` is the initial state. `Cancelled` and `Completed` are
/// terminal: once reached, the only accepted transition request is an
/// idempotent re-request of the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Booked and awaiting theatre time.
    Scheduled,
    /// Deferred to a new date, recorded in `postponed_date`.
    Postponed,
    /// Called off; terminal.
    Cancelled,
    /// Performed; terminal.
    Completed,
}

impl OperationStatus {
    /// Returns `true` for the terminal states (`Cancelled`, `Completed`).
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Cancelled | OperationStatus::Completed)
    }
}

impl Default for OperationStatus {
    fn default() -> Self {
        OperationStatus::Scheduled
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::Scheduled => write!(f, "scheduled"),
            OperationStatus::Postponed => write!(f, "postponed"),
            OperationStatus::Cancelled => write!(f, "cancelled"),
            OperationStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for OperationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(OperationStatus::Scheduled),
            "postponed" => Ok(OperationStatus::Postponed),
            "cancelled" => Ok(OperationStatus::Cancelled),
            "completed" => Ok(OperationStatus::Completed),
            _ => Err(format!("unknown operation status: {}", s)),
        }
    }
}

/// Clinical priority of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Immediate, life- or limb-threatening.
    Emergency,
    /// To be done within the admission.
    Urgent,
    /// Elective.
    Routine,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Emergency => write!(f, "emergency"),
            Priority::Urgent => write!(f, "urgent"),
            Priority::Routine => write!(f, "routine"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emergency" => Ok(Priority::Emergency),
            "urgent" => Ok(Priority::Urgent),
            "routine" => Ok(Priority::Routine),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

/// Which theatre suite the operation is booked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtType {
    /// Main operating theatre.
    Main,
    /// Modular operating theatre.
    Modular,
}

impl Default for OtType {
    fn default() -> Self {
        OtType::Main
    }
}

/// Anaesthetic technique planned for the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum Anesthesia {
    Ga,
    GaEpi,
    GaCaudal,
    ShortGa,
    Tiva,
    Sab,
    Cse,
    Caudal,
    Bb,
    BbSab,
    Local,
    Sedation,
}

/// A single surgical procedure embedded in exactly one [`Patient`].
///
/// `operation_id` is unique across the whole store, not just within the
/// owning patient; the persistence layer maintains that index. The three
/// clinical sub-records are independently nullable: editing one never
/// touches its siblings.
///
/// [`Patient`]: crate::Patient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Store-wide unique operation id, assigned at creation if absent.
    pub operation_id: String,

    /// When the operation is scheduled to take place.
    pub scheduled_date: DateTime<Utc>,

    /// Name of the procedure.
    #[serde(rename = "type")]
    pub procedure: String,

    /// Working diagnosis.
    pub diagnosis: String,

    /// Indication for surgery.
    pub indication: String,

    /// Lifecycle status.
    #[serde(default)]
    pub status: OperationStatus,

    /// New date when the operation has been postponed. Cleared on any
    /// transition out of `postponed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postponed_date: Option<DateTime<Utc>>,

    /// Clinical priority.
    pub priority: Priority,

    /// Theatre suite.
    #[serde(default)]
    pub ot_type: OtType,

    /// Planned anaesthetic technique.
    pub anesthesia: Anesthesia,

    /// Operating surgeon.
    pub surgeon: String,

    /// Assisting surgeon, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,

    /// Anaesthetist.
    pub anaesthetist: String,

    /// Theatre nurse.
    pub nurse: String,

    /// Pre-operative assessment, recorded before theatre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_op_assessment: Option<PreOpAssessment>,

    /// Intra-operative monitoring record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intra_op_monitoring: Option<IntraOpMonitoring>,

    /// Post-operative recovery record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_status: Option<RecoveryStatus>,
}
