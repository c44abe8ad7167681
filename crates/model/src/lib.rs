//! Canonical data model for the OTR operating-theatre record system.
//!
//! This crate defines the tenant-scoped [`Patient`] document, the embedded
//! [`Operation`] records, and the three clinical sub-records attached to an
//! operation:
//!
//! - [`PreOpAssessment`] - labs, risk grades, consent and fasting status
//! - [`IntraOpMonitoring`] - time markers, vitals, fluids and medications
//! - [`RecoveryStatus`] - recovery window, vitals and discharge criteria
//!
//! The model is pure data: no storage or service logic lives here. All wire
//! names are camelCase and optional fields are omitted when absent, so a
//! serialized document round-trips without accumulating nulls.
//!
//! # Example
//!
//! ```
//! use otr_model::{Operation, OperationStatus};
//!
//! let json = r#"{
//!     "operationId": "op-1",
//!     "scheduledDate": "2025-04-05T09:30:00Z",
//!     "type": "appendicectomy",
//!     "diagnosis": "acute appendicitis",
//!     "indication": "peritonism",
//!     "priority": "urgent",
//!     "anesthesia": "ga",
//!     "surgeon": "Maj Rahman",
//!     "anaesthetist": "Capt Das",
//!     "nurse": "Lt Akter"
//! }"#;
//! let op: Operation = serde_json::from_str(json).unwrap();
//! assert_eq!(op.status, OperationStatus::Scheduled);
//! assert!(op.pre_op_assessment.is_none());
//! ```

#![warn(missing_docs)]

mod clinical;
mod operation;
mod patient;

pub use clinical::{
    DischargeCriteria, FluidAdministered, IntraOpMonitoring, MedicationEvent, PainManagement,
    PreOpAssessment, RecoveryStatus, RecoveryVitals, VitalsSnapshot,
};
pub use operation::{Anesthesia, Operation, OperationStatus, OtType, Priority};
pub use patient::Patient;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
