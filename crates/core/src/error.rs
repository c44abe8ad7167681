//! Error types for the record core.
//!
//! One taxonomy for every caller-visible failure, organized by outcome:
//! validation, not-found, conflict, configuration, and store faults. No
//! error is swallowed; backend detail never leaks past [`RecordError::Unavailable`],
//! but the field-level cause of a validation failure is always preserved.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use otr_model::OperationStatus;
use otr_persistence::error::index;
use otr_persistence::{StoreError, TenantId};

/// The primary error type for all record operations.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Malformed or missing input; never retried, offending field named.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No matching tenant-scoped record.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Uniqueness violation or illegal state transition.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The deployment is misconfigured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The store collaborator failed; transient, retry is the caller's call.
    #[error("store unavailable: {0}")]
    Unavailable(#[source] StoreError),
}

/// Errors for malformed or missing input.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    /// A field is present but malformed.
    #[error("invalid field '{field}': {message}")]
    InvalidField { field: &'static str, message: String },

    /// A date parameter does not match the `YYYY-MM-DD` grammar.
    #[error("invalid date for parameter '{parameter}': {value}")]
    InvalidDate { parameter: &'static str, value: String },

    /// A transition to `postponed` was requested without a new date.
    #[error("transition to postponed requires a postponedDate")]
    MissingPostponedDate,
}

/// Errors for lookups that found nothing in the caller's tenant.
#[derive(Error, Debug)]
pub enum NotFoundError {
    /// No patient with this admission number in the tenant.
    #[error("patient not found: {tenant}/{admission_no}")]
    Patient { tenant: TenantId, admission_no: String },

    /// No patient with this document id in the tenant.
    #[error("patient not found: {tenant}/id={id}")]
    PatientById { tenant: TenantId, id: String },

    /// The admission exists but carries no such operation (or the admission
    /// itself is missing).
    #[error("operation not found: {admission_no}/{operation_id}")]
    Operation {
        admission_no: String,
        operation_id: String,
    },
}

/// Errors for uniqueness violations and illegal transitions.
#[derive(Error, Debug)]
pub enum ConflictError {
    /// An explicit operation id already exists somewhere in the store.
    #[error("operation id already exists: {operation_id}")]
    DuplicateOperationId { operation_id: String },

    /// The tenant already has a patient with this admission number.
    #[error("admission number already exists: {admission_no}")]
    DuplicateAdmission { admission_no: String },

    /// A terminal operation cannot leave its state.
    #[error("operation {operation_id} is {current} and cannot become {requested}")]
    TerminalState {
        operation_id: String,
        current: OperationStatus,
        requested: OperationStatus,
    },
}

/// Errors for deployment misconfiguration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// No tenant was supplied and no default is configured.
    #[error("no tenant supplied and no default tenant configured")]
    NoTenantResolved,
}

/// Result type alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { index: index::OPERATION_ID, value } => {
                RecordError::Conflict(ConflictError::DuplicateOperationId { operation_id: value })
            }
            StoreError::DuplicateKey { index: index::ADMISSION_NO, value } => {
                RecordError::Conflict(ConflictError::DuplicateAdmission { admission_no: value })
            }
            other => RecordError::Unavailable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_the_field() {
        let err = RecordError::from(ValidationError::MissingRequiredField { field: "surgeon" });
        assert_eq!(err.to_string(), "missing required field: surgeon");
    }

    #[test]
    fn test_terminal_state_display() {
        let err = ConflictError::TerminalState {
            operation_id: "op-1".to_string(),
            current: OperationStatus::Completed,
            requested: OperationStatus::Scheduled,
        };
        assert_eq!(
            err.to_string(),
            "operation op-1 is completed and cannot become scheduled"
        );
    }

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        let err: RecordError = StoreError::DuplicateKey {
            index: index::OPERATION_ID,
            value: "op-1".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            RecordError::Conflict(ConflictError::DuplicateOperationId { .. })
        ));

        let err: RecordError = StoreError::DuplicateKey {
            index: index::ADMISSION_NO,
            value: "A-100".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            RecordError::Conflict(ConflictError::DuplicateAdmission { .. })
        ));
    }

    #[test]
    fn test_store_fault_maps_to_unavailable() {
        let err: RecordError = StoreError::Unavailable {
            message: "connection reset".to_string(),
            source: None,
        }
        .into();
        assert!(matches!(err, RecordError::Unavailable(_)));
    }
}
