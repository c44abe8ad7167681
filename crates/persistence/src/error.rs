//! Error types for the store collaborator.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all store operations.
///
/// `DuplicateKey` is the store's uniqueness primitive surfacing: the service
/// layer maps it onto a conflict outcome by inspecting the index name.
/// Everything else is a backend fault the caller should treat as transient.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness index rejected a write.
    #[error("duplicate key on index '{index}': {value}")]
    DuplicateKey {
        /// Name of the violated index.
        index: &'static str,
        /// The offending key value.
        value: String,
    },

    /// The backend failed or is unreachable.
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A document could not be serialized or deserialized.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Names of the uniqueness indexes a backend must maintain.
pub mod index {
    /// `(tenant_id, admission_no)` - one admission number per tenant.
    pub const ADMISSION_NO: &str = "admission_no";
    /// `operation_id` - unique across the whole store, cross-patient.
    pub const OPERATION_ID: &str = "operation_id";
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_display() {
        let err = StoreError::DuplicateKey {
            index: index::OPERATION_ID,
            value: "op-123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate key on index 'operation_id': op-123"
        );
    }

    #[test]
    fn test_serialization_error_from_serde() {
        let bad = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: StoreError = bad.into();
        assert!(matches!(err, StoreError::Serialization { .. }));
    }
}
