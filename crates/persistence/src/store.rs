//! The store collaborator trait.

use async_trait::async_trait;
use serde_json::Value;

use otr_model::{Operation, Patient};

use crate::error::StoreResult;
use crate::tenant::TenantId;
use crate::types::{DateWindow, FlatOperation, OperationQuery, PatientSelector, SortOrder};

/// Storage surface required by the record core.
///
/// Every method takes the [`TenantId`] as its first parameter; a backend must
/// never return or touch a document belonging to another tenant, and a
/// selector that resolves to another tenant's document behaves as "no match"
/// (`Ok(None)`).
///
/// # Merge patches
///
/// `update_one` and `update_operation` apply an RFC 7396 merge patch:
/// provided fields overwrite, absent fields stay untouched, arrays replace
/// wholesale, and an explicit `null` removes the field. Patches never touch
/// the uniqueness-bearing fields - backends ignore `id`, `tenantId`,
/// `admissionNo` and `operationId` keys if a patch carries them.
///
/// # Timestamps
///
/// Every successful mutating call bumps the patient's `updated_at`.
///
/// # Atomicity
///
/// Each call is an atomic read-modify-write of one patient document. No
/// multi-document guarantee exists and none is needed: every core mutation
/// touches exactly one patient.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Inserts a new patient document.
    ///
    /// # Errors
    ///
    /// * [`StoreError::DuplicateKey`] on `admission_no` if the tenant already
    ///   has a patient with this admission number, or on `operation_id` if
    ///   any embedded operation id already exists anywhere in the store.
    ///
    /// [`StoreError::DuplicateKey`]: crate::StoreError::DuplicateKey
    async fn insert(&self, tenant: &TenantId, patient: Patient) -> StoreResult<Patient>;

    /// Finds one patient by selector, or `None`.
    async fn find_one(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
    ) -> StoreResult<Option<Patient>>;

    /// Lists the tenant's patients, optionally restricted to those with at
    /// least one operation scheduled inside `window`, sorted by their
    /// earliest relevant operation date.
    async fn find_many(
        &self,
        tenant: &TenantId,
        window: Option<&DateWindow>,
        sort: SortOrder,
    ) -> StoreResult<Vec<Patient>>;

    /// Applies a merge patch to the top-level fields of one patient and
    /// returns the updated document, or `None` if no match.
    async fn update_one(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        patch: Value,
    ) -> StoreResult<Option<Patient>>;

    /// Appends an operation to one patient and returns the updated document.
    ///
    /// # Errors
    ///
    /// * duplicate key on `operation_id` if the id already exists store-wide.
    async fn push_operation(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        operation: Operation,
    ) -> StoreResult<Option<Patient>>;

    /// Applies a merge patch to the one embedded operation with the given id
    /// and returns the updated patient, or `None` if the selector or the
    /// operation id does not resolve.
    async fn update_operation(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        operation_id: &str,
        element_patch: Value,
    ) -> StoreResult<Option<Patient>>;

    /// Removes one embedded operation, keeping the patient. Returns the
    /// updated patient, or `None` if the selector or operation id does not
    /// resolve.
    async fn pull_operation(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        operation_id: &str,
    ) -> StoreResult<Option<Patient>>;

    /// Deletes one patient and all embedded operations. Returns the deleted
    /// document, or `None` if no match.
    async fn delete_one(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
    ) -> StoreResult<Option<Patient>>;

    /// The one supported aggregation: tenant match, flatten the operations
    /// array (one row per element merged with parent identity), filter the
    /// rows, sort by scheduled date.
    async fn flatten_operations(
        &self,
        tenant: &TenantId,
        query: &OperationQuery,
    ) -> StoreResult<Vec<FlatOperation>>;
}
