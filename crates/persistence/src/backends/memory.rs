//! In-memory backend.
//!
//! Reference implementation of [`PatientStore`]: documents live behind one
//! `parking_lot::RwLock` next to the store-wide operation-id index, so every
//! trait call is a single guarded read-modify-write and the single-document
//! atomicity contract holds trivially.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use otr_model::{Operation, Patient};

use crate::error::{index, StoreError, StoreResult};
use crate::store::PatientStore;
use crate::tenant::TenantId;
use crate::types::{DateWindow, FlatOperation, OperationQuery, PatientSelector, SortOrder};

/// In-memory [`PatientStore`] backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    patients: Vec<Patient>,
    /// Store-wide unique index over embedded operation ids.
    operation_ids: HashSet<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Patient fields a merge patch may never change.
const PROTECTED_PATIENT_FIELDS: &[&str] = &[
    "id",
    "tenantId",
    "admissionNo",
    "operations",
    "createdAt",
    "updatedAt",
];

/// Operation fields an element patch may never change.
const PROTECTED_OPERATION_FIELDS: &[&str] = &["operationId"];

fn strip_protected(patch: &mut Value, protected: &[&str]) {
    if let Value::Object(map) = patch {
        for field in protected {
            map.remove(*field);
        }
    }
}

fn merge_into<T>(current: &T, mut patch: Value, protected: &[&str]) -> StoreResult<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    strip_protected(&mut patch, protected);
    let mut doc = serde_json::to_value(current)?;
    json_patch::merge(&mut doc, &patch);
    Ok(serde_json::from_value(doc)?)
}

impl Inner {
    fn position(&self, tenant: &TenantId, selector: &PatientSelector) -> Option<usize> {
        self.patients
            .iter()
            .position(|p| p.tenant_id == tenant.as_str() && selector.matches(p))
    }

    fn reserve_operation_ids<'a>(
        &mut self,
        operations: impl Iterator<Item = &'a Operation>,
    ) -> StoreResult<()> {
        let mut reserved = Vec::new();
        for op in operations {
            if !self.operation_ids.insert(op.operation_id.clone()) {
                // Roll back ids reserved so far in this call.
                for id in reserved {
                    self.operation_ids.remove(&id);
                }
                return Err(StoreError::DuplicateKey {
                    index: index::OPERATION_ID,
                    value: op.operation_id.clone(),
                });
            }
            reserved.push(op.operation_id.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, tenant: &TenantId, mut patient: Patient) -> StoreResult<Patient> {
        let mut inner = self.inner.write();

        if inner
            .position(tenant, &PatientSelector::AdmissionNo(patient.admission_no.clone()))
            .is_some()
        {
            tracing::warn!(
                tenant = %tenant,
                admission_no = %patient.admission_no,
                "insert rejected: admission number already exists"
            );
            return Err(StoreError::DuplicateKey {
                index: index::ADMISSION_NO,
                value: patient.admission_no,
            });
        }

        inner.reserve_operation_ids(patient.operations.iter())?;

        patient.tenant_id = tenant.as_str().to_string();
        tracing::debug!(tenant = %tenant, admission_no = %patient.admission_no, "insert patient");
        inner.patients.push(patient.clone());
        Ok(patient)
    }

    async fn find_one(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
    ) -> StoreResult<Option<Patient>> {
        let inner = self.inner.read();
        Ok(inner.position(tenant, selector).map(|i| inner.patients[i].clone()))
    }

    async fn find_many(
        &self,
        tenant: &TenantId,
        window: Option<&DateWindow>,
        sort: SortOrder,
    ) -> StoreResult<Vec<Patient>> {
        let inner = self.inner.read();
        let bounds = window.map(|w| (w.start, w.end));

        let mut matched: Vec<Patient> = inner
            .patients
            .iter()
            .filter(|p| p.tenant_id == tenant.as_str())
            .filter(|p| match window {
                Some(w) => p.operations.iter().any(|op| w.contains(op.scheduled_date)),
                None => true,
            })
            .cloned()
            .collect();

        matched.sort_by_key(|p| {
            p.earliest_operation_date(bounds.as_ref())
                .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC)
        });
        if sort == SortOrder::ScheduledDateDesc {
            matched.reverse();
        }
        Ok(matched)
    }

    async fn update_one(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        patch: Value,
    ) -> StoreResult<Option<Patient>> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.position(tenant, selector) else {
            return Ok(None);
        };

        let mut updated = merge_into(&inner.patients[pos], patch, PROTECTED_PATIENT_FIELDS)?;
        updated.updated_at = Utc::now();
        tracing::debug!(tenant = %tenant, admission_no = %updated.admission_no, "update patient");
        inner.patients[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn push_operation(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        operation: Operation,
    ) -> StoreResult<Option<Patient>> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.position(tenant, selector) else {
            return Ok(None);
        };

        inner.reserve_operation_ids(std::iter::once(&operation))?;
        let patient = &mut inner.patients[pos];
        tracing::debug!(
            tenant = %tenant,
            admission_no = %patient.admission_no,
            operation_id = %operation.operation_id,
            "push operation"
        );
        patient.operations.push(operation);
        patient.updated_at = Utc::now();
        Ok(Some(patient.clone()))
    }

    async fn update_operation(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        operation_id: &str,
        element_patch: Value,
    ) -> StoreResult<Option<Patient>> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.position(tenant, selector) else {
            return Ok(None);
        };

        let patient = &mut inner.patients[pos];
        let Some(op_pos) = patient
            .operations
            .iter()
            .position(|op| op.operation_id == operation_id)
        else {
            return Ok(None);
        };

        let updated_op = merge_into(
            &patient.operations[op_pos],
            element_patch,
            PROTECTED_OPERATION_FIELDS,
        )?;
        tracing::debug!(
            tenant = %tenant,
            admission_no = %patient.admission_no,
            operation_id = %operation_id,
            "update operation"
        );
        patient.operations[op_pos] = updated_op;
        patient.updated_at = Utc::now();
        Ok(Some(patient.clone()))
    }

    async fn pull_operation(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
        operation_id: &str,
    ) -> StoreResult<Option<Patient>> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.position(tenant, selector) else {
            return Ok(None);
        };

        let patient = &mut inner.patients[pos];
        let Some(op_pos) = patient
            .operations
            .iter()
            .position(|op| op.operation_id == operation_id)
        else {
            return Ok(None);
        };

        patient.operations.remove(op_pos);
        patient.updated_at = Utc::now();
        let updated = patient.clone();
        inner.operation_ids.remove(operation_id);
        tracing::debug!(tenant = %tenant, operation_id = %operation_id, "pull operation");
        Ok(Some(updated))
    }

    async fn delete_one(
        &self,
        tenant: &TenantId,
        selector: &PatientSelector,
    ) -> StoreResult<Option<Patient>> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.position(tenant, selector) else {
            return Ok(None);
        };

        let patient = inner.patients.remove(pos);
        for op in &patient.operations {
            inner.operation_ids.remove(&op.operation_id);
        }
        tracing::debug!(tenant = %tenant, admission_no = %patient.admission_no, "delete patient");
        Ok(Some(patient))
    }

    async fn flatten_operations(
        &self,
        tenant: &TenantId,
        query: &OperationQuery,
    ) -> StoreResult<Vec<FlatOperation>> {
        let inner = self.inner.read();
        let mut rows: Vec<FlatOperation> = inner
            .patients
            .iter()
            .filter(|p| p.tenant_id == tenant.as_str())
            .flat_map(|p| {
                p.operations
                    .iter()
                    .filter(|op| query.matches(op))
                    .map(|op| FlatOperation::new(p, op.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        rows.sort_by_key(|row| row.operation.scheduled_date);
        if query.sort == SortOrder::ScheduledDateDesc {
            rows.reverse();
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otr_model::OperationStatus;
    use serde_json::json;

    fn operation(id: &str, date: &str) -> Operation {
        serde_json::from_value(json!({
            "operationId": id,
            "scheduledDate": date,
            "type": "appendicectomy",
            "diagnosis": "acute appendicitis",
            "indication": "peritonism",
            "priority": "urgent",
            "anesthesia": "ga",
            "surgeon": "Maj Rahman",
            "anaesthetist": "Capt Das",
            "nurse": "Lt Akter"
        }))
        .unwrap()
    }

    fn patient(tenant: &str, admission_no: &str, ops: Vec<Operation>) -> Patient {
        let now = Utc::now();
        Patient {
            id: format!("doc-{}-{}", tenant, admission_no),
            tenant_id: tenant.to_string(),
            admission_no: admission_no.to_string(),
            name: "Sgt Karim".to_string(),
            rank: "Sgt".to_string(),
            unit: "1 Sig Bn".to_string(),
            date_of_birth: "1990-06-15".parse().unwrap(),
            operations: ops,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_is_tenant_scoped() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        let h2 = TenantId::new("h2");
        store
            .insert(&h1, patient("h1", "A-100", vec![]))
            .await
            .unwrap();

        let selector = PatientSelector::AdmissionNo("A-100".to_string());
        assert!(store.find_one(&h1, &selector).await.unwrap().is_some());
        assert!(store.find_one(&h2, &selector).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_does_not_leak_across_tenants() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        let stored = store
            .insert(&h1, patient("h1", "A-100", vec![]))
            .await
            .unwrap();

        let selector = PatientSelector::Id(stored.id.clone());
        assert!(store
            .find_one(&TenantId::new("h2"), &selector)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_admission_no_within_tenant() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(&h1, patient("h1", "A-100", vec![]))
            .await
            .unwrap();

        let err = store
            .insert(&h1, patient("h1", "A-100", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey { index: index::ADMISSION_NO, .. }
        ));

        // Same admission number under another tenant is fine.
        store
            .insert(&TenantId::new("h2"), patient("h2", "A-100", vec![]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_operation_id_unique_across_patients() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(
                &h1,
                patient("h1", "A-100", vec![operation("op-1", "2025-04-05T09:00:00Z")]),
            )
            .await
            .unwrap();

        let err = store
            .insert(
                &h1,
                patient("h1", "A-200", vec![operation("op-1", "2025-04-06T09:00:00Z")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey { index: index::OPERATION_ID, .. }
        ));

        // The failed insert must not have left A-200 behind.
        assert!(store
            .find_one(&h1, &PatientSelector::AdmissionNo("A-200".to_string()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_push_operation_checks_index_and_bumps_updated_at() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        let before = store
            .insert(
                &h1,
                patient("h1", "A-100", vec![operation("op-1", "2025-04-05T09:00:00Z")]),
            )
            .await
            .unwrap();

        let selector = PatientSelector::AdmissionNo("A-100".to_string());
        let err = store
            .push_operation(&h1, &selector, operation("op-1", "2025-04-07T09:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        let updated = store
            .push_operation(&h1, &selector, operation("op-2", "2025-04-07T09:00:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.operations.len(), 2);
        assert!(updated.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_one_merges_and_protects_immutable_fields() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(&h1, patient("h1", "A-100", vec![]))
            .await
            .unwrap();

        let selector = PatientSelector::AdmissionNo("A-100".to_string());
        let updated = store
            .update_one(
                &h1,
                &selector,
                json!({ "name": "Sgt Karim Updated", "admissionNo": "HACKED", "tenantId": "h9" }),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Sgt Karim Updated");
        assert_eq!(updated.admission_no, "A-100");
        assert_eq!(updated.tenant_id, "h1");
    }

    #[tokio::test]
    async fn test_update_operation_null_removes_field() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        let mut op = operation("op-1", "2025-04-05T09:00:00Z");
        op.status = OperationStatus::Postponed;
        op.postponed_date = Some("2025-04-10T09:00:00Z".parse().unwrap());
        store
            .insert(&h1, patient("h1", "A-100", vec![op]))
            .await
            .unwrap();

        let selector = PatientSelector::AdmissionNo("A-100".to_string());
        let updated = store
            .update_operation(
                &h1,
                &selector,
                "op-1",
                json!({ "status": "scheduled", "postponedDate": null }),
            )
            .await
            .unwrap()
            .unwrap();

        let op = updated.operation("op-1").unwrap();
        assert_eq!(op.status, OperationStatus::Scheduled);
        assert!(op.postponed_date.is_none());
    }

    #[tokio::test]
    async fn test_update_operation_missing_link_is_none() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(
                &h1,
                patient("h1", "A-100", vec![operation("op-1", "2025-04-05T09:00:00Z")]),
            )
            .await
            .unwrap();

        // Operation exists but under a different admission.
        store
            .insert(&h1, patient("h1", "A-200", vec![]))
            .await
            .unwrap();
        let wrong_admission = PatientSelector::AdmissionNo("A-200".to_string());
        assert!(store
            .update_operation(&h1, &wrong_admission, "op-1", json!({}))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_pull_operation_frees_the_id() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(
                &h1,
                patient("h1", "A-100", vec![operation("op-1", "2025-04-05T09:00:00Z")]),
            )
            .await
            .unwrap();

        let selector = PatientSelector::AdmissionNo("A-100".to_string());
        let updated = store
            .pull_operation(&h1, &selector, "op-1")
            .await
            .unwrap()
            .unwrap();
        assert!(updated.operations.is_empty());

        // Id is reusable after the pull.
        store
            .push_operation(&h1, &selector, operation("op-1", "2025-04-08T09:00:00Z"))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_one_frees_all_operation_ids() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(
                &h1,
                patient("h1", "A-100", vec![operation("op-1", "2025-04-05T09:00:00Z")]),
            )
            .await
            .unwrap();

        store
            .delete_one(&h1, &PatientSelector::AdmissionNo("A-100".to_string()))
            .await
            .unwrap()
            .unwrap();

        // Freed ids can be inserted again.
        store
            .insert(
                &h1,
                patient("h1", "A-300", vec![operation("op-1", "2025-04-09T09:00:00Z")]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_many_sorts_by_earliest_relevant_date() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        store
            .insert(
                &h1,
                patient("h1", "A-200", vec![operation("op-2", "2025-04-07T09:00:00Z")]),
            )
            .await
            .unwrap();
        store
            .insert(
                &h1,
                patient("h1", "A-100", vec![operation("op-1", "2025-04-05T09:00:00Z")]),
            )
            .await
            .unwrap();

        let listed = store.find_many(&h1, None, SortOrder::ScheduledDateAsc).await.unwrap();
        let order: Vec<_> = listed.iter().map(|p| p.admission_no.as_str()).collect();
        assert_eq!(order, vec!["A-100", "A-200"]);

        let window = DateWindow::day("2025-04-07".parse().unwrap());
        let listed = store
            .find_many(&h1, Some(&window), SortOrder::ScheduledDateAsc)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].admission_no, "A-200");
    }

    #[tokio::test]
    async fn test_flatten_operations_filters_and_sorts() {
        let store = MemoryStore::new();
        let h1 = TenantId::new("h1");
        let mut done = operation("op-2", "2025-04-03T09:00:00Z");
        done.status = OperationStatus::Completed;
        store
            .insert(
                &h1,
                patient(
                    "h1",
                    "A-100",
                    vec![operation("op-1", "2025-04-05T09:00:00Z"), done],
                ),
            )
            .await
            .unwrap();
        store
            .insert(
                &h1,
                patient("h1", "A-200", vec![operation("op-3", "2025-04-04T09:00:00Z")]),
            )
            .await
            .unwrap();

        let rows = store
            .flatten_operations(
                &h1,
                &OperationQuery {
                    window: None,
                    statuses: Some(vec![OperationStatus::Scheduled]),
                    sort: SortOrder::ScheduledDateAsc,
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.operation.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["op-3", "op-1"]);
        assert_eq!(rows[0].admission_no, "A-200");

        let rows = store
            .flatten_operations(
                &h1,
                &OperationQuery {
                    window: None,
                    statuses: None,
                    sort: SortOrder::ScheduledDateDesc,
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.operation.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["op-1", "op-3", "op-2"]);
    }
}
