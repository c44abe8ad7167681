//! Patient and operation record management.
//!
//! [`RecordService`] owns the canonical record operations: patient CRUD,
//! operation CRUD within a patient, and the status transitions of the state
//! machine in [`crate::status`]. All lookups and mutations are conjoined
//! with the caller's tenant; a document id that resolves to another tenant's
//! record behaves as not-found.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use otr_model::{Anesthesia, Operation, OperationStatus, OtType, Patient, Priority};
use otr_persistence::{DateWindow, PatientSelector, PatientStore, SortOrder, TenantId};

use crate::error::{NotFoundError, RecordResult, ValidationError};
use crate::principal::{AllowAll, Principal, TransitionGate};
use crate::status::{plan_transition, TransitionPlan, TransitionRequest};

/// Input for creating a patient, with optional initial operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    /// Admission number, unique within the tenant.
    pub admission_no: String,
    /// Patient name.
    pub name: String,
    /// Service rank.
    pub rank: String,
    /// Unit or formation.
    pub unit: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Operations to embed at creation time.
    #[serde(default)]
    pub operations: Vec<NewOperation>,
}

/// Input for creating one operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOperation {
    /// Explicit operation id; assigned by the server when absent. An
    /// explicit id colliding with any existing one is a conflict.
    #[serde(default)]
    pub operation_id: Option<String>,
    /// When the operation is scheduled.
    pub scheduled_date: DateTime<Utc>,
    /// Procedure name.
    #[serde(rename = "type")]
    pub procedure: String,
    /// Working diagnosis.
    pub diagnosis: String,
    /// Indication for surgery.
    pub indication: String,
    /// Initial status; defaults to `scheduled`.
    #[serde(default)]
    pub status: OperationStatus,
    /// Clinical priority.
    pub priority: Priority,
    /// Theatre suite.
    #[serde(default)]
    pub ot_type: OtType,
    /// Anaesthetic technique.
    pub anesthesia: Anesthesia,
    /// Operating surgeon.
    pub surgeon: String,
    /// Assisting surgeon.
    #[serde(default)]
    pub assistant: Option<String>,
    /// Anaesthetist.
    pub anaesthetist: String,
    /// Theatre nurse.
    pub nurse: String,
}

impl NewOperation {
    fn into_operation(self) -> Operation {
        Operation {
            operation_id: self
                .operation_id
                .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            scheduled_date: self.scheduled_date,
            procedure: self.procedure,
            diagnosis: self.diagnosis,
            indication: self.indication,
            status: self.status,
            postponed_date: None,
            priority: self.priority,
            ot_type: self.ot_type,
            anesthesia: self.anesthesia,
            surgeon: self.surgeon,
            assistant: self.assistant,
            anaesthetist: self.anaesthetist,
            nurse: self.nurse,
            pre_op_assessment: None,
            intra_op_monitoring: None,
            recovery_status: None,
        }
    }

    fn validate(&self) -> RecordResult<()> {
        require("type", &self.procedure)?;
        require("diagnosis", &self.diagnosis)?;
        require("indication", &self.indication)?;
        require("surgeon", &self.surgeon)?;
        require("anaesthetist", &self.anaesthetist)?;
        require("nurse", &self.nurse)?;
        if let Some(id) = &self.operation_id {
            if id.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: "operationId",
                    message: "must not be blank when supplied".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Partial top-level patient update.
///
/// The immutable fields (`id`, `tenantId`, `admissionNo`, timestamps) are
/// not expressible here, so arbitrary caller input is silently stripped of
/// them by deserialization into this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    /// New patient name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New rank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// New unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Corrected date of birth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update of one operation's descriptive fields.
///
/// Status, `postponedDate` and the clinical sub-records are deliberately not
/// expressible: status moves only through the state machine and sub-records
/// only through their editors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationPatch {
    /// New scheduled date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    /// New procedure name.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    /// New diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// New indication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New theatre suite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ot_type: Option<OtType>,
    /// New anaesthetic technique.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anesthesia: Option<Anesthesia>,
    /// New surgeon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgeon: Option<String>,
    /// New assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
    /// New anaesthetist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anaesthetist: Option<String>,
    /// New nurse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse: Option<String>,
}

fn require(field: &'static str, value: &str) -> RecordResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingRequiredField { field }.into());
    }
    Ok(())
}

fn to_patch_value<T: Serialize>(patch: &T) -> RecordResult<Value> {
    serde_json::to_value(patch).map_err(|e| {
        crate::error::RecordError::Unavailable(otr_persistence::StoreError::Serialization {
            message: e.to_string(),
        })
    })
}

/// The record store service.
///
/// Stateless between calls: all state lives in the store collaborator, so
/// commands may execute concurrently and the store's single-document
/// atomicity is the only synchronization relied upon.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn PatientStore>,
    gate: Arc<dyn TransitionGate>,
}

impl RecordService {
    /// Creates a service over the given store with the permissive default
    /// transition gate.
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self {
            store,
            gate: Arc::new(AllowAll),
        }
    }

    /// Replaces the transition gate.
    pub fn with_gate(mut self, gate: Arc<dyn TransitionGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn PatientStore> {
        &self.store
    }

    /// Creates a patient with its initial operations.
    ///
    /// Validates required fields, assigns ids where absent, and stamps the
    /// tenant. An explicit operation id colliding store-wide surfaces as a
    /// conflict from the store's uniqueness index.
    pub async fn create_patient(
        &self,
        tenant: &TenantId,
        input: NewPatient,
    ) -> RecordResult<Patient> {
        require("admissionNo", &input.admission_no)?;
        require("name", &input.name)?;
        require("rank", &input.rank)?;
        require("unit", &input.unit)?;
        for op in &input.operations {
            op.validate()?;
        }

        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4().simple().to_string(),
            tenant_id: tenant.as_str().to_string(),
            admission_no: input.admission_no,
            name: input.name,
            rank: input.rank,
            unit: input.unit,
            date_of_birth: input.date_of_birth,
            operations: input
                .operations
                .into_iter()
                .map(NewOperation::into_operation)
                .collect(),
            created_at: now,
            updated_at: now,
        };

        tracing::debug!(tenant = %tenant, admission_no = %patient.admission_no, "create patient");
        Ok(self.store.insert(tenant, patient).await?)
    }

    /// Fetches a patient by admission number.
    pub async fn get_patient(
        &self,
        tenant: &TenantId,
        admission_no: &str,
    ) -> RecordResult<Patient> {
        self.store
            .find_one(tenant, &PatientSelector::AdmissionNo(admission_no.to_string()))
            .await?
            .ok_or_else(|| {
                NotFoundError::Patient {
                    tenant: tenant.clone(),
                    admission_no: admission_no.to_string(),
                }
                .into()
            })
    }

    /// Fetches a patient by document id. An id belonging to another tenant
    /// behaves as not-found.
    pub async fn get_patient_by_id(&self, tenant: &TenantId, id: &str) -> RecordResult<Patient> {
        self.store
            .find_one(tenant, &PatientSelector::Id(id.to_string()))
            .await?
            .ok_or_else(|| {
                NotFoundError::PatientById {
                    tenant: tenant.clone(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// Merges the provided top-level fields into a patient.
    pub async fn update_patient(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        patch: PatientPatch,
    ) -> RecordResult<Patient> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        let value = to_patch_value(&patch)?;
        self.store
            .update_one(
                tenant,
                &PatientSelector::AdmissionNo(admission_no.to_string()),
                value,
            )
            .await?
            .ok_or_else(|| {
                NotFoundError::Patient {
                    tenant: tenant.clone(),
                    admission_no: admission_no.to_string(),
                }
                .into()
            })
    }

    /// Deletes a patient and all embedded operations atomically.
    pub async fn delete_patient(&self, tenant: &TenantId, admission_no: &str) -> RecordResult<()> {
        self.store
            .delete_one(tenant, &PatientSelector::AdmissionNo(admission_no.to_string()))
            .await?
            .ok_or(NotFoundError::Patient {
                tenant: tenant.clone(),
                admission_no: admission_no.to_string(),
            })?;
        Ok(())
    }

    /// Lists the tenant's patients, optionally restricted to those with an
    /// operation inside `window`, ascending by earliest relevant date.
    pub async fn list_patients(
        &self,
        tenant: &TenantId,
        window: Option<DateWindow>,
    ) -> RecordResult<Vec<Patient>> {
        Ok(self
            .store
            .find_many(tenant, window.as_ref(), SortOrder::ScheduledDateAsc)
            .await?)
    }

    /// Appends an operation to an existing admission.
    pub async fn add_operation(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        input: NewOperation,
    ) -> RecordResult<Patient> {
        input.validate()?;
        let operation = input.into_operation();
        tracing::debug!(
            tenant = %tenant,
            admission_no = %admission_no,
            operation_id = %operation.operation_id,
            "add operation"
        );
        self.store
            .push_operation(
                tenant,
                &PatientSelector::AdmissionNo(admission_no.to_string()),
                operation,
            )
            .await?
            .ok_or_else(|| {
                NotFoundError::Patient {
                    tenant: tenant.clone(),
                    admission_no: admission_no.to_string(),
                }
                .into()
            })
    }

    /// Lists all operations of one admission.
    pub async fn operations(
        &self,
        tenant: &TenantId,
        admission_no: &str,
    ) -> RecordResult<Vec<Operation>> {
        Ok(self.get_patient(tenant, admission_no).await?.operations)
    }

    /// Fetches one operation of one admission.
    pub async fn get_operation(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
    ) -> RecordResult<Operation> {
        let patient = self.get_patient(tenant, admission_no).await?;
        patient
            .operation(operation_id)
            .cloned()
            .ok_or_else(|| operation_not_found(admission_no, operation_id))
    }

    /// Merges descriptive fields into one operation. Status and sub-records
    /// have their own entry points and are not reachable from here.
    pub async fn update_operation(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        patch: OperationPatch,
    ) -> RecordResult<Operation> {
        let value = to_patch_value(&patch)?;
        let patient = self
            .store
            .update_operation(
                tenant,
                &PatientSelector::AdmissionNo(admission_no.to_string()),
                operation_id,
                value,
            )
            .await?
            .ok_or_else(|| operation_not_found(admission_no, operation_id))?;
        Ok(patient
            .operation(operation_id)
            .cloned()
            .expect("store returned the patient containing the updated operation"))
    }

    /// Removes one operation; the patient persists.
    pub async fn delete_operation(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
    ) -> RecordResult<Patient> {
        self.store
            .pull_operation(
                tenant,
                &PatientSelector::AdmissionNo(admission_no.to_string()),
                operation_id,
            )
            .await?
            .ok_or_else(|| operation_not_found(admission_no, operation_id))
    }

    /// Applies a status transition to one operation on behalf of a
    /// principal.
    ///
    /// The transition gate is consulted first; the state machine then
    /// validates the move (see [`crate::status`]). A re-request of the
    /// current terminal state succeeds without writing.
    pub async fn update_status(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        admission_no: &str,
        operation_id: &str,
        request: TransitionRequest,
    ) -> RecordResult<Operation> {
        self.gate.authorize(principal, request.status)?;

        let current = self.get_operation(tenant, admission_no, operation_id).await?;
        match plan_transition(&current, &request)? {
            TransitionPlan::NoOp => Ok(current),
            TransitionPlan::Apply(patch) => {
                tracing::debug!(
                    tenant = %tenant,
                    principal = %principal,
                    operation_id = %operation_id,
                    from = %current.status,
                    to = %request.status,
                    "apply status transition"
                );
                let patient = self
                    .store
                    .update_operation(
                        tenant,
                        &PatientSelector::AdmissionNo(admission_no.to_string()),
                        operation_id,
                        patch,
                    )
                    .await?
                    .ok_or_else(|| operation_not_found(admission_no, operation_id))?;
                Ok(patient
                    .operation(operation_id)
                    .cloned()
                    .expect("store returned the patient containing the transitioned operation"))
            }
        }
    }
}

fn operation_not_found(admission_no: &str, operation_id: &str) -> crate::error::RecordError {
    NotFoundError::Operation {
        admission_no: admission_no.to_string(),
        operation_id: operation_id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_patch_strips_unknown_and_immutable_fields() {
        let raw = serde_json::json!({
            "name": "Updated",
            "admissionNo": "HACKED",
            "tenantId": "h9",
            "createdAt": "2020-01-01T00:00:00Z",
            "nonsense": 42
        });
        let patch: PatientPatch = serde_json::from_value(raw).unwrap();
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "name": "Updated" }));
    }

    #[test]
    fn test_operation_patch_cannot_express_status() {
        let raw = serde_json::json!({
            "diagnosis": "revised",
            "status": "completed",
            "postponedDate": "2025-04-10T09:00:00Z",
            "preOpAssessment": { "consent": true }
        });
        let patch: OperationPatch = serde_json::from_value(raw).unwrap();
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "diagnosis": "revised" }));
    }

    #[test]
    fn test_new_operation_validation_names_the_field() {
        let op: NewOperation = serde_json::from_value(serde_json::json!({
            "scheduledDate": "2025-04-05T09:30:00Z",
            "type": "appendicectomy",
            "diagnosis": "acute appendicitis",
            "indication": "peritonism",
            "priority": "urgent",
            "anesthesia": "ga",
            "surgeon": "  ",
            "anaesthetist": "Capt Das",
            "nurse": "Lt Akter"
        }))
        .unwrap();
        let err = op.validate().unwrap_err();
        assert_eq!(err.to_string(), "missing required field: surgeon");
    }
}
