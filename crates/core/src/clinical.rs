//! Editors for the three clinical sub-records of an operation.
//!
//! Each editor reads the operation, deep-merges the caller's partial record
//! into the stored one (see [`crate::merge`]) and writes the complete merged
//! sub-record back as a single element patch. Editing one sub-record never
//! touches its siblings or the operation's descriptive fields.
//!
//! Alongside the merge editors there are append operations for the
//! sequence-valued fields, so periodic readings can be recorded one at a
//! time without resending the whole series.

use serde::Serialize;
use serde_json::json;

use otr_model::{
    FluidAdministered, IntraOpMonitoring, MedicationEvent, Operation, PreOpAssessment,
    RecoveryStatus, RecoveryVitals, VitalsSnapshot,
};
use otr_persistence::{PatientSelector, TenantId};

use crate::error::{NotFoundError, RecordResult};
use crate::merge::merge_sub_record;
use crate::records::RecordService;

/// The intra-operative sequences, gathered for charting.
///
/// Every sequence is present (possibly empty) even when the underlying
/// record or field was never written, so consumers never branch on null.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntraOpCollections {
    /// Main vitals series.
    pub monitoring: Vec<VitalsSnapshot>,
    /// Drugs administered.
    pub medications: Vec<MedicationEvent>,
    /// Fluids administered.
    pub fluids: Vec<FluidAdministered>,
    /// Vitals readings outside the main series.
    pub other_vitals: Vec<VitalsSnapshot>,
}

impl RecordService {
    /// Deep-merges a partial pre-operative assessment and returns the merged
    /// record.
    pub async fn update_pre_op(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        patch: PreOpAssessment,
    ) -> RecordResult<PreOpAssessment> {
        let current = self.get_operation(tenant, admission_no, operation_id).await?;
        let merged = merge_sub_record(current.pre_op_assessment.as_ref(), &patch)?;
        self.write_sub_record(tenant, admission_no, operation_id, "preOpAssessment", &merged)
            .await?;
        Ok(merged)
    }

    /// Deep-merges a partial intra-operative monitoring record and returns
    /// the merged record. Sequence fields present in the patch replace the
    /// stored sequences wholesale; use the append operations for
    /// one-at-a-time recording.
    pub async fn update_intra_op(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        patch: IntraOpMonitoring,
    ) -> RecordResult<IntraOpMonitoring> {
        let current = self.get_operation(tenant, admission_no, operation_id).await?;
        let merged = merge_sub_record(current.intra_op_monitoring.as_ref(), &patch)?;
        self.write_sub_record(tenant, admission_no, operation_id, "intraOpMonitoring", &merged)
            .await?;
        Ok(merged)
    }

    /// Deep-merges a partial recovery record and returns the merged record.
    pub async fn update_recovery(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        patch: RecoveryStatus,
    ) -> RecordResult<RecoveryStatus> {
        let current = self.get_operation(tenant, admission_no, operation_id).await?;
        let merged = merge_sub_record(current.recovery_status.as_ref(), &patch)?;
        self.write_sub_record(tenant, admission_no, operation_id, "recoveryStatus", &merged)
            .await?;
        Ok(merged)
    }

    /// Appends one vitals reading to the main intra-operative series.
    pub async fn add_monitoring_snapshot(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        snapshot: VitalsSnapshot,
    ) -> RecordResult<IntraOpMonitoring> {
        self.append_intra_op(tenant, admission_no, operation_id, |record| {
            record.monitoring.get_or_insert_with(Vec::new).push(snapshot)
        })
        .await
    }

    /// Appends one fluid entry to the intra-operative record.
    pub async fn add_fluid(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        fluid: FluidAdministered,
    ) -> RecordResult<IntraOpMonitoring> {
        self.append_intra_op(tenant, admission_no, operation_id, |record| {
            record.fluids_administered.get_or_insert_with(Vec::new).push(fluid)
        })
        .await
    }

    /// Appends one medication event to the intra-operative record.
    pub async fn add_medication(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        medication: MedicationEvent,
    ) -> RecordResult<IntraOpMonitoring> {
        self.append_intra_op(tenant, admission_no, operation_id, |record| {
            record.medications.get_or_insert_with(Vec::new).push(medication)
        })
        .await
    }

    /// Appends one vitals reading (with pain score) to the recovery record.
    pub async fn add_recovery_vitals(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        vitals: RecoveryVitals,
    ) -> RecordResult<RecoveryStatus> {
        let current = self.get_operation(tenant, admission_no, operation_id).await?;
        let mut record = current.recovery_status.unwrap_or_default();
        record.vital_signs.get_or_insert_with(Vec::new).push(vitals);
        self.write_sub_record(tenant, admission_no, operation_id, "recoveryStatus", &record)
            .await?;
        Ok(record)
    }

    /// Gathers the intra-operative sequences of one operation. Sequences
    /// never recorded come back empty, not null.
    pub async fn intra_op_collections(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
    ) -> RecordResult<IntraOpCollections> {
        let operation = self.get_operation(tenant, admission_no, operation_id).await?;
        let record = operation.intra_op_monitoring.unwrap_or_default();
        Ok(IntraOpCollections {
            monitoring: record.monitoring.unwrap_or_default(),
            medications: record.medications.unwrap_or_default(),
            fluids: record.fluids_administered.unwrap_or_default(),
            other_vitals: record.other_vitals.unwrap_or_default(),
        })
    }

    async fn append_intra_op(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        append: impl FnOnce(&mut IntraOpMonitoring),
    ) -> RecordResult<IntraOpMonitoring> {
        let current = self.get_operation(tenant, admission_no, operation_id).await?;
        let mut record = current.intra_op_monitoring.unwrap_or_default();
        append(&mut record);
        self.write_sub_record(tenant, admission_no, operation_id, "intraOpMonitoring", &record)
            .await?;
        Ok(record)
    }

    async fn write_sub_record<T: Serialize>(
        &self,
        tenant: &TenantId,
        admission_no: &str,
        operation_id: &str,
        field: &'static str,
        record: &T,
    ) -> RecordResult<Operation> {
        let value = serde_json::to_value(record).map_err(|e| {
            crate::error::RecordError::Unavailable(otr_persistence::StoreError::Serialization {
                message: e.to_string(),
            })
        })?;
        tracing::debug!(
            tenant = %tenant,
            admission_no = %admission_no,
            operation_id = %operation_id,
            field,
            "write sub-record"
        );
        let patient = self
            .store()
            .update_operation(
                tenant,
                &PatientSelector::AdmissionNo(admission_no.to_string()),
                operation_id,
                json!({ field: value }),
            )
            .await?
            .ok_or_else(|| {
                crate::error::RecordError::from(NotFoundError::Operation {
                    admission_no: admission_no.to_string(),
                    operation_id: operation_id.to_string(),
                })
            })?;
        Ok(patient
            .operation(operation_id)
            .cloned()
            .expect("store returned the patient containing the edited operation"))
    }
}
