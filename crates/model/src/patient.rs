//! The tenant-scoped patient admission document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::operation::Operation;

/// A patient admission, the unit of storage.
///
/// One `Patient` exists per admission and owns its embedded [`Operation`]s
/// exclusively - no operation exists outside a patient document. The
/// `tenant_id` is stamped at creation and every query or mutation must be
/// conjoined with it; `id`, `tenant_id` and `admission_no` are immutable
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Server-assigned document id, unique across the store.
    pub id: String,

    /// The hospital this admission belongs to. Stored as an opaque string;
    /// the persistence layer wraps it in its tenant type.
    pub tenant_id: String,

    /// Admission number, unique within the tenant.
    pub admission_no: String,

    /// Patient name.
    pub name: String,

    /// Service rank.
    pub rank: String,

    /// Unit or formation.
    pub unit: String,

    /// Date of birth; ages in schedule views are derived from this at query
    /// time rather than stored.
    pub date_of_birth: NaiveDate,

    /// Operations embedded in this admission. Insertion order carries no
    /// meaning; views sort by scheduled date.
    #[serde(default)]
    pub operations: Vec<Operation>,

    /// When the document was created.
    pub created_at: DateTime<Utc>,

    /// When the document was last mutated. Bumped by the store on every
    /// mutating call.
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Returns the embedded operation with the given id, if present.
    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }

    /// Returns the earliest scheduled date among this patient's operations,
    /// restricted to `window` when one is given. Used as the sort key for
    /// patient list views.
    pub fn earliest_operation_date(
        &self,
        window: Option<&(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Option<DateTime<Utc>> {
        self.operations
            .iter()
            .map(|op| op.scheduled_date)
            .filter(|d| match window {
                Some((start, end)) => d >= start && d < end,
                None => true,
            })
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Anesthesia, OperationStatus, OtType, Priority};

    fn operation(id: &str, date: &str) -> Operation {
        Operation {
            operation_id: id.to_string(),
            scheduled_date: date.parse().unwrap(),
            procedure: "appendicectomy".to_string(),
            diagnosis: "acute appendicitis".to_string(),
            indication: "peritonism".to_string(),
            status: OperationStatus::Scheduled,
            postponed_date: None,
            priority: Priority::Urgent,
            ot_type: OtType::Main,
            anesthesia: Anesthesia::Ga,
            surgeon: "Maj Rahman".to_string(),
            assistant: None,
            anaesthetist: "Capt Das".to_string(),
            nurse: "Lt Akter".to_string(),
            pre_op_assessment: None,
            intra_op_monitoring: None,
            recovery_status: None,
        }
    }

    fn patient() -> Patient {
        Patient {
            id: "p-1".to_string(),
            tenant_id: "h1".to_string(),
            admission_no: "A-100".to_string(),
            name: "Sgt Karim".to_string(),
            rank: "Sgt".to_string(),
            unit: "1 Sig Bn".to_string(),
            date_of_birth: "1990-06-15".parse().unwrap(),
            operations: vec![
                operation("op-2", "2025-04-07T10:00:00Z"),
                operation("op-1", "2025-04-05T09:30:00Z"),
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_operation_lookup() {
        let p = patient();
        assert!(p.operation("op-1").is_some());
        assert!(p.operation("op-9").is_none());
    }

    #[test]
    fn test_earliest_operation_date() {
        let p = patient();
        let earliest = p.earliest_operation_date(None).unwrap();
        assert_eq!(earliest, "2025-04-05T09:30:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_earliest_operation_date_windowed() {
        let p = patient();
        let window = (
            "2025-04-06T00:00:00Z".parse().unwrap(),
            "2025-04-08T00:00:00Z".parse().unwrap(),
        );
        let earliest = p.earliest_operation_date(Some(&window)).unwrap();
        assert_eq!(earliest, "2025-04-07T10:00:00Z".parse::<DateTime<Utc>>().unwrap());

        let empty_window = (
            "2025-05-01T00:00:00Z".parse().unwrap(),
            "2025-05-02T00:00:00Z".parse().unwrap(),
        );
        assert!(p.earliest_operation_date(Some(&empty_window)).is_none());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let p = patient();
        let value = serde_json::to_value(&p).unwrap();
        assert!(value.get("admissionNo").is_some());
        assert!(value.get("tenantId").is_some());
        assert!(value.get("dateOfBirth").is_some());
        assert!(value.get("admission_no").is_none());
    }
}
