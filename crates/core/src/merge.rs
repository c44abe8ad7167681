//! Deep-merge utility for clinical sub-records.
//!
//! Sub-record edits are deep merges computed on an in-memory JSON
//! representation and written back as one whole-value element patch. This
//! keeps the core store-agnostic: no backend needs a native nested-path
//! update syntax.
//!
//! Merge semantics (RFC 7396 via `json_patch::merge`):
//! - provided leaf fields overwrite their counterparts,
//! - fields absent from the patch are left untouched,
//! - sequence-valued fields are replaced wholesale - partial sequence edits
//!   are deliberately unsupported; callers resend the full sequence or use
//!   the explicit append operations.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RecordError, RecordResult};

/// Deep-merges a typed partial sub-record into the current one (absent
/// current means "start from empty") and returns the merged record.
pub fn merge_sub_record<T>(current: Option<&T>, patch: &T) -> RecordResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut doc = match current {
        Some(value) => to_value(value)?,
        None => Value::Object(serde_json::Map::new()),
    };
    let patch = to_value(patch)?;
    json_patch::merge(&mut doc, &patch);
    serde_json::from_value(doc).map_err(|e| {
        RecordError::Unavailable(otr_persistence::StoreError::Serialization {
            message: e.to_string(),
        })
    })
}

fn to_value<T: Serialize>(value: &T) -> RecordResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        RecordError::Unavailable(otr_persistence::StoreError::Serialization {
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use otr_model::{IntraOpMonitoring, PreOpAssessment, VitalsSnapshot};

    #[test]
    fn test_disjoint_fields_accumulate() {
        let first = PreOpAssessment {
            hb: Some("11.2".to_string()),
            ..Default::default()
        };
        let second = PreOpAssessment {
            consent: Some(true),
            ..Default::default()
        };

        let merged = merge_sub_record(None, &first).unwrap();
        let merged = merge_sub_record(Some(&merged), &second).unwrap();
        assert_eq!(merged.hb.as_deref(), Some("11.2"));
        assert_eq!(merged.consent, Some(true));
    }

    #[test]
    fn test_repeated_merge_is_idempotent() {
        let patch = PreOpAssessment {
            asa_grade: Some("II".to_string()),
            ..Default::default()
        };
        let once = merge_sub_record(None, &patch).unwrap();
        let twice = merge_sub_record(Some(&once), &patch).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_leaf_overwrites_leave_siblings_alone() {
        let current = PreOpAssessment {
            hb: Some("11.2".to_string()),
            allergies: Some("nil".to_string()),
            ..Default::default()
        };
        let patch = PreOpAssessment {
            hb: Some("12.0".to_string()),
            ..Default::default()
        };
        let merged = merge_sub_record(Some(&current), &patch).unwrap();
        assert_eq!(merged.hb.as_deref(), Some("12.0"));
        assert_eq!(merged.allergies.as_deref(), Some("nil"));
    }

    #[test]
    fn test_sequences_replace_wholesale() {
        let current = IntraOpMonitoring {
            monitoring: Some(vec![
                VitalsSnapshot { hr: Some(70), ..Default::default() },
                VitalsSnapshot { hr: Some(72), ..Default::default() },
            ]),
            blood_loss: Some("100ml".to_string()),
            ..Default::default()
        };
        let patch = IntraOpMonitoring {
            monitoring: Some(vec![VitalsSnapshot { hr: Some(90), ..Default::default() }]),
            ..Default::default()
        };
        let merged = merge_sub_record(Some(&current), &patch).unwrap();
        // Not appended, not element-merged: the new sequence wins outright.
        assert_eq!(merged.monitoring.as_ref().unwrap().len(), 1);
        assert_eq!(merged.monitoring.unwrap()[0].hr, Some(90));
        assert_eq!(merged.blood_loss.as_deref(), Some("100ml"));
    }
}
