//! The three clinical sub-records attached to an operation.
//!
//! Every field here is optional: sub-records are built up incrementally by
//! partial updates, and a field that was never recorded is simply absent.
//! Sequence fields (`Option<Vec<_>>`) are replaced wholesale by
//! overwrite-style updates - there is no element-level merge - so callers
//! either resend the full desired sequence or use the explicit append
//! operations in the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pre-operative assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreOpAssessment {
    /// Time of the patient's last meal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_meal: Option<DateTime<Utc>>,

    /// Local anaesthetic sensitivity test result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_test: Option<String>,

    /// Haemoglobin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hb: Option<String>,

    /// Bleeding time / clotting time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btct: Option<String>,

    /// HIV serology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hiv: Option<bool>,

    /// HCV serology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hcv: Option<bool>,

    /// HBsAg serology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hbsag: Option<bool>,

    /// When the assessment was performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_date: Option<DateTime<Utc>>,

    /// Airway assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airway_assessment: Option<String>,

    /// Cardiac risk grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardiac_risk: Option<String>,

    /// Respiratory risk grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_risk: Option<String>,

    /// ASA physical status grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asa_grade: Option<String>,

    /// Known allergies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,

    /// Current medications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,

    /// Fasting status at assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fasting_status: Option<String>,

    /// Whether informed consent has been taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<bool>,
}

/// One vitals reading taken during the operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSnapshot {
    /// Minutes from anaesthesia start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<i64>,

    /// Wall-clock time of the reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Non-invasive blood pressure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nibp: Option<String>,

    /// Oxygen saturation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<String>,

    /// ECG rhythm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecg: Option<String>,

    /// Heart rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr: Option<i32>,

    /// Respiratory rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rr: Option<i32>,

    /// Temperature in degrees Celsius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
}

/// One fluid administered intra-operatively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluidAdministered {
    /// Fluid type (e.g. crystalloid, blood product).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub fluid_type: Option<String>,

    /// Volume given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    /// When the infusion started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// When the infusion ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// One drug administered intra-operatively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEvent {
    /// Drug name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug: Option<String>,

    /// Dose given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,

    /// Minutes from anaesthesia start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<i64>,

    /// Wall-clock time of administration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Route of administration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Why the drug was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// Intra-operative monitoring record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntraOpMonitoring {
    /// Anaesthesia start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anesthesia_start_time: Option<DateTime<Utc>>,

    /// Surgery start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgery_start_time: Option<DateTime<Utc>>,

    /// Surgery end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgery_end_time: Option<DateTime<Utc>>,

    /// Anaesthesia end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anesthesia_end_time: Option<DateTime<Utc>>,

    /// Airway management technique.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airway_management: Option<String>,

    /// Time-ordered vitals readings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<Vec<VitalsSnapshot>>,

    /// Fluids administered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fluids_administered: Option<Vec<FluidAdministered>>,

    /// Estimated blood loss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_loss: Option<String>,

    /// Urine output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urine_output: Option<String>,

    /// Free-text complications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complications: Option<String>,

    /// Drugs administered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<MedicationEvent>>,

    /// Additional vitals readings outside the main monitoring series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_vitals: Option<Vec<VitalsSnapshot>>,
}

/// One vitals reading taken in recovery, with a pain score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryVitals {
    /// Wall-clock time of the reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Blood pressure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bp: Option<String>,

    /// Heart rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr: Option<i32>,

    /// Oxygen saturation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<String>,

    /// Pain score (0-10).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_score: Option<i32>,
}

/// Analgesia given in recovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainManagement {
    /// Drug given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,

    /// When it was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

/// Discharge-from-recovery criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeCriteria {
    /// Aldrete recovery score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aldrete_score: Option<i32>,

    /// Whether discharge criteria are met.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub met: Option<bool>,

    /// When the patient left recovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_time: Option<DateTime<Utc>>,
}

/// Post-operative recovery record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryStatus {
    /// When the patient entered recovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_start_time: Option<DateTime<Utc>>,

    /// When the patient left recovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_end_time: Option<DateTime<Utc>>,

    /// Time-ordered recovery vitals with pain scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<Vec<RecoveryVitals>>,

    /// Level of consciousness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consciousness: Option<String>,

    /// Analgesia given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_management: Option<PainManagement>,

    /// Discharge criteria.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_criteria: Option<DischargeCriteria>,

    /// Free-text complications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complications: Option<String>,

    /// Post-operative instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_op_instructions: Option<String>,
}
