//! Query shapes the store understands.
//!
//! The core is deliberately not given a generic query language; these types
//! enumerate the only filter, sort and aggregate shapes a backend has to
//! support.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use otr_model::{Operation, OperationStatus};

/// Selects a single patient document within a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientSelector {
    /// By admission number (unique within the tenant).
    AdmissionNo(String),
    /// By server-assigned document id.
    Id(String),
    /// The patient owning the operation with this id.
    OperationId(String),
}

impl PatientSelector {
    /// Returns `true` if the given patient matches this selector.
    pub fn matches(&self, patient: &otr_model::Patient) -> bool {
        match self {
            PatientSelector::AdmissionNo(no) => &patient.admission_no == no,
            PatientSelector::Id(id) => &patient.id == id,
            PatientSelector::OperationId(op_id) => patient.operation(op_id).is_some(),
        }
    }
}

/// A half-open UTC instant window `[start, end)`.
///
/// All date-scoped queries are expressed through this type so that day
/// alignment happens in exactly one place: a calendar day covers
/// `[00:00:00Z, next day 00:00:00Z)`, which keeps `23:59:59Z` inside the
/// day it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// The window covering one UTC calendar day.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
        Self {
            start,
            end: start + TimeDelta::days(1),
        }
    }

    /// The window covering `[start_of(start), start_of(end) + 24h)`, i.e.
    /// both bounds day-aligned and the end day included.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: DateWindow::day(start).start,
            end: DateWindow::day(end).end,
        }
    }

    /// Returns `true` if the instant falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Sort order for operation-date-keyed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Earliest scheduled date first.
    #[default]
    ScheduledDateAsc,
    /// Latest scheduled date first.
    ScheduledDateDesc,
}

/// The aggregate shape: tenant match, flatten the operations array, filter
/// the flattened rows, sort.
#[derive(Debug, Clone, Default)]
pub struct OperationQuery {
    /// Keep only operations whose scheduled date falls in this window.
    pub window: Option<DateWindow>,
    /// Keep only operations whose status is one of these. `None` means no
    /// status filter; an empty vec matches nothing.
    pub statuses: Option<Vec<OperationStatus>>,
    /// Sort order of the flattened rows.
    pub sort: SortOrder,
}

impl OperationQuery {
    /// Returns `true` if the operation passes the window and status filters.
    pub fn matches(&self, operation: &Operation) -> bool {
        if let Some(window) = &self.window {
            if !window.contains(operation.scheduled_date) {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&operation.status) {
                return false;
            }
        }
        true
    }
}

/// One flattened row of an operation list view: the operation plus a
/// snapshot of its parent patient's identity fields. A patient with N
/// matching operations yields N rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatOperation {
    /// Parent patient document id.
    pub patient_id: String,
    /// Parent admission number.
    pub admission_no: String,
    /// Patient name.
    pub name: String,
    /// Service rank.
    pub rank: String,
    /// Unit or formation.
    pub unit: String,
    /// Date of birth, for query-time age derivation.
    pub date_of_birth: NaiveDate,
    /// The matching operation.
    #[serde(flatten)]
    pub operation: Operation,
}

impl FlatOperation {
    /// Builds a row from a patient and one of its operations.
    pub fn new(patient: &otr_model::Patient, operation: Operation) -> Self {
        Self {
            patient_id: patient.id.clone(),
            admission_no: patient.admission_no.clone(),
            name: patient.name.clone(),
            rank: patient.rank.clone(),
            unit: patient.unit.clone(),
            date_of_birth: patient.date_of_birth,
            operation,
        }
    }
}
