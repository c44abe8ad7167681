//! The theatre schedule query engine.
//!
//! Read-only views over the flattened operation rows the store exposes:
//! day lists, date ranges, status worklists and the combined filter. Every
//! row carries the patient's identity snapshot plus an age derived at query
//! time from the date of birth, so stored records never hold a stale age.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

use otr_model::OperationStatus;
use otr_persistence::{DateWindow, FlatOperation, OperationQuery, PatientStore, SortOrder, TenantId};

use crate::error::{RecordResult, ValidationError};

/// A date parameter: the literal `today` or a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    /// The current UTC calendar day, resolved at query time.
    Today,
    /// A specific calendar day.
    On(NaiveDate),
}

impl DateSpec {
    /// Parses a date parameter: `"today"` (case-insensitive) or
    /// `YYYY-MM-DD`. Anything else is a validation error naming the
    /// parameter, never a silent empty result.
    pub fn parse(parameter: &'static str, raw: &str) -> RecordResult<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("today") {
            return Ok(DateSpec::Today);
        }
        raw.parse::<NaiveDate>()
            .map(DateSpec::On)
            .map_err(|_| {
                ValidationError::InvalidDate {
                    parameter,
                    value: raw.to_string(),
                }
                .into()
            })
    }

    /// Resolves the calendar day this spec denotes.
    pub fn resolve(self) -> NaiveDate {
        match self {
            DateSpec::Today => Utc::now().date_naive(),
            DateSpec::On(date) => date,
        }
    }
}

/// One schedule row: the operation, its parent patient's identity snapshot
/// and the patient's age on the day of the query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Whole years of age at query time.
    pub age: u32,
    /// Patient snapshot and operation fields, flattened.
    #[serde(flatten)]
    pub row: FlatOperation,
}

impl ScheduleEntry {
    fn new(row: FlatOperation, on: NaiveDate) -> Self {
        Self {
            age: age_in_years(row.date_of_birth, on),
            row,
        }
    }
}

/// Whole years elapsed from `dob` to `on`: the year difference, decremented
/// when the month/day of `on` has not yet reached the birthday.
pub fn age_in_years(dob: NaiveDate, on: NaiveDate) -> u32 {
    let mut age = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Read-only schedule views over the operation rows of one store.
#[derive(Clone)]
pub struct ScheduleEngine {
    store: Arc<dyn PatientStore>,
}

impl ScheduleEngine {
    /// Creates an engine over the given store.
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    /// All operations scheduled on one calendar day, ascending.
    pub async fn by_date(&self, tenant: &TenantId, date: DateSpec) -> RecordResult<Vec<ScheduleEntry>> {
        let day = date.resolve();
        self.run(
            tenant,
            OperationQuery {
                window: Some(DateWindow::day(day)),
                statuses: None,
                sort: SortOrder::ScheduledDateAsc,
            },
        )
        .await
    }

    /// All operations scheduled between two calendar days inclusive,
    /// ascending. A range whose end precedes its start matches nothing.
    pub async fn by_date_range(
        &self,
        tenant: &TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RecordResult<Vec<ScheduleEntry>> {
        self.run(
            tenant,
            OperationQuery {
                window: Some(DateWindow::range(start, end)),
                statuses: None,
                sort: SortOrder::ScheduledDateAsc,
            },
        )
        .await
    }

    /// Worklist for one status. Terminal statuses read most-recent-first;
    /// the live statuses read soonest-first.
    pub async fn by_status(
        &self,
        tenant: &TenantId,
        status: OperationStatus,
    ) -> RecordResult<Vec<ScheduleEntry>> {
        let sort = if status.is_terminal() {
            SortOrder::ScheduledDateDesc
        } else {
            SortOrder::ScheduledDateAsc
        };
        self.run(
            tenant,
            OperationQuery {
                window: None,
                statuses: Some(vec![status]),
                sort,
            },
        )
        .await
    }

    /// The combined filter: optional day window and optional status set,
    /// ascending.
    pub async fn combined(
        &self,
        tenant: &TenantId,
        date: Option<DateSpec>,
        statuses: Option<Vec<OperationStatus>>,
    ) -> RecordResult<Vec<ScheduleEntry>> {
        self.run(
            tenant,
            OperationQuery {
                window: date.map(|d| DateWindow::day(d.resolve())),
                statuses,
                sort: SortOrder::ScheduledDateAsc,
            },
        )
        .await
    }

    /// Today's list proper: operations on the current UTC day that are
    /// still in `scheduled` state.
    pub async fn today_scheduled(&self, tenant: &TenantId) -> RecordResult<Vec<ScheduleEntry>> {
        self.run(
            tenant,
            OperationQuery {
                window: Some(DateWindow::day(Utc::now().date_naive())),
                statuses: Some(vec![OperationStatus::Scheduled]),
                sort: SortOrder::ScheduledDateAsc,
            },
        )
        .await
    }

    /// The pending worklist: everything still live (`scheduled` or
    /// `postponed`), regardless of date, soonest first.
    pub async fn pending(&self, tenant: &TenantId) -> RecordResult<Vec<ScheduleEntry>> {
        self.run(
            tenant,
            OperationQuery {
                window: None,
                statuses: Some(vec![OperationStatus::Scheduled, OperationStatus::Postponed]),
                sort: SortOrder::ScheduledDateAsc,
            },
        )
        .await
    }

    /// Completed operations, optionally bounded by a day range, most recent
    /// first.
    pub async fn completed(
        &self,
        tenant: &TenantId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> RecordResult<Vec<ScheduleEntry>> {
        let window = match (start, end) {
            (Some(s), Some(e)) => Some(DateWindow::range(s, e)),
            (Some(s), None) => Some(DateWindow {
                start: DateWindow::day(s).start,
                end: chrono::DateTime::<Utc>::MAX_UTC,
            }),
            (None, Some(e)) => Some(DateWindow {
                start: chrono::DateTime::<Utc>::MIN_UTC,
                end: DateWindow::day(e).end,
            }),
            (None, None) => None,
        };
        self.run(
            tenant,
            OperationQuery {
                window,
                statuses: Some(vec![OperationStatus::Completed]),
                sort: SortOrder::ScheduledDateDesc,
            },
        )
        .await
    }

    async fn run(&self, tenant: &TenantId, query: OperationQuery) -> RecordResult<Vec<ScheduleEntry>> {
        let today = Utc::now().date_naive();
        let rows = self.store.flatten_operations(tenant, &query).await?;
        tracing::debug!(tenant = %tenant, rows = rows.len(), "schedule query");
        Ok(rows.into_iter().map(|row| ScheduleEntry::new(row, today)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_decrements_before_the_birthday() {
        let dob: NaiveDate = "2000-03-10".parse().unwrap();
        assert_eq!(age_in_years(dob, "2025-03-09".parse().unwrap()), 24);
        assert_eq!(age_in_years(dob, "2025-03-10".parse().unwrap()), 25);
        assert_eq!(age_in_years(dob, "2025-03-11".parse().unwrap()), 25);
    }

    #[test]
    fn test_age_never_goes_negative() {
        let dob: NaiveDate = "2025-06-01".parse().unwrap();
        assert_eq!(age_in_years(dob, "2025-01-01".parse().unwrap()), 0);
    }

    #[test]
    fn test_date_spec_parses_today_and_iso_dates() {
        assert_eq!(DateSpec::parse("date", "today").unwrap(), DateSpec::Today);
        assert_eq!(DateSpec::parse("date", "TODAY").unwrap(), DateSpec::Today);
        assert_eq!(
            DateSpec::parse("date", "2025-04-05").unwrap(),
            DateSpec::On("2025-04-05".parse().unwrap())
        );
    }

    #[test]
    fn test_date_spec_rejects_garbage_naming_the_parameter() {
        let err = DateSpec::parse("startDate", "05/04/2025").unwrap_err();
        assert!(err.to_string().contains("startDate"));
        assert!(err.to_string().contains("05/04/2025"));
    }
}
