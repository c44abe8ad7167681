//! OTR Record Core
//!
//! The application core of the operating-theatre record system: patient and
//! operation lifecycle, the status state machine, the clinical sub-record
//! editors, and the schedule query engine. The core is transport-agnostic -
//! an HTTP layer (or any other host) resolves the tenant and principal and
//! calls in; storage is behind the [`PatientStore`] trait from
//! `otr_persistence`.
//!
//! # Services
//!
//! * [`RecordService`] - patient/operation CRUD, status transitions, and the
//!   clinical sub-record editors.
//! * [`ScheduleEngine`] - read-only day lists, worklists and the combined
//!   schedule filter.
//! * [`TenantResolver`] - derives the active tenant for each command.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use otr_core::{CoreConfig, RecordService, ScheduleEngine, TenantResolver};
//! use otr_persistence::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let records = RecordService::new(store.clone());
//! let schedule = ScheduleEngine::new(store);
//! let tenants = TenantResolver::from_config(&CoreConfig::from_env());
//! # let _ = (records, schedule, tenants);
//! ```
//!
//! [`PatientStore`]: otr_persistence::PatientStore

#![warn(missing_docs)]

pub mod clinical;
pub mod config;
pub mod error;
pub mod merge;
pub mod principal;
pub mod records;
pub mod schedule;
pub mod status;
pub mod tenant;

pub use clinical::IntraOpCollections;
pub use config::CoreConfig;
pub use error::{
    ConfigurationError, ConflictError, NotFoundError, RecordError, RecordResult, ValidationError,
};
pub use principal::{AllowAll, Principal, TransitionGate};
pub use records::{NewOperation, NewPatient, OperationPatch, PatientPatch, RecordService};
pub use schedule::{age_in_years, DateSpec, ScheduleEngine, ScheduleEntry};
pub use status::{plan_transition, TransitionPlan, TransitionRequest};
pub use tenant::TenantResolver;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
