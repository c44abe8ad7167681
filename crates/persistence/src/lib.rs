//! OTR Persistence Layer
//!
//! This crate is the storage collaborator for the operating-theatre record
//! core. It owns tenant identity, the [`PatientStore`] trait that every
//! backend implements, the store-level error taxonomy, and the fixed set of
//! filter/sort/aggregate shapes the core is allowed to ask for.
//!
//! # Tenant isolation
//!
//! Every method on [`PatientStore`] takes a [`TenantId`] as its first
//! argument - there is no way to touch a document without naming the tenant,
//! and a lookup that resolves to another tenant's document behaves as if the
//! document did not exist.
//!
//! # Atomicity
//!
//! A backend must make each trait call an atomic read-modify-write of one
//! patient document with respect to other writers of that document. Nothing
//! finer-grained is promised: concurrent edits of two different operations
//! inside one patient are last-writer-wins at the field level.
//!
//! # Backends
//!
//! The crate ships one backend, [`MemoryStore`], which keeps documents behind
//! a `parking_lot::RwLock` together with the store-wide operation-id index.
//! It is the reference implementation of the trait contract and the backend
//! the test suites run against.
//!
//! # Example
//!
//! ```
//! use otr_persistence::{MemoryStore, PatientStore, PatientSelector, TenantId};
//!
//! # async fn example(patient: otr_model::Patient) -> otr_persistence::StoreResult<()> {
//! let store = MemoryStore::new();
//! let tenant = TenantId::new("h1");
//! let stored = store.insert(&tenant, patient).await?;
//! let found = store
//!     .find_one(&tenant, &PatientSelector::AdmissionNo(stored.admission_no.clone()))
//!     .await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod error;
pub mod store;
pub mod tenant;
pub mod types;

pub use backends::MemoryStore;
pub use error::{StoreError, StoreResult};
pub use store::PatientStore;
pub use tenant::TenantId;
pub use types::{DateWindow, FlatOperation, OperationQuery, PatientSelector, SortOrder};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
