//! Backend implementations of [`PatientStore`].
//!
//! [`PatientStore`]: crate::PatientStore

mod memory;

pub use memory::MemoryStore;
