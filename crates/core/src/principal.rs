//! The authenticated principal and the pluggable transition gate.
//!
//! Credential verification belongs to the auth collaborator; the core only
//! sees its output. The one place the core consults authorization is before
//! a status transition, through [`TransitionGate`] - the core calls the
//! check but defines no policy of its own.

use std::fmt;

use otr_model::OperationStatus;

use crate::error::RecordResult;

/// The authenticated caller, as produced by the auth collaborator.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Stable user identifier.
    pub id: String,
    /// Role name (e.g. "surgeon", "admin"). Opaque to the core.
    pub role: String,
    /// Tenant the credential was issued for, if any. The core trusts the
    /// resolved tenant, not this hint; it exists for gate policies that want
    /// to cross-check.
    pub tenant_hint: Option<String>,
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.id, self.role)
    }
}

/// Authorization check invoked before every status transition.
///
/// Implementations decide which principals may request which target states
/// (a deployment will typically restrict `cancelled` and `completed`) and
/// pick their own failure value. The default, [`AllowAll`], permits
/// everything.
pub trait TransitionGate: Send + Sync {
    /// Returns `Ok(())` if the principal may request the target status.
    fn authorize(&self, principal: &Principal, target: OperationStatus) -> RecordResult<()>;
}

/// The permissive default gate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl TransitionGate for AllowAll {
    fn authorize(&self, _principal: &Principal, _target: OperationStatus) -> RecordResult<()> {
        Ok(())
    }
}
