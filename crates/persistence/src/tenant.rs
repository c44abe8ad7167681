//! Tenant identifier type.
//!
//! A tenant is one hospital instance; every document is partitioned by this
//! identifier and no cross-tenant visibility exists anywhere in the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque hospital/tenant identifier.
///
/// The store never interprets the contents; it only compares them. The type
/// exists so that a tenant id cannot be confused with any of the other
/// strings (admission numbers, operation ids) flowing through the API.
///
/// # Examples
///
/// ```
/// use otr_persistence::TenantId;
///
/// let tenant = TenantId::new("h1");
/// assert_eq!(tenant.as_str(), "h1");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new tenant ID from the given string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TenantId::new(s))
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        TenantId::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        let tenant = TenantId::new("h1");
        assert_eq!(tenant.as_str(), "h1");
    }

    #[test]
    fn test_display_and_debug() {
        let tenant = TenantId::new("h1");
        assert_eq!(tenant.to_string(), "h1");
        assert_eq!(format!("{:?}", tenant), "TenantId(h1)");
    }

    #[test]
    fn test_serde_is_transparent() {
        let tenant = TenantId::new("h1");
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "\"h1\"");

        let parsed: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tenant);
    }

    #[test]
    fn test_from_string() {
        let tenant: TenantId = "h1".into();
        assert_eq!(tenant.as_str(), "h1");

        let tenant2: TenantId = String::from("h2").into();
        assert_eq!(tenant2.as_str(), "h2");
    }
}
