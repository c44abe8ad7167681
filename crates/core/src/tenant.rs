//! Tenant context resolution.
//!
//! Derives the active hospital tenant for a command from whatever the
//! transport extracted (typically an `X-Hospital-Id` header), falling back to
//! the configured default. Resolution is the only place a default is applied;
//! every downstream operation receives the resolved id explicitly and no
//! ambient tenant state exists.

use otr_persistence::TenantId;

use crate::config::CoreConfig;
use crate::error::ConfigurationError;

/// Resolves the tenant for each inbound command.
///
/// # Example
///
/// ```
/// use otr_core::TenantResolver;
/// use otr_persistence::TenantId;
///
/// let resolver = TenantResolver::new(Some(TenantId::new("h1")));
/// assert_eq!(resolver.resolve(Some("h2")).unwrap().as_str(), "h2");
/// assert_eq!(resolver.resolve(None).unwrap().as_str(), "h1");
///
/// let strict = TenantResolver::new(None);
/// assert!(strict.resolve(None).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TenantResolver {
    default: Option<TenantId>,
}

impl TenantResolver {
    /// Creates a resolver with an optional default tenant.
    pub fn new(default: Option<TenantId>) -> Self {
        Self { default }
    }

    /// Creates a resolver from the core configuration.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.default_tenant.clone())
    }

    /// Resolves the tenant for a command.
    ///
    /// A supplied identifier wins; a blank one counts as absent. With
    /// nothing supplied the configured default applies, and with no default
    /// either, resolution fails with
    /// [`ConfigurationError::NoTenantResolved`].
    pub fn resolve(&self, supplied: Option<&str>) -> Result<TenantId, ConfigurationError> {
        if let Some(id) = supplied.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(TenantId::new(id));
        }
        self.default
            .clone()
            .ok_or(ConfigurationError::NoTenantResolved)
    }
}
