//! Core configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTR_DEFAULT_TENANT` | unset | Tenant used when a request supplies none |
//!
//! There is deliberately no built-in fallback tenant: a deployment that
//! wants one sets it explicitly, and a deployment that does not will see
//! every tenant-less request fail with a configuration error.

use otr_persistence::TenantId;

/// Configuration for the record core.
///
/// # Example
///
/// ```
/// use otr_core::CoreConfig;
/// use otr_persistence::TenantId;
///
/// // From the environment
/// let config = CoreConfig::from_env();
///
/// // Or programmatically
/// let config = CoreConfig {
///     default_tenant: Some(TenantId::new("h1")),
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    /// Tenant substituted when a request carries no tenant identifier.
    pub default_tenant: Option<TenantId>,
}

impl CoreConfig {
    /// Builds the configuration from environment variables.
    ///
    /// An unset or empty `OTR_DEFAULT_TENANT` leaves `default_tenant` as
    /// `None`.
    pub fn from_env() -> Self {
        let default_tenant = std::env::var("OTR_DEFAULT_TENANT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(TenantId::new);
        Self { default_tenant }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_tenant() {
        let config = CoreConfig::default();
        assert!(config.default_tenant.is_none());
    }
}
