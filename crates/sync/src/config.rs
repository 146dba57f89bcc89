//! Configuration: remote platform access and per-surface catalog settings.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use galeria_catalog::EntityKind;

pub const ENV_SHOP_DOMAIN: &str = "GALERIA_SHOP_DOMAIN";
pub const ENV_API_VERSION: &str = "GALERIA_API_VERSION";
pub const ENV_ADMIN_TOKEN: &str = "GALERIA_ADMIN_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "GALERIA_TIMEOUT_SECS";

pub const DEFAULT_API_VERSION: &str = "2024-10";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Admin API access to the remote commerce platform.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// e.g. `galeria.myshopify.com`, without scheme.
    pub shop_domain: String,
    pub api_version: String,
    pub access_token: String,
    pub timeout: Duration,
}

impl core::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("shop_domain", &self.shop_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteConfig {
    pub fn new(shop_domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let shop_domain = required(ENV_SHOP_DOMAIN)?;
        if shop_domain.contains("://") {
            return Err(ConfigError::Invalid {
                key: ENV_SHOP_DOMAIN,
                reason: "expected a bare domain without scheme".to_string(),
            });
        }
        let access_token = required(ENV_ADMIN_TOKEN)?;

        let api_version = lookup(ENV_API_VERSION)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| {
                warn!(default = DEFAULT_API_VERSION, "{ENV_API_VERSION} not set; using default");
                DEFAULT_API_VERSION.to_string()
            });

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            None => DEFAULT_TIMEOUT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    key: ENV_TIMEOUT_SECS,
                    reason: e.to_string(),
                })?,
        };

        Ok(Self {
            shop_domain,
            api_version,
            access_token,
            timeout,
        })
    }

    /// GraphQL Admin endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shop_domain, self.api_version
        )
    }
}

/// Settings of one catalog surface (artworks or events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub kind: EntityKind,
    /// Currency attached to prices read from the platform.
    pub currency_code: String,
    /// Product type written on every create and update regardless of input.
    pub forced_product_type: Option<String>,
    /// Whether creates insert a local mirror record.
    pub mirror_enabled: bool,
}

impl CatalogSettings {
    pub fn products() -> Self {
        Self {
            kind: EntityKind::Product,
            currency_code: "MXN".to_string(),
            forced_product_type: None,
            mirror_enabled: false,
        }
    }

    pub fn events() -> Self {
        Self {
            kind: EntityKind::Event,
            currency_code: "MXN".to_string(),
            forced_product_type: Some("Evento".to_string()),
            mirror_enabled: true,
        }
    }

    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Product => Self::products(),
            EntityKind::Event => Self::events(),
        }
    }

    pub fn with_mirror(mut self, enabled: bool) -> Self {
        self.mirror_enabled = enabled;
        self
    }

    pub fn with_currency(mut self, currency_code: impl Into<String>) -> Self {
        self.currency_code = currency_code.into();
        self
    }
}
