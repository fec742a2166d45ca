//! Session and capacity-rule configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::admission::CapacityPolicy;

/// Fallback record-store timeout when none is configured.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Record-store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    Memory,
    /// CRM-backed store.
    Crm,
}

/// Root session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Record-store backend selection.
    pub backend: StoreBackendConfig,
    /// Timeout applied to each record-store call, in seconds.
    pub store_timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendConfig::Memory,
            store_timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
        }
    }
}

impl CalendarConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_timeout_secs == 0 {
            return Err("store_timeout_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse session configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, reading a `.env` file first.
    ///
    /// `CAMPAIGN_CAL_BACKEND` selects the backend (`memory` or `crm`) and
    /// `CAMPAIGN_CAL_TIMEOUT_SECS` overrides the store timeout; unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Ok(backend) = std::env::var("CAMPAIGN_CAL_BACKEND") {
            cfg.backend = match backend.as_str() {
                "memory" => StoreBackendConfig::Memory,
                "crm" => StoreBackendConfig::Crm,
                other => return Err(format!("unknown backend `{other}`")),
            };
        }
        if let Ok(timeout) = std::env::var("CAMPAIGN_CAL_TIMEOUT_SECS") {
            cfg.store_timeout_secs = timeout
                .parse()
                .map_err(|e| format!("invalid CAMPAIGN_CAL_TIMEOUT_SECS: {e}"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// The store timeout as a duration.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

/// Remotely tunable capacity rules document.
///
/// Stored as a JSON string in the `ConfigJSON` field of the first
/// `ConfigRules` record and fetched once at session start. Only the
/// newsletter brand cap is remotely tunable; the fixed per-service caps
/// never change at runtime. Unknown sections are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapacityRulesConfig {
    /// Rule sections keyed by service.
    #[serde(default)]
    pub rules: RuleSections,
}

/// Rule sections of the capacity document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSections {
    /// Newsletter-specific rules.
    #[serde(default)]
    pub newsletter: NewsletterRules,
}

/// Newsletter rule knobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterRules {
    /// Maximum distinct brands across the date's newsletters. Zero disables
    /// the cap.
    #[serde(rename = "maxBrands", default)]
    pub max_brands: u32,
}

impl CapacityRulesConfig {
    /// Parse a capacity rules document from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))
    }

    /// The capacity policy this document selects.
    #[must_use]
    pub fn into_policy(self) -> CapacityPolicy {
        CapacityPolicy::with_brand_cap(self.rules.newsletter.max_brands)
    }
}
