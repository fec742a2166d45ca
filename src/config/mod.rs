//! Configuration models for the session, backends, and capacity rules.

pub mod rules;

pub use rules::{
    CalendarConfig, CapacityRulesConfig, NewsletterRules, RuleSections, StoreBackendConfig,
    DEFAULT_STORE_TIMEOUT_SECS,
};
