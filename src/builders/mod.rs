//! Builders to construct booking sessions from configuration.

pub mod controller_builder;

pub use controller_builder::{build_controller, build_crm_controller, build_memory_controller};
