//! Infrastructure adapters for record-store backends.

pub mod record_store;

pub use record_store::{CrmRecordStore, CrmTransport, MemoryRecordStore};
