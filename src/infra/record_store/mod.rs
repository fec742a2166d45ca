//! Record-store backends.

pub mod crm;
pub mod memory;

pub use crm::{CrmRecord, CrmRecordStore, CrmRequest, CrmResponse, CrmTransport};
pub use memory::MemoryRecordStore;
