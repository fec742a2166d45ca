//! Builders to construct booking sessions from configuration.

use crate::config::{CalendarConfig, StoreBackendConfig};
use crate::core::{BookingController, BookingError, RecordStore};
use crate::infra::record_store::{CrmRecordStore, CrmTransport, MemoryRecordStore};

/// Build a booking session from configuration using the provided store factory.
///
/// The factory receives the validated configuration and returns the record
/// store matching its backend selection; the controller then loads the
/// session from that store.
pub async fn build_controller<R, F>(
    cfg: &CalendarConfig,
    store_factory: F,
) -> Result<BookingController<R>, BookingError>
where
    R: RecordStore,
    F: FnOnce(&CalendarConfig) -> Result<R, BookingError>,
{
    cfg.validate()
        .map_err(|e| BookingError::Config(format!("config invalid: {e}")))?;
    let store = store_factory(cfg)?;
    BookingController::start(store, cfg).await
}

/// Build a session on the in-memory backend.
pub async fn build_memory_controller(
    cfg: &CalendarConfig,
) -> Result<BookingController<MemoryRecordStore>, BookingError> {
    build_controller(cfg, |cfg| match cfg.backend {
        StoreBackendConfig::Memory => Ok(MemoryRecordStore::new()),
        StoreBackendConfig::Crm => Err(BookingError::Config(
            "config selects the crm backend".into(),
        )),
    })
    .await
}

/// Build a session on the CRM backend over the given transport.
pub async fn build_crm_controller<T: CrmTransport>(
    cfg: &CalendarConfig,
    transport: T,
) -> Result<BookingController<CrmRecordStore<T>>, BookingError> {
    build_controller(cfg, move |cfg| match cfg.backend {
        StoreBackendConfig::Crm => Ok(CrmRecordStore::new(transport)),
        StoreBackendConfig::Memory => Err(BookingError::Config(
            "config selects the memory backend".into(),
        )),
    })
    .await
}
