//! Core booking domain: records, admission checks, and the session lifecycle.

pub mod error;
pub mod record;
pub mod booking;
pub mod admission;
pub mod slot_store;
pub mod controller;

pub use error::{AppResult, BookingError};
pub use record::{Criteria, Entity, Record, RecordId, RecordStore, Relation};
pub use booking::{Booking, ResolvedBooking, ServiceType, SlotStatus, Target};
pub use admission::{evaluate, CapacityPolicy, Decision, RejectReason};
pub use slot_store::SlotStore;
pub use controller::{BookingController, EditContext, EditorState, SubmitOutcome};
