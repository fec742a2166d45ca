//! # Campaign Calendar
//!
//! A booking admission engine and session controller for marketing-campaign
//! delivery calendars.
//!
//! Operators book delivery slots for newsletter, direct-email, and push
//! campaigns on calendar dates. Capacity per date is scarce and the system of
//! record is remote, so every submission passes an admission check against
//! the freshest bookings for its date before anything is written.
//!
//! ## Core Problem Solved
//!
//! Calendar booking against a remote system of record has failure modes a
//! plain CRUD layer ignores:
//!
//! - **Scarce capacity**: a date holds at most two non-push bookings and two
//!   pushes, and newsletters can carry a shared brand budget
//! - **Stale views**: the session's calendar may lag the store, so admission
//!   must re-query the target date at the moment of submission
//! - **Unreliable writes**: a write can fail or time out after the local
//!   calendar already shows the booking, and the session must roll back
//! - **Swappable backends**: development runs against an in-memory store,
//!   production against a CRM, selected by configuration and never by
//!   runtime detection
//!
//! ## Key Features
//!
//! - **Pure admission engine**: [`core::evaluate`] applies the capacity
//!   rules in order and reports the first breach as a specific,
//!   operator-facing reason
//! - **Explicit edit lifecycle**: [`core::BookingController`] walks
//!   `Idle -> Editing -> Validating` and back, with deletion bypassing
//!   admission entirely
//! - **Optimistic writes with rollback**: accepted bookings land locally
//!   first, then in the store; the session realigns from the store after
//!   every write
//! - **Degrading startup**: an unreachable rules document admits without
//!   caps (logged), and a missing deal list only empties the autocomplete
//!
//! ## Booking a slot
//!
//! ```rust,ignore
//! use campaign_calendar::api::BookingForm;
//! use campaign_calendar::builders::build_memory_controller;
//! use campaign_calendar::config::CalendarConfig;
//! use campaign_calendar::core::SubmitOutcome;
//!
//! let mut session = build_memory_controller(&CalendarConfig::default()).await?;
//! session.open_new("2024-07-01".parse()?);
//! match session.submit(form).await? {
//!     SubmitOutcome::Accepted(id) => println!("booked {id}"),
//!     SubmitOutcome::Rejected(reason) => println!("refused: {reason}"),
//! }
//! ```
//!
//! ## Known Limitation
//!
//! Admission is check-then-act. Two operators in independent sessions can
//! both pass the check for the last slot on a date before either write
//! lands; the store accepts both and each session sees the overbooking on
//! its next refresh. There is no cross-session lock.
//!
//! For complete examples, see:
//! - `tests/booking_lifecycle_test.rs` - Full session integration tests
//! - `tests/admission_algorithm_test.rs` - Capacity rule scenarios

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core booking domain: records, admission checks, and the session lifecycle.
pub mod core;
/// Configuration models for the session, backends, and capacity rules.
pub mod config;
/// Builders to construct booking sessions from configuration.
pub mod builders;
/// Infrastructure adapters for record-store backends.
pub mod infra;
/// Calendar-facing API surface.
pub mod api;
/// Shared utilities.
pub mod util;
