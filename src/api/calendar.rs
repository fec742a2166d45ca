//! Calendar-facing form and view models.
//!
//! The payloads a rendering layer exchanges with the session controller:
//! the edit-form submission going in, and calendar entries plus autocomplete
//! options coming out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::booking::{Booking, ServiceType, SlotStatus, Target};
use crate::core::record::RecordId;

/// Tile color for push slots.
pub const PUSH_COLOR: &str = "#3082B7";
/// Tile color for newsletter slots.
pub const NEWSLETTER_COLOR: &str = "#60CFE1";
/// Tile color for direct-email slots.
pub const DEM_COLOR: &str = "#E50F00";

/// The color a calendar tile renders for a service type.
#[must_use]
pub const fn service_color(service_type: ServiceType) -> &'static str {
    match service_type {
        ServiceType::Newsletter => NEWSLETTER_COLOR,
        ServiceType::Dem => DEM_COLOR,
        ServiceType::Push => PUSH_COLOR,
    }
}

/// Booking form payload submitted from the edit dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingForm {
    /// Service occupying the slot.
    pub service_type: ServiceType,
    /// Calendar date of the slot.
    pub date: NaiveDate,
    /// Audience targeting.
    pub target: Target,
    /// Deal backing the booking, if any.
    pub opportunity_id: Option<RecordId>,
}

impl BookingForm {
    /// The booking this form persists.
    ///
    /// Submitting always books the slot; editing an available placeholder
    /// converts it.
    #[must_use]
    pub fn into_booking(self, id: Option<RecordId>) -> Booking {
        Booking {
            id,
            service_type: self.service_type,
            date: self.date,
            target: self.target,
            status: SlotStatus::Booked,
            opportunity_id: self.opportunity_id,
        }
    }
}

/// One render-ready calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Backing record id.
    pub id: RecordId,
    /// Tile label, the service-type name.
    pub title: String,
    /// Day the tile occupies.
    pub date: NaiveDate,
    /// Whether the tile spans the whole day. Slots always do.
    pub all_day: bool,
    /// Tile color, keyed by service type.
    pub color: &'static str,
    /// Audience targeting shown in the tile detail.
    pub target: Target,
    /// Whether the slot is already booked.
    pub status: SlotStatus,
}

/// A deal offered by the booking form's autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Backing record id.
    pub id: RecordId,
    /// Display label.
    pub label: String,
}

/// Build calendar entries from the session's bookings.
///
/// Entries come out date-ordered with ties broken by service name and id, so
/// equal snapshots render identically. A booking that has not yet been
/// assigned even a local id carries nothing to click on and is skipped.
#[must_use]
pub fn calendar_events(bookings: &[Booking]) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = bookings
        .iter()
        .filter_map(|booking| {
            let id = booking.id.clone()?;
            Some(CalendarEvent {
                id,
                title: booking.service_type.as_str().to_owned(),
                date: booking.date,
                all_day: true,
                color: service_color(booking.service_type),
                target: booking.target,
                status: booking.status,
            })
        })
        .collect();
    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
    events
}
