//! Calendar-facing API surface.

pub mod calendar;

pub use calendar::{
    calendar_events, service_color, BookingForm, CalendarEvent, Opportunity, DEM_COLOR,
    NEWSLETTER_COLOR, PUSH_COLOR,
};
