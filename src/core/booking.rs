//! Booking domain model and its record-field mapping.
//!
//! A [`Booking`] is one calendar slot. Records travel to and from the store
//! as raw field objects (`Service_Type`, `Date`, `Status`, `Target`,
//! `Opportunity`); the mapping lives here so neither the store backends nor
//! the admission engine ever handle loose JSON.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::BookingError;
use crate::core::record::{Record, RecordId};

/// Delivery channel of a campaign slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// Sponsored newsletter dispatch; may carry multiple brands.
    Newsletter,
    /// Direct e-mail marketing dispatch.
    #[serde(rename = "DEM")]
    Dem,
    /// Push-notification dispatch, capped independently of the other channels.
    Push,
}

impl ServiceType {
    /// Channel name as records and calendar titles spell it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newsletter => "Newsletter",
            Self::Dem => "DEM",
            Self::Push => "Push",
        }
    }

    /// Whether this channel is exempt from the general per-date cap.
    pub const fn is_push(self) -> bool {
        matches!(self, Self::Push)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience targeting of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Full national audience.
    National,
    /// Custom audience segment.
    Custom,
}

impl Target {
    /// Target name as records spell it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::National => "National",
            Self::Custom => "Custom",
        }
    }
}

/// Reservation state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    /// Placeholder slot with no real reservation; never consumes capacity.
    Available,
    /// Confirmed reservation; counts toward every applicable cap.
    Booked,
}

impl SlotStatus {
    /// Status name as records spell it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Booked => "Booked",
        }
    }
}

/// One calendar slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Store identifier; `None` until first persisted.
    pub id: Option<RecordId>,
    /// Delivery channel.
    pub service_type: ServiceType,
    /// Calendar date, day granularity.
    pub date: NaiveDate,
    /// Audience targeting.
    pub target: Target,
    /// Reservation state.
    pub status: SlotStatus,
    /// Linked sales opportunity, carried through but never interpreted.
    pub opportunity_id: Option<RecordId>,
}

/// Serde image of the booking field contract, parse direction only.
#[derive(Debug, Deserialize)]
struct BookingFields {
    #[serde(rename = "Service_Type")]
    service_type: ServiceType,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Status")]
    status: SlotStatus,
    #[serde(rename = "Target")]
    target: Target,
    #[serde(rename = "Opportunity", default)]
    opportunity: Option<RecordId>,
}

impl Booking {
    /// Record field holding the calendar date; search criteria key on it.
    pub const DATE_FIELD: &'static str = "Date";

    /// Map a raw store record into a booking.
    pub fn from_record(record: &Record) -> Result<Self, BookingError> {
        let fields: BookingFields =
            serde_json::from_value(Value::Object(record.fields.clone()))
                .map_err(|e| BookingError::Record(format!("booking {}: {e}", record.id)))?;
        Ok(Self {
            id: Some(record.id.clone()),
            service_type: fields.service_type,
            date: fields.date,
            target: fields.target,
            status: fields.status,
            opportunity_id: fields.opportunity,
        })
    }

    /// Field object for persisting this booking. The id travels separately.
    ///
    /// Dates serialize as `%Y-%m-%d`; date-keyed lookups depend on exact
    /// equality of that representation.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            "Service_Type".into(),
            Value::String(self.service_type.as_str().into()),
        );
        fields.insert(Self::DATE_FIELD.into(), Value::String(self.date.to_string()));
        fields.insert("Status".into(), Value::String(self.status.as_str().into()));
        fields.insert("Target".into(), Value::String(self.target.as_str().into()));
        if let Some(opportunity) = &self.opportunity_id {
            fields.insert(
                "Opportunity".into(),
                Value::String(opportunity.as_str().into()),
            );
        }
        fields
    }

    /// Whether this booking consumes capacity at all.
    pub fn is_booked(&self) -> bool {
        self.status == SlotStatus::Booked
    }
}

/// A booking with its related brand records already counted.
///
/// The admission engine is synchronous and pure, so whoever assembles the
/// per-date set resolves brand counts up front. A booking whose relation was
/// never resolved counts as a single brand.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBooking {
    /// The booking as stored.
    pub booking: Booking,
    /// Count of related brand records; meaningful only for Newsletter.
    pub brand_count: u32,
}

impl ResolvedBooking {
    /// Pair a booking with a resolved brand count.
    pub const fn new(booking: Booking, brand_count: u32) -> Self {
        Self {
            booking,
            brand_count,
        }
    }

    /// A booking with no resolved brand relation; contributes one brand.
    pub const fn with_default_brands(booking: Booking) -> Self {
        Self::new(booking, 1)
    }
}
