//! In-session booking collection.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::core::booking::Booking;
use crate::core::record::RecordId;

/// The session's authoritative set of bookings.
///
/// A plain keyed collection: no validation happens here, every capacity rule
/// lives in the admission engine. Populated from the record store at startup,
/// then realigned after each successful write. The store reflects only what
/// this session has fetched or written; concurrent writers in other sessions
/// are not reconciled.
#[derive(Debug, Default)]
pub struct SlotStore {
    bookings: HashMap<RecordId, Booking>,
}

impl SlotStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known booking, in no particular order.
    pub fn list_all(&self) -> Vec<Booking> {
        self.bookings.values().cloned().collect()
    }

    /// The bookings on one calendar date.
    pub fn list_by_date(&self, date: NaiveDate) -> Vec<Booking> {
        self.bookings
            .values()
            .filter(|booking| booking.date == date)
            .cloned()
            .collect()
    }

    /// The booking with the given id, if known.
    pub fn get(&self, id: &RecordId) -> Option<&Booking> {
        self.bookings.get(id)
    }

    /// Insert or replace a booking, keyed by id.
    ///
    /// A booking carrying no id gets a locally minted placeholder until the
    /// next refresh realigns the collection with the record store. Returns
    /// the effective id together with the entity it replaced, if any, so a
    /// failed remote write can be rolled back precisely.
    pub fn upsert(&mut self, mut booking: Booking) -> (RecordId, Option<Booking>) {
        let id = booking.id.clone().unwrap_or_else(RecordId::mint);
        booking.id = Some(id.clone());
        let previous = self.bookings.insert(id.clone(), booking);
        (id, previous)
    }

    /// Remove a booking; `None` signals the id was unknown.
    pub fn remove(&mut self, id: &RecordId) -> Option<Booking> {
        self.bookings.remove(id)
    }

    /// Replace the whole collection with a fresh snapshot.
    pub fn replace_all(&mut self, bookings: Vec<Booking>) {
        self.bookings.clear();
        for booking in bookings {
            self.upsert(booking);
        }
    }

    /// Number of known bookings.
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Whether the session knows no bookings at all.
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}
