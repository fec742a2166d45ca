//! Session controller driving the booking edit lifecycle.
//!
//! One controller per operator session. It owns the in-session [`SlotStore`],
//! the capacity policy loaded at startup, and the edit state machine, and it
//! forwards accepted mutations to the [`RecordStore`].
//!
//! The admission check runs against the freshest snapshot the store can give:
//! the target date is re-queried immediately before every evaluation. Two
//! operators in independent sessions can still interleave between check and
//! write; no cross-session lock exists.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;

use crate::api::calendar::{calendar_events, BookingForm, CalendarEvent, Opportunity};
use crate::config::rules::{CalendarConfig, CapacityRulesConfig};
use crate::core::admission::{evaluate, CapacityPolicy, Decision, RejectReason};
use crate::core::booking::{Booking, ResolvedBooking, ServiceType};
use crate::core::error::BookingError;
use crate::core::record::{Criteria, Entity, RecordId, RecordStore, Relation};
use crate::core::slot_store::SlotStore;

/// Context of the open edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditContext {
    /// Persisted id when editing an existing booking, `None` for a new one.
    pub booking_id: Option<RecordId>,
    /// Date the dialog was opened on.
    pub date: NaiveDate,
    /// Rejection from the last submission, kept while the dialog stays open.
    pub rejection: Option<RejectReason>,
}

/// Lifecycle state of the booking editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    /// No edit in progress.
    Idle,
    /// The edit dialog is open.
    Editing(EditContext),
    /// A submission is being checked against the freshest snapshot.
    Validating,
    /// A deletion is in flight.
    Deleting,
}

/// Outcome of a form submission.
///
/// A rejection is a normal outcome, not an error: the dialog stays open with
/// the reason recorded on the edit context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The booking was admitted and persisted under this id.
    Accepted(RecordId),
    /// The admission check refused the booking.
    Rejected(RejectReason),
}

/// Session controller: a single logical actor owning one operator's calendar.
pub struct BookingController<R> {
    store: R,
    slots: SlotStore,
    policy: CapacityPolicy,
    opportunities: Vec<Opportunity>,
    store_timeout: Duration,
    state: EditorState,
}

impl<R: RecordStore> BookingController<R> {
    /// Load a session from the record store.
    ///
    /// Slots are loaded first and must succeed. The capacity policy and the
    /// opportunity list degrade gracefully: a session with no reachable rules
    /// admits without caps, and a missing deal list leaves the form's
    /// autocomplete empty. Both degradations are logged.
    pub async fn start(store: R, config: &CalendarConfig) -> Result<Self, BookingError> {
        let mut controller = Self {
            store,
            slots: SlotStore::new(),
            policy: CapacityPolicy::unrestricted(),
            opportunities: Vec::new(),
            store_timeout: config.store_timeout(),
            state: EditorState::Idle,
        };
        controller.refresh().await?;
        controller.policy = controller.load_policy().await;
        controller.opportunities = controller.load_opportunities().await;
        tracing::info!(
            "session ready: {} slots, {} opportunities",
            controller.slots.len(),
            controller.opportunities.len()
        );
        Ok(controller)
    }

    /// Open the edit dialog for a new booking on `date`.
    ///
    /// Selecting a date while another dialog is open re-seeds the context;
    /// the session is single-operator, so nothing is lost but unsaved input.
    pub fn open_new(&mut self, date: NaiveDate) {
        tracing::debug!("editing new booking on {}", date);
        self.state = EditorState::Editing(EditContext {
            booking_id: None,
            date,
            rejection: None,
        });
    }

    /// Open the edit dialog for the existing booking with `id`.
    pub fn open_existing(&mut self, id: &RecordId) -> Result<(), BookingError> {
        let booking = self
            .slots
            .get(id)
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
        tracing::debug!("editing booking {}", id);
        self.state = EditorState::Editing(EditContext {
            booking_id: Some(id.clone()),
            date: booking.date,
            rejection: None,
        });
        Ok(())
    }

    /// Close the dialog without submitting.
    pub fn close(&mut self) {
        self.state = EditorState::Idle;
    }

    /// Submit the edit form.
    ///
    /// Re-queries the store for the form's date, resolves brand counts, and
    /// runs the admission check. On acceptance the booking is applied
    /// locally, written through, and the session realigned with the store;
    /// the dialog closes. On rejection the dialog stays open with the reason
    /// recorded. A collaborator failure aborts the submission with the dialog
    /// still open and no local mutation left behind.
    pub async fn submit(&mut self, form: BookingForm) -> Result<SubmitOutcome, BookingError> {
        let EditorState::Editing(context) = &self.state else {
            return Err(BookingError::NoActiveEdit);
        };
        let context = context.clone();
        self.state = EditorState::Validating;

        let candidate = form.into_booking(context.booking_id.clone());
        let decision = match self.admit(&candidate).await {
            Ok(decision) => decision,
            Err(e) => {
                self.state = EditorState::Editing(context);
                return Err(e);
            }
        };

        if let Decision::Rejected(reason) = decision {
            tracing::warn!("booking rejected for {}: {}", candidate.date, reason);
            self.state = EditorState::Editing(EditContext {
                rejection: Some(reason),
                ..context
            });
            return Ok(SubmitOutcome::Rejected(reason));
        }

        match self.persist(candidate).await {
            Ok(id) => {
                self.state = EditorState::Idle;
                Ok(SubmitOutcome::Accepted(id))
            }
            Err(e) => {
                self.state = EditorState::Editing(context);
                Err(e)
            }
        }
    }

    /// Delete the booking being edited.
    ///
    /// No admission check applies. The store is asked first; the local
    /// collection follows only once the store has confirmed. Deleting a
    /// booking that was never persisted is refused.
    pub async fn delete(&mut self) -> Result<(), BookingError> {
        let EditorState::Editing(context) = &self.state else {
            return Err(BookingError::NoActiveEdit);
        };
        let context = context.clone();
        let Some(id) = context.booking_id.clone() else {
            return Err(BookingError::NoSelection);
        };
        self.state = EditorState::Deleting;

        match self
            .with_timeout(self.store.delete(Entity::Bookings, &id))
            .await
        {
            Ok(()) => {
                self.slots.remove(&id);
                tracing::info!("booking {} deleted", id);
                self.realign().await;
                self.state = EditorState::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = EditorState::Editing(context);
                Err(e)
            }
        }
    }

    /// Realign the session's slot collection with the record store.
    pub async fn refresh(&mut self) -> Result<(), BookingError> {
        let records = self
            .with_timeout(self.store.list_all(Entity::Bookings))
            .await?;
        let bookings = records
            .iter()
            .map(Booking::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        self.slots.replace_all(bookings);
        Ok(())
    }

    /// Render-ready calendar entries for every known slot.
    #[must_use]
    pub fn events(&self) -> Vec<CalendarEvent> {
        calendar_events(&self.slots.list_all())
    }

    /// Every booking the session currently knows.
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.slots.list_all()
    }

    /// Deals offered by the booking form's autocomplete.
    #[must_use]
    pub fn opportunities(&self) -> &[Opportunity] {
        &self.opportunities
    }

    /// The capacity policy in force for this session.
    #[must_use]
    pub const fn policy(&self) -> &CapacityPolicy {
        &self.policy
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    /// Check the candidate against the freshest snapshot of its date.
    async fn admit(&self, candidate: &Booking) -> Result<Decision, BookingError> {
        let existing = self.resolve_date(candidate.date).await?;
        Ok(evaluate(candidate, &existing, &self.policy))
    }

    /// Fetch the bookings on `date` and resolve their brand counts.
    ///
    /// Related brand records are fetched only when the brand cap is enabled;
    /// everything else gets the default count of one.
    async fn resolve_date(&self, date: NaiveDate) -> Result<Vec<ResolvedBooking>, BookingError> {
        let criteria = Criteria::equals(Booking::DATE_FIELD, date.to_string());
        let records = self
            .with_timeout(self.store.search(Entity::Bookings, &criteria))
            .await?;

        let count_brands = self.policy.max_brands_per_newsletter_date.is_some();
        let mut resolved = Vec::with_capacity(records.len());
        for record in &records {
            let booking = Booking::from_record(record)?;
            let entry = if count_brands
                && booking.is_booked()
                && booking.service_type == ServiceType::Newsletter
            {
                let brands = self
                    .with_timeout(self.store.list_related(
                        Entity::Bookings,
                        &record.id,
                        Relation::Brands,
                    ))
                    .await?;
                // An empty brand list still represents the slot's own brand
                let count = u32::try_from(brands.len().max(1)).unwrap_or(u32::MAX);
                ResolvedBooking::new(booking, count)
            } else {
                ResolvedBooking::with_default_brands(booking)
            };
            resolved.push(entry);
        }
        Ok(resolved)
    }

    /// Optimistically apply the booking locally, then write it through.
    ///
    /// A failed write rolls the local mutation back to the exact prior entity
    /// and still attempts a realignment, in case the store applied the write
    /// before failing to answer.
    async fn persist(&mut self, booking: Booking) -> Result<RecordId, BookingError> {
        let fields = booking.to_fields();
        let had_id = booking.id.is_some();
        let (local_id, previous) = self.slots.upsert(booking);

        let written = if had_id {
            self.with_timeout(self.store.update(Entity::Bookings, &local_id, fields))
                .await
                .map(|()| local_id.clone())
        } else {
            self.with_timeout(self.store.insert(Entity::Bookings, fields))
                .await
                .map(|record| record.id)
        };

        match written {
            Ok(id) => {
                tracing::info!("booking {} written", id);
                self.realign().await;
                Ok(id)
            }
            Err(e) => {
                tracing::error!("booking write failed, rolling back: {}", e);
                match previous {
                    Some(prior) => {
                        self.slots.upsert(prior);
                    }
                    None => {
                        self.slots.remove(&local_id);
                    }
                }
                self.realign().await;
                Err(e)
            }
        }
    }

    /// Best-effort refresh after a write. The write itself already succeeded
    /// or was rolled back; a stale local view is not worth failing over.
    async fn realign(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("refresh after write failed, keeping local state: {}", e);
        }
    }

    async fn load_policy(&self) -> CapacityPolicy {
        match self.fetch_policy().await {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!("capacity rules unavailable, admitting without caps: {}", e);
                CapacityPolicy::unrestricted()
            }
        }
    }

    async fn fetch_policy(&self) -> Result<CapacityPolicy, BookingError> {
        let records = self
            .with_timeout(self.store.list_all(Entity::ConfigRules))
            .await?;
        let record = records
            .first()
            .ok_or_else(|| BookingError::Config("no ConfigRules record".into()))?;
        let document = record.field_str("ConfigJSON").ok_or_else(|| {
            BookingError::Config("ConfigRules record has no ConfigJSON field".into())
        })?;
        CapacityRulesConfig::from_json_str(document)
            .map(CapacityRulesConfig::into_policy)
            .map_err(BookingError::Config)
    }

    async fn load_opportunities(&self) -> Vec<Opportunity> {
        match self.fetch_opportunities().await {
            Ok(deals) => deals,
            Err(e) => {
                tracing::warn!("opportunity list unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_opportunities(&self) -> Result<Vec<Opportunity>, BookingError> {
        let records = self.with_timeout(self.store.list_all(Entity::Deals)).await?;
        Ok(records
            .iter()
            .filter_map(|record| {
                let label = record.field_str("Name")?;
                Some(Opportunity {
                    id: record.id.clone(),
                    label: label.to_owned(),
                })
            })
            .collect())
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, BookingError>>,
    ) -> Result<T, BookingError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BookingError::Timeout(self.store_timeout)),
        }
    }
}
