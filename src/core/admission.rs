//! The admission engine: pure capacity checks for candidate bookings.
//!
//! [`evaluate`] is a plain function over values, with no I/O and no shared
//! state, so every capacity rule is testable in isolation. The
//! controller owns all asynchrony: it assembles the per-date
//! [`ResolvedBooking`] set (brand counts included) before calling in.

use thiserror::Error;

use crate::core::booking::{Booking, ResolvedBooking, ServiceType};

/// Capacity limits applied to one calendar date.
///
/// `None` disables the corresponding cap. Loaded once per session and
/// read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityPolicy {
    /// Cap on `Booked` Newsletter+DEM bookings per date.
    pub max_non_push_per_date: Option<u32>,
    /// Cap on `Booked` Push bookings per date.
    pub max_push_per_date: Option<u32>,
    /// Cap on the summed brand counts of a date's Newsletter bookings.
    pub max_brands_per_newsletter_date: Option<u32>,
}

impl CapacityPolicy {
    /// Product default for the combined Newsletter+DEM cap.
    pub const DEFAULT_NON_PUSH_CAP: u32 = 2;
    /// Product default for the Push cap.
    pub const DEFAULT_PUSH_CAP: u32 = 2;

    /// A policy with every cap disabled.
    ///
    /// This is the explicit fallback when no configuration could be loaded:
    /// the session admits everything rather than freezing all bookings on a
    /// config outage.
    pub const fn unrestricted() -> Self {
        Self {
            max_non_push_per_date: None,
            max_push_per_date: None,
            max_brands_per_newsletter_date: None,
        }
    }

    /// The default caps plus a brand cap; `0` leaves the brand cap disabled.
    pub fn with_brand_cap(max_brands: u32) -> Self {
        Self {
            max_brands_per_newsletter_date: (max_brands > 0).then_some(max_brands),
            ..Self::default()
        }
    }
}

impl Default for CapacityPolicy {
    /// The shipped limits: two non-push bookings and two pushes per date, no
    /// brand cap until configuration supplies one.
    fn default() -> Self {
        Self {
            max_non_push_per_date: Some(Self::DEFAULT_NON_PUSH_CAP),
            max_push_per_date: Some(Self::DEFAULT_PUSH_CAP),
            max_brands_per_newsletter_date: None,
        }
    }
}

/// Why a candidate was turned away. Operator-facing via `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The combined Newsletter+DEM cap for the date is already met.
    #[error("max non-push bookings reached for this date")]
    NonPushCapReached,
    /// The summed Newsletter brand cap for the date is already met.
    #[error("max brands reached for this date")]
    BrandCapReached,
    /// The Push cap for the date is already met.
    #[error("max pushes reached for this date")]
    PushCapReached,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The candidate may be committed.
    Accepted,
    /// The candidate must not be committed.
    Rejected(RejectReason),
}

impl Decision {
    /// Whether the candidate was accepted.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Decide whether `candidate` may join `existing`, the bookings already on
/// its date, under `policy`.
///
/// Rules apply in order; the first failing rule wins:
///
/// 1. Only `Booked` entries count. When the candidate carries an id, its own
///    prior occurrence is excluded: a slot being edited does not count
///    against itself.
/// 2. A non-Push candidate is rejected once the non-push cap is met.
/// 3. A Newsletter candidate is rejected once the summed brand counts of the
///    date's Newsletter bookings meet the brand cap.
/// 4. A Push candidate is rejected once the push cap is met.
///
/// Push bookings are exempt from rules 2 and 3: they are a separate delivery
/// channel with independent capacity. The brand rule exists because a single
/// Newsletter slot can carry several sponsor brands, each consuming one unit
/// of brand capacity, while DEM has no sub-unit concept.
pub fn evaluate(
    candidate: &Booking,
    existing: &[ResolvedBooking],
    policy: &CapacityPolicy,
) -> Decision {
    let counted: Vec<&ResolvedBooking> = existing
        .iter()
        .filter(|entry| entry.booking.is_booked())
        .filter(|entry| match (&candidate.id, &entry.booking.id) {
            (Some(own), Some(other)) => own != other,
            _ => true,
        })
        .collect();

    let non_push = counted
        .iter()
        .filter(|entry| !entry.booking.service_type.is_push())
        .count();
    let push = counted.len() - non_push;

    if !candidate.service_type.is_push() {
        if let Some(cap) = policy.max_non_push_per_date {
            if non_push >= cap as usize {
                return Decision::Rejected(RejectReason::NonPushCapReached);
            }
        }
    }

    if candidate.service_type == ServiceType::Newsletter {
        if let Some(cap) = policy.max_brands_per_newsletter_date {
            let brands: u32 = counted
                .iter()
                .filter(|entry| entry.booking.service_type == ServiceType::Newsletter)
                .map(|entry| entry.brand_count)
                .sum();
            if brands >= cap {
                return Decision::Rejected(RejectReason::BrandCapReached);
            }
        }
    }

    if candidate.service_type.is_push() {
        if let Some(cap) = policy.max_push_per_date {
            if push >= cap as usize {
                return Decision::Rejected(RejectReason::PushCapReached);
            }
        }
    }

    Decision::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::booking::{SlotStatus, Target};
    use crate::core::record::RecordId;
    use chrono::NaiveDate;

    fn booking(id: Option<&str>, service: ServiceType, status: SlotStatus) -> Booking {
        Booking {
            id: id.map(RecordId::from),
            service_type: service,
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            target: Target::National,
            status,
            opportunity_id: None,
        }
    }

    fn resolved(id: &str, service: ServiceType, brands: u32) -> ResolvedBooking {
        ResolvedBooking::new(booking(Some(id), service, SlotStatus::Booked), brands)
    }

    #[test]
    fn test_empty_date_accepts_any_service() {
        let policy = CapacityPolicy::with_brand_cap(2);
        for service in [ServiceType::Newsletter, ServiceType::Dem, ServiceType::Push] {
            let candidate = booking(None, service, SlotStatus::Booked);
            assert_eq!(evaluate(&candidate, &[], &policy), Decision::Accepted);
        }
    }

    #[test]
    fn test_available_placeholders_never_count() {
        let policy = CapacityPolicy::default();
        let existing = vec![
            ResolvedBooking::with_default_brands(booking(
                Some("a"),
                ServiceType::Newsletter,
                SlotStatus::Available,
            )),
            ResolvedBooking::with_default_brands(booking(
                Some("b"),
                ServiceType::Dem,
                SlotStatus::Available,
            )),
        ];

        let candidate = booking(None, ServiceType::Dem, SlotStatus::Booked);
        assert_eq!(evaluate(&candidate, &existing, &policy), Decision::Accepted);
    }

    #[test]
    fn test_editing_a_booking_does_not_count_itself() {
        let policy = CapacityPolicy::default();
        let existing = vec![
            resolved("7", ServiceType::Newsletter, 1),
            resolved("8", ServiceType::Dem, 1),
        ];

        // Same id resubmitted with a different target: still two non-push
        // bookings after self-exclusion, one of which is the candidate.
        let mut candidate = booking(Some("7"), ServiceType::Newsletter, SlotStatus::Booked);
        candidate.target = Target::Custom;
        assert_eq!(evaluate(&candidate, &existing, &policy), Decision::Accepted);

        // A brand-new booking on the same date is over the cap.
        let fresh = booking(None, ServiceType::Newsletter, SlotStatus::Booked);
        assert_eq!(
            evaluate(&fresh, &existing, &policy),
            Decision::Rejected(RejectReason::NonPushCapReached)
        );
    }

    #[test]
    fn test_unrestricted_policy_admits_everything() {
        let policy = CapacityPolicy::unrestricted();
        let existing: Vec<ResolvedBooking> = (0..10)
            .map(|i| resolved(&format!("b{i}"), ServiceType::Push, 1))
            .chain((10..20).map(|i| resolved(&format!("b{i}"), ServiceType::Newsletter, 3)))
            .collect();

        for service in [ServiceType::Newsletter, ServiceType::Dem, ServiceType::Push] {
            let candidate = booking(None, service, SlotStatus::Booked);
            assert_eq!(evaluate(&candidate, &existing, &policy), Decision::Accepted);
        }
    }

    #[test]
    fn test_zero_brand_cap_disables_the_brand_rule() {
        let policy = CapacityPolicy::with_brand_cap(0);
        assert_eq!(policy.max_brands_per_newsletter_date, None);

        let existing = vec![resolved("a", ServiceType::Newsletter, 5)];
        let candidate = booking(None, ServiceType::Newsletter, SlotStatus::Booked);
        assert_eq!(evaluate(&candidate, &existing, &policy), Decision::Accepted);
    }

    #[test]
    fn test_reject_reasons_render_the_breached_rule() {
        assert_eq!(
            RejectReason::NonPushCapReached.to_string(),
            "max non-push bookings reached for this date"
        );
        assert_eq!(
            RejectReason::BrandCapReached.to_string(),
            "max brands reached for this date"
        );
        assert_eq!(
            RejectReason::PushCapReached.to_string(),
            "max pushes reached for this date"
        );
    }
}
