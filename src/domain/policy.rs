//! Availability policies.
//!
//! A policy decides whether a slot may be booked directly or must be
//! escalated to an administrator.

use std::collections::BTreeSet;

use chrono::NaiveTime;

use crate::domain::{Booking, Slot};

/// Result of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The slot may be booked directly.
    Available,
    /// The slot needs administrator approval.
    Unavailable,
}

impl Availability {
    /// Whether the slot may be booked directly.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// The rule used to decide availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    /// Slots starting at any of these times are unavailable, whatever the
    /// room or date.
    Denylist(BTreeSet<NaiveTime>),
    /// Slots overlapping a `booked` booking of the same room on the same
    /// date are unavailable. Spans are half-open.
    Overlap,
}

impl AvailabilityPolicy {
    /// The start times blocked by default.
    #[must_use]
    pub fn default_blocked_start_times() -> BTreeSet<NaiveTime> {
        [14, 15, 16]
            .into_iter()
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .collect()
    }

    /// Evaluates `slot` against `bookings`.
    ///
    /// Only the [`Overlap`](Self::Overlap) policy looks at the bookings.
    pub fn check<'a>(
        &self,
        slot: &Slot,
        mut bookings: impl Iterator<Item = &'a Booking>,
    ) -> Availability {
        let blocked = match self {
            Self::Denylist(times) => times.contains(&slot.span.start()),
            Self::Overlap => {
                bookings.any(|booking| booking.is_active() && booking.slot.conflicts_with(slot))
            }
        };

        if blocked {
            Availability::Unavailable
        } else {
            Availability::Available
        }
    }
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self::Denylist(Self::default_blocked_start_times())
    }
}
