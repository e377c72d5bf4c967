use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, Slot, Username};

/// Where a booking is in its lifecycle.
///
/// `Cancelled` is terminal: no transition leads from it back to `Booked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Confirmed.
    Booked,
    /// Awaiting a decision. Only appears in seed data.
    Pending,
    /// Cancelled. The record is kept for history listings.
    Cancelled,
}

impl BookingStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Booked, Self::Pending, Self::Cancelled];

    /// The lowercase label used in fixtures and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reservation of a slot by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Unique identifier.
    pub id: BookingId,
    /// The room, date and time span that were booked.
    pub slot: Slot,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// The user who owns the booking.
    pub owner: Username,
}

impl Booking {
    /// Whether the booking currently holds its slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Booked
    }

    /// Marks the booking cancelled.
    ///
    /// Returns `false` if it was already cancelled, in which case nothing
    /// changes.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.status == BookingStatus::Cancelled {
            false
        } else {
            self.status = BookingStatus::Cancelled;
            true
        }
    }
}
