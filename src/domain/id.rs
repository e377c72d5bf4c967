//! Identifiers for rooms, bookings, pending requests and users.
//!
//! Identifiers are opaque, non-empty strings. The seed catalog uses small
//! decimal strings (`"1"`, `"2"`, ...) and fresh identifiers continue that
//! sequence, see [`IdSequence`].

use std::{fmt, num::NonZeroUsize, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// Error returned when an identifier or username is empty.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{0} must not be empty")]
pub struct EmptyIdError(&'static str);

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(NonEmptyString);

        impl $name {
            /// Creates a new identifier.
            ///
            /// # Errors
            ///
            /// Returns [`EmptyIdError`] if the string is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, EmptyIdError> {
                NonEmptyString::new(value.into())
                    .map(Self)
                    .map_err(|_| EmptyIdError($what))
            }

            /// Returns the string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = EmptyIdError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.as_str().to_owned()
            }
        }

        impl FromStr for $name {
            type Err = EmptyIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }
    };
}

string_id!(
    /// Identifier of a room in the catalog.
    RoomId,
    "room id"
);

string_id!(
    /// Identifier of a booking.
    BookingId,
    "booking id"
);

string_id!(
    /// Identifier of a pending approval request.
    RequestId,
    "request id"
);

string_id!(
    /// The login name of a user.
    Username,
    "username"
);

/// Issues fresh decimal identifiers for a collection.
///
/// The sequence only moves forward, so an identifier is never handed out
/// twice, even after the record it named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSequence {
    next: NonZeroUsize,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self {
            next: NonZeroUsize::MIN,
        }
    }
}

impl IdSequence {
    /// Reserves an identifier that has already been used, so the sequence
    /// never issues it.
    pub fn observe(&mut self, id: &str) {
        if let Some(candidate) = id
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_add(1))
            .and_then(NonZeroUsize::new)
        {
            self.next = self.next.max(candidate);
        }
    }

    /// Returns the next identifier and advances the sequence.
    ///
    /// # Panics
    ///
    /// Panics if the sequence overflows `usize`.
    pub fn issue(&mut self) -> String {
        let id = self.next;
        self.next = id.checked_add(1).expect("identifier sequence overflow");
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_rejected() {
        assert_eq!(RoomId::new(""), Err(EmptyIdError("room id")));
        assert!(Username::new("").is_err());
        assert_eq!(BookingId::new("7").unwrap().as_str(), "7");
    }

    #[test]
    fn ids_round_trip_through_serde_as_plain_strings() {
        let id: RequestId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id.as_str(), "42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        assert!(serde_json::from_str::<RequestId>("\"\"").is_err());
    }

    #[test]
    fn sequence_starts_after_highest_numeric_id() {
        let mut sequence = IdSequence::default();
        for id in ["1", "3", "legacy", "2"] {
            sequence.observe(id);
        }
        assert_eq!(sequence.issue(), "4");
        assert_eq!(sequence.issue(), "5");
    }

    #[test]
    fn empty_sequence_starts_at_one() {
        let mut sequence = IdSequence::default();
        assert_eq!(sequence.issue(), "1");
    }

    #[test]
    fn observed_ids_are_never_reissued() {
        let mut sequence = IdSequence::default();
        sequence.observe("9");
        sequence.observe("2");
        assert_eq!(sequence.issue(), "10");
    }
}
