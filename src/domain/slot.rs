//! Slots: a room, a calendar date and a same-day span of wall-clock time.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::domain::RoomId;

/// The format used for wall-clock times in fixtures, configuration and
/// command-line input.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a wall-clock time written as `HH:MM`.
///
/// # Errors
///
/// Returns an error if the string is not a valid `HH:MM` time.
pub fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
}

/// The start of a span was not strictly before its end.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("start time {} must be before end time {}", .start.format(TIME_FORMAT), .end.format(TIME_FORMAT))]
pub struct InvalidSpan {
    /// The requested start time.
    pub start: NaiveTime,
    /// The requested end time.
    pub end: NaiveTime,
}

/// A same-day interval of wall-clock time, with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSpan {
    /// Creates a new span.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSpan`] unless `start` is strictly before `end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, InvalidSpan> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(InvalidSpan { start, end })
        }
    }

    /// When the span begins.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// When the span ends.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether two spans share any instant.
    ///
    /// Spans are half-open, `[start, end)`, so a span ending at 11:00 does not
    /// overlap one starting at 11:00.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

/// A validated slot: a catalog room, a date and a time span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// The room being requested.
    pub room: RoomId,
    /// The calendar date of the slot.
    pub date: NaiveDate,
    /// The time span on that date.
    pub span: TimeSpan,
}

impl Slot {
    /// Whether two slots are for the same room on the same date with
    /// overlapping spans.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.room == other.room && self.date == other.date && self.span.overlaps(&other.span)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {} on {} {}", self.room, self.date, self.span)
    }
}

/// An unvalidated request for a slot, as supplied by a caller.
///
/// `room` may be a room id or a room's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    /// Room id or display name.
    pub room: String,
    /// The requested date.
    pub date: NaiveDate,
    /// Requested start time.
    pub start: NaiveTime,
    /// Requested end time.
    pub end: NaiveTime,
}

impl SlotRequest {
    /// Creates a new slot request.
    #[must_use]
    pub fn new(room: impl Into<String>, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            room: room.into(),
            date,
            start,
            end,
        }
    }
}

/// Serde helpers for `HH:MM` times.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::{TIME_FORMAT, parse_time};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_time(&s).map_err(|e| D::Error::custom(format!("invalid time '{s}': {e}")))
    }

    /// The same, for collections of times.
    pub mod many {
        use std::collections::BTreeSet;

        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::SerializeSeq};

        use super::{TIME_FORMAT, parse_time};

        pub fn serialize<S: Serializer>(
            times: &BTreeSet<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(times.len()))?;
            for time in times {
                seq.serialize_element(&time.format(TIME_FORMAT).to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BTreeSet<NaiveTime>, D::Error> {
            Vec::<String>::deserialize(deserializer)?
                .iter()
                .map(|s| {
                    parse_time(s).map_err(|e| D::Error::custom(format!("invalid time '{s}': {e}")))
                })
                .collect()
        }
    }
}
