//! Seed fixtures.
//!
//! A fixture is the initial snapshot a session starts from: the room
//! catalog, existing bookings and pending requests. Records reference rooms
//! by display name, as the seed data does.
//!
//! Fixtures are YAML, or JSON when the file has a `.json` extension.

use std::{
    io,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Booking, BookingId, BookingStatus, BookingWorkflow, Catalog, CatalogError, Config,
    InvalidSpan, PendingRequest, RequestId, Room, RoomId, Slot, TimeSpan, Username, slot::hhmm,
};

const DEMO: &str = include_str!("../../fixtures/demo.yaml");

/// Errors raised while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file could not be read.
    #[error("failed to read fixture {}: {source}", path.display())]
    Io {
        /// The fixture path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The YAML is malformed or has the wrong shape.
    #[error("failed to parse YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The JSON is malformed or has the wrong shape.
    #[error("failed to parse JSON fixture: {0}")]
    Json(#[from] serde_json::Error),
    /// The room list is inconsistent.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A record references a room that is not in the catalog.
    #[error("{record} references unknown room '{room}'")]
    UnknownRoom {
        /// Which record, e.g. "booking 3".
        record: String,
        /// The room reference as written.
        room: String,
    },
    /// A record has an empty or reversed time range.
    #[error("{record} has an invalid time range: {source}")]
    InvalidSlot {
        /// Which record, e.g. "booking 3".
        record: String,
        /// The underlying error.
        source: InvalidSpan,
    },
    /// Two bookings share an id.
    #[error("duplicate booking id {0}")]
    DuplicateBooking(BookingId),
    /// Two pending requests share an id.
    #[error("duplicate pending request id {0}")]
    DuplicateRequest(RequestId),
}

/// A room as written in a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Unique identifier.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Location label.
    pub location: String,
    /// Seats; must be positive.
    pub capacity: NonZeroU32,
    /// Equipment, in display order.
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Image reference.
    #[serde(default)]
    pub image: String,
}

/// A booking as written in a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Unique identifier.
    pub id: BookingId,
    /// Room id or display name.
    #[serde(alias = "roomId", alias = "room")]
    pub room_name: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time, `HH:MM`.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// End time, `HH:MM`.
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Owner.
    pub username: Username,
}

/// A pending request as written in a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Unique identifier.
    pub id: RequestId,
    /// Room id or display name.
    #[serde(alias = "roomId", alias = "room")]
    pub room_name: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time, `HH:MM`.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// End time, `HH:MM`.
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Requester.
    pub username: Username,
    /// Reason for the meeting.
    #[serde(default)]
    pub description: String,
}

/// The initial snapshot of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Rooms, in display order.
    #[serde(default)]
    pub rooms: Vec<RoomRecord>,
    /// Existing bookings.
    #[serde(default)]
    pub bookings: Vec<BookingRecord>,
    /// Requests awaiting a decision.
    #[serde(default)]
    pub pending_requests: Vec<RequestRecord>,
}

impl Fixture {
    /// The built-in demo fixture.
    ///
    /// # Panics
    ///
    /// Panics if the bundled fixture is malformed, which the test suite rules
    /// out.
    #[must_use]
    pub fn demo() -> Self {
        Self::from_yaml(DEMO).expect("bundled demo fixture should parse")
    }

    /// Parses a YAML fixture.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the text is not a valid fixture.
    pub fn from_yaml(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON fixture.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Json`] if the text is not a valid fixture.
    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a fixture file, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        tracing::debug!(path = %path.display(), json = is_json, "loading fixture");
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Builds a workflow seeded with this snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if room ids repeat, a record references an unknown
    /// room or has an invalid time range, or booking or request ids repeat.
    pub fn into_workflow(self, config: &Config) -> Result<BookingWorkflow, FixtureError> {
        let rooms = self
            .rooms
            .into_iter()
            .map(|record| Room {
                id: record.id,
                name: record.name,
                location: record.location,
                capacity: record.capacity,
                equipment: record.equipment,
                image: record.image,
            })
            .collect();
        let catalog = Catalog::new(rooms)?;

        let bookings = self
            .bookings
            .into_iter()
            .map(|record| {
                let slot = slot(
                    &catalog,
                    &format!("booking {}", record.id),
                    &record.room_name,
                    record.date,
                    record.start_time,
                    record.end_time,
                )?;
                Ok(Booking {
                    id: record.id,
                    slot,
                    status: record.status,
                    owner: record.username,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let requests = self
            .pending_requests
            .into_iter()
            .map(|record| {
                let slot = slot(
                    &catalog,
                    &format!("pending request {}", record.id),
                    &record.room_name,
                    record.date,
                    record.start_time,
                    record.end_time,
                )?;
                Ok(PendingRequest {
                    id: record.id,
                    slot,
                    requester: record.username,
                    description: record.description,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let mut workflow = BookingWorkflow::new(catalog, config);
        for booking in bookings {
            let id = booking.id.clone();
            if workflow.seed_booking(booking).is_some() {
                return Err(FixtureError::DuplicateBooking(id));
            }
        }
        for request in requests {
            let id = request.id.clone();
            if workflow.seed_request(request).is_some() {
                return Err(FixtureError::DuplicateRequest(id));
            }
        }

        tracing::debug!(
            rooms = workflow.catalog().len(),
            bookings = workflow.bookings().count(),
            pending = workflow.pending_requests().count(),
            "seeded workflow"
        );
        Ok(workflow)
    }
}

fn slot(
    catalog: &Catalog,
    record: &str,
    room: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<Slot, FixtureError> {
    let room_id = catalog
        .resolve(room)
        .map(|r| r.id.clone())
        .ok_or_else(|| FixtureError::UnknownRoom {
            record: record.to_string(),
            room: room.to_string(),
        })?;
    let span = TimeSpan::new(start, end).map_err(|source| FixtureError::InvalidSlot {
        record: record.to_string(),
        source,
    })?;

    Ok(Slot {
        room: room_id,
        date,
        span,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn demo_fixture_seeds_the_workflow() {
        let fixture = Fixture::demo();
        assert_eq!(fixture.rooms.len(), 6);
        assert_eq!(fixture.bookings.len(), 3);
        assert_eq!(fixture.pending_requests.len(), 2);

        let workflow = fixture.into_workflow(&Config::default()).unwrap();
        let hub = workflow.catalog().resolve("Innovation Hub").unwrap();
        assert_eq!(hub.capacity.get(), 8);
        assert_eq!(hub.equipment.len(), 3);

        let cancelled = workflow.booking(&BookingId::new("3").unwrap()).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.slot.room.as_str(), "4");
    }

    #[test]
    fn fresh_ids_follow_the_seed_ids() {
        let mut workflow = Fixture::demo().into_workflow(&Config::default()).unwrap();
        let request = crate::domain::SlotRequest::new(
            "1",
            "2024-07-01".parse().unwrap(),
            crate::domain::slot::parse_time("09:00").unwrap(),
            crate::domain::slot::parse_time("10:00").unwrap(),
        );
        let user = Username::new("user").unwrap();

        let crate::domain::BookingResult::Confirmed(booking) =
            workflow.request_booking(&request, &user).unwrap()
        else {
            panic!("slot should be available");
        };
        assert_eq!(booking.id.as_str(), "4");

        let pending = workflow
            .submit_approval_request(&request, &user, "")
            .unwrap();
        assert_eq!(pending.id.as_str(), "3");
    }

    #[test]
    fn json_fixture_uses_the_same_shape() {
        let json = r#"{
            "rooms": [{"id": "a", "name": "Attic", "location": "Top", "capacity": 2}],
            "bookings": [{"id": "b1", "roomName": "Attic", "date": "2024-01-02",
                          "startTime": "08:00", "endTime": "09:00",
                          "status": "booked", "username": "amy"}],
            "pendingRequests": []
        }"#;

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let fixture = Fixture::load(file.path()).unwrap();
        assert_eq!(fixture.rooms[0].equipment, Vec::<String>::new());

        let workflow = fixture.into_workflow(&Config::default()).unwrap();
        assert_eq!(workflow.bookings().count(), 1);
    }

    #[test]
    fn unknown_room_reference_is_reported() {
        let yaml = "rooms: []\nbookings:\n  - id: \"1\"\n    roomName: Nowhere\n    date: 2024-01-02\n    startTime: \"08:00\"\n    endTime: \"09:00\"\n    status: booked\n    username: amy\n";
        let err = Fixture::from_yaml(yaml)
            .unwrap()
            .into_workflow(&Config::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "booking 1 references unknown room 'Nowhere'");
    }

    #[test]
    fn reversed_time_range_is_reported() {
        let mut fixture = Fixture::demo();
        fixture.pending_requests[0].end_time = fixture.pending_requests[0].start_time;

        let err = fixture.into_workflow(&Config::default()).unwrap_err();
        assert!(matches!(err, FixtureError::InvalidSlot { record, .. } if record == "pending request 1"));
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let mut fixture = Fixture::demo();
        fixture.bookings[1].id = fixture.bookings[0].id.clone();
        assert!(matches!(
            fixture.into_workflow(&Config::default()),
            Err(FixtureError::DuplicateBooking(_))
        ));

        let mut fixture = Fixture::demo();
        fixture.rooms[1].id = fixture.rooms[0].id.clone();
        assert!(matches!(
            fixture.into_workflow(&Config::default()),
            Err(FixtureError::Catalog(CatalogError::DuplicateId(_)))
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let yaml = "rooms:\n  - id: \"1\"\n    name: Closet\n    location: Basement\n    capacity: 0\n";
        assert!(matches!(Fixture::from_yaml(yaml), Err(FixtureError::Yaml(_))));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing.yaml");
        let err = Fixture::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
