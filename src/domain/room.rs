//! Rooms and the read-only room catalog.

use std::num::NonZeroU32;

use regex::Regex;

use crate::domain::RoomId;

/// A bookable meeting room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Unique identifier.
    pub id: RoomId,
    /// Display name, e.g. "Executive Boardroom".
    pub name: String,
    /// Location label, e.g. "Floor 10, East Wing".
    pub location: String,
    /// How many people the room seats.
    pub capacity: NonZeroU32,
    /// Equipment available in the room, in display order.
    pub equipment: Vec<String>,
    /// Reference to an image of the room.
    pub image: String,
}

impl Room {
    /// Case-insensitive substring match against the name or location.
    ///
    /// An empty term matches every room.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.location.to_lowercase().contains(&term)
    }
}

/// Errors raised while assembling a catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two rooms share an identifier.
    #[error("duplicate room id {0}")]
    DuplicateId(RoomId),
}

/// The ordered, read-only collection of rooms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    rooms: Vec<Room>,
}

impl Catalog {
    /// Builds a catalog from rooms in display order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two rooms share an id.
    pub fn new(rooms: Vec<Room>) -> Result<Self, CatalogError> {
        for (i, room) in rooms.iter().enumerate() {
            if rooms[..i].iter().any(|other| other.id == room.id) {
                return Err(CatalogError::DuplicateId(room.id.clone()));
            }
        }
        Ok(Self { rooms })
    }

    /// Looks up a room by id.
    #[must_use]
    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.id == id)
    }

    /// Looks up a room by id, falling back to a case-insensitive match on
    /// the display name.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<&Room> {
        let reference = reference.trim();
        self.rooms
            .iter()
            .find(|room| room.id.as_str() == reference)
            .or_else(|| {
                let name = reference.to_lowercase();
                self.rooms
                    .iter()
                    .find(|room| room.name.to_lowercase() == name)
            })
    }

    /// Rooms whose name or location contains `term`, ignoring case.
    pub fn search<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Room> + 'a {
        self.rooms.iter().filter(move |room| room.matches(term))
    }

    /// Rooms accepted by `filter`, in catalog order.
    pub fn filter<'a>(&'a self, filter: &'a RoomFilter) -> impl Iterator<Item = &'a Room> + 'a {
        self.rooms.iter().filter(move |room| filter.accepts(room))
    }

    /// All rooms, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Number of rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the catalog has no rooms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Criteria for narrowing the room listing.
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    /// Case-insensitive substring of name or location.
    pub term: Option<String>,
    /// Pattern matched against name or location.
    pub pattern: Option<Regex>,
    /// Smallest acceptable capacity.
    pub min_capacity: Option<u32>,
}

impl RoomFilter {
    /// Whether `room` satisfies every criterion that is set.
    #[must_use]
    pub fn accepts(&self, room: &Room) -> bool {
        if let Some(term) = &self.term {
            if !room.matches(term) {
                return false;
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&room.name) && !pattern.is_match(&room.location) {
                return false;
            }
        }
        self.min_capacity
            .is_none_or(|min| room.capacity.get() >= min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, name: &str, location: &str, capacity: u32) -> Room {
        Room {
            id: RoomId::new(id).unwrap(),
            name: name.to_string(),
            location: location.to_string(),
            capacity: NonZeroU32::new(capacity).unwrap(),
            equipment: Vec::new(),
            image: String::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            room("1", "Executive Boardroom", "Floor 10, East Wing", 12),
            room("2", "Innovation Hub", "Floor 5, Central", 8),
            room("6", "Quick Sync Pod", "Floor 4, Central Hub", 3),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(vec![
            room("1", "A", "here", 2),
            room("1", "B", "there", 2),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(RoomId::new("1").unwrap()));
    }

    #[test]
    fn resolves_by_id_then_name() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("2").unwrap().name, "Innovation Hub");
        assert_eq!(catalog.resolve("innovation hub").unwrap().id.as_str(), "2");
        assert!(catalog.resolve("Broom Cupboard").is_none());
    }

    #[test]
    fn resolves_non_ascii_names_like_search_does() {
        let catalog = Catalog::new(vec![room("7", "Salle Été", "Étage 2", 6)]).unwrap();

        assert_eq!(catalog.search("salle été").count(), 1);
        assert_eq!(catalog.resolve("salle été").unwrap().id.as_str(), "7");
        assert_eq!(catalog.resolve("SALLE ÉTÉ").unwrap().id.as_str(), "7");
    }

    #[test]
    fn search_matches_name_or_location_ignoring_case() {
        let catalog = catalog();
        let names: Vec<_> = catalog.search("CENTRAL").map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Innovation Hub", "Quick Sync Pod"]);

        assert_eq!(catalog.search("").count(), 3);
        assert_eq!(catalog.search("board").count(), 1);
    }

    #[test]
    fn filter_combines_criteria() {
        let catalog = catalog();
        let filter = RoomFilter {
            term: Some("floor".to_string()),
            pattern: Some(Regex::new("^(Innovation|Quick)").unwrap()),
            min_capacity: Some(4),
        };
        let ids: Vec<_> = catalog.filter(&filter).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["2"]);

        assert_eq!(catalog.filter(&RoomFilter::default()).count(), 3);
    }
}
