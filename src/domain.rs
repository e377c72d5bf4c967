//! Domain models for meeting-room booking.
//!
//! This module contains the room catalog, time slots, bookings and pending
//! requests, the availability policy, and the [`BookingWorkflow`] that ties
//! them together.

mod auth;
pub use auth::{AuthError, Authenticator, password_digest};

mod booking;
pub use booking::{Booking, BookingStatus};

mod config;
pub use config::{Config, PolicyKind};

mod id;
pub use id::{BookingId, EmptyIdError, IdSequence, RequestId, RoomId, Username};

mod policy;
pub use policy::{Availability, AvailabilityPolicy};

mod request;
pub use request::PendingRequest;

mod room;
pub use room::{Catalog, CatalogError, Room, RoomFilter};

mod session;
pub use session::{AccessError, AdminSession, Identity, Role, Session, UserSession};

/// Time spans, slots and `HH:MM` parsing.
pub mod slot;
pub use slot::{InvalidSpan, Slot, SlotRequest, TimeSpan};

mod workflow;
pub use workflow::{
    Approval, BookingResult, BookingWorkflow, CancelOutcome, WorkflowError, WorkflowStats,
};
