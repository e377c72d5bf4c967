//! The booking workflow: admission, escalation, approval and cancellation.
//!
//! [`BookingWorkflow`] exclusively owns the room catalog, the bookings and
//! the pending requests for a session. It knows nothing about where the seed
//! data came from or who is calling; see [`crate::storage`] and
//! [`Session`](crate::domain::Session) for those.
//!
//! ```text
//! request_booking + available    ──▶ booked ──cancel_booking──▶ cancelled
//! request_booking + unavailable  ──▶ (caller) submit_approval_request ──▶ pending
//! pending ──approve_request──▶ booked      pending ──decline_request──▶ removed
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Availability, AvailabilityPolicy, Booking, BookingId, BookingStatus, Catalog, Config,
    IdSequence, InvalidSpan, PendingRequest, RequestId, Room, Slot, SlotRequest, TimeSpan,
    Username,
};

/// Errors returned by workflow operations.
///
/// All of them are local and recoverable; the workflow state is unchanged
/// when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The requested time range is malformed.
    #[error("invalid slot: {0}")]
    InvalidSlot(#[from] InvalidSpan),
    /// The room is not in the catalog.
    #[error("room '{0}' not found")]
    UnknownRoom(String),
    /// No pending request has this id.
    #[error("pending request {0} not found")]
    RequestNotFound(RequestId),
    /// No booking has this id.
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
}

/// Result of asking for a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingResult {
    /// The slot was available and is now booked.
    Confirmed(Booking),
    /// The slot is unavailable. Nothing was created; the caller may escalate
    /// with [`BookingWorkflow::submit_approval_request`].
    NeedsApproval(Slot),
}

/// Result of approving a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    /// The request, now removed from the pending set.
    pub request: PendingRequest,
    /// The booking created for the requester, if approval materializes
    /// bookings.
    pub booking: Option<Booking>,
}

/// Result of cancelling a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    /// The booking after cancellation.
    pub booking: Booking,
    /// Whether it had already been cancelled before this call.
    pub already_cancelled: bool,
}

/// Counts shown on the administrator dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowStats {
    /// Number of rooms in the catalog.
    pub rooms: usize,
    /// Number of pending requests.
    pub pending_requests: usize,
    /// Number of bookings of any status.
    pub total_bookings: usize,
    /// Number of bookings per status.
    pub by_status: BTreeMap<BookingStatus, usize>,
    /// Distinct users owning a booking or a request.
    pub active_users: usize,
    /// Confirmed bookings on the reference date.
    pub meetings_on_date: usize,
}

/// The booking workflow for one session.
#[derive(Debug)]
pub struct BookingWorkflow {
    catalog: Catalog,
    policy: AvailabilityPolicy,
    materialize_on_approval: bool,

    /// Bookings, keyed by id. Cancelled bookings are kept.
    bookings: BTreeMap<BookingId, Booking>,
    /// Requests awaiting a decision, keyed by id.
    pending: BTreeMap<RequestId, PendingRequest>,

    booking_ids: IdSequence,
    request_ids: IdSequence,
}

impl BookingWorkflow {
    /// Creates a workflow over `catalog` with no bookings or requests.
    #[must_use]
    pub fn new(catalog: Catalog, config: &Config) -> Self {
        Self {
            catalog,
            policy: config.availability_policy(),
            materialize_on_approval: config.materialize_on_approval,
            bookings: BTreeMap::new(),
            pending: BTreeMap::new(),
            booking_ids: IdSequence::default(),
            request_ids: IdSequence::default(),
        }
    }

    /// Adds a booking from a seed snapshot.
    ///
    /// Returns the booking previously stored under the same id, if any.
    pub(crate) fn seed_booking(&mut self, booking: Booking) -> Option<Booking> {
        self.booking_ids.observe(&booking.id);
        self.bookings.insert(booking.id.clone(), booking)
    }

    /// Adds a pending request from a seed snapshot.
    ///
    /// Returns the request previously stored under the same id, if any.
    pub(crate) fn seed_request(&mut self, request: PendingRequest) -> Option<PendingRequest> {
        self.request_ids.observe(&request.id);
        self.pending.insert(request.id.clone(), request)
    }

    /// The availability policy in force.
    #[must_use]
    pub const fn policy(&self) -> &AvailabilityPolicy {
        &self.policy
    }

    /// The room catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// All rooms, in catalog order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.catalog.iter()
    }

    /// Validates a slot request against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownRoom`] if the room is neither a room id
    /// nor a room name in the catalog, or [`WorkflowError::InvalidSlot`] if
    /// the start time is not before the end time.
    pub fn validate(&self, request: &SlotRequest) -> Result<Slot, WorkflowError> {
        let room = self
            .catalog
            .resolve(&request.room)
            .ok_or_else(|| WorkflowError::UnknownRoom(request.room.clone()))?;
        let span = TimeSpan::new(request.start, request.end)?;

        Ok(Slot {
            room: room.id.clone(),
            date: request.date,
            span,
        })
    }

    /// Checks whether `slot` can be booked directly.
    ///
    /// This has no side effects.
    #[must_use]
    pub fn check_availability(&self, slot: &Slot) -> Availability {
        self.policy.check(slot, self.bookings.values())
    }

    /// Attempts to book a slot for `username`.
    ///
    /// If the slot is available a `booked` booking is created and returned.
    /// Otherwise nothing changes and [`BookingResult::NeedsApproval`] is
    /// returned.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    #[instrument(level = "debug", skip(self), fields(room = %request.room))]
    pub fn request_booking(
        &mut self,
        request: &SlotRequest,
        username: &Username,
    ) -> Result<BookingResult, WorkflowError> {
        let slot = self.validate(request)?;

        if !self.check_availability(&slot).is_available() {
            tracing::info!(%slot, user = %username, "slot unavailable, approval needed");
            return Ok(BookingResult::NeedsApproval(slot));
        }

        let booking = self.insert_booking(slot, username.clone());
        tracing::info!(booking = %booking.id, user = %username, "booking confirmed");
        Ok(BookingResult::Confirmed(booking))
    }

    /// Escalates a slot request to an administrator.
    ///
    /// Availability is not checked again.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    #[instrument(level = "debug", skip(self, description), fields(room = %request.room))]
    pub fn submit_approval_request(
        &mut self,
        request: &SlotRequest,
        username: &Username,
        description: impl Into<String>,
    ) -> Result<PendingRequest, WorkflowError> {
        let slot = self.validate(request)?;
        let id = self.fresh_request_id();

        let pending = PendingRequest {
            id: id.clone(),
            slot,
            requester: username.clone(),
            description: description.into(),
        };
        self.pending.insert(id, pending.clone());

        tracing::info!(request = %pending.id, user = %username, "approval requested");
        Ok(pending)
    }

    /// Approves a pending request.
    ///
    /// The request is removed from the pending set and, unless configured
    /// otherwise, a `booked` booking owned by the requester is created for
    /// the requested slot.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::RequestNotFound`] if no pending request has
    /// this id, including when it was already approved or declined.
    #[instrument(level = "debug", skip(self))]
    pub fn approve_request(&mut self, id: &RequestId) -> Result<Approval, WorkflowError> {
        let request = self
            .pending
            .remove(id)
            .ok_or_else(|| WorkflowError::RequestNotFound(id.clone()))?;

        let booking = self
            .materialize_on_approval
            .then(|| self.insert_booking(request.slot.clone(), request.requester.clone()));

        tracing::info!(
            request = %request.id,
            booking = ?booking.as_ref().map(|b| b.id.as_str()),
            "request approved"
        );
        Ok(Approval { request, booking })
    }

    /// Declines a pending request. No booking is created.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::RequestNotFound`] if no pending request has
    /// this id.
    #[instrument(level = "debug", skip(self))]
    pub fn decline_request(&mut self, id: &RequestId) -> Result<PendingRequest, WorkflowError> {
        let request = self
            .pending
            .remove(id)
            .ok_or_else(|| WorkflowError::RequestNotFound(id.clone()))?;

        tracing::info!(request = %request.id, "request declined");
        Ok(request)
    }

    /// Cancels a booking, keeping the record.
    ///
    /// Cancelling an already-cancelled booking changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::BookingNotFound`] if no booking has this id.
    #[instrument(level = "debug", skip(self))]
    pub fn cancel_booking(&mut self, id: &BookingId) -> Result<CancelOutcome, WorkflowError> {
        let booking = self
            .bookings
            .get_mut(id)
            .ok_or_else(|| WorkflowError::BookingNotFound(id.clone()))?;

        let already_cancelled = !booking.cancel();
        if already_cancelled {
            tracing::debug!(booking = %id, "booking already cancelled");
        } else {
            tracing::info!(booking = %id, "booking cancelled");
        }

        Ok(CancelOutcome {
            booking: booking.clone(),
            already_cancelled,
        })
    }

    /// Looks up a booking.
    #[must_use]
    pub fn booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.get(id)
    }

    /// All bookings, of any status, ordered by id.
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }

    /// The bookings owned by `username`, most recent date first.
    #[must_use]
    pub fn bookings_for(&self, username: &Username) -> Vec<&Booking> {
        let mut bookings: Vec<_> = self
            .bookings
            .values()
            .filter(|booking| &booking.owner == username)
            .collect();
        bookings.sort_by(|a, b| {
            b.slot
                .date
                .cmp(&a.slot.date)
                .then_with(|| a.slot.span.cmp(&b.slot.span))
        });
        bookings
    }

    /// Looks up a pending request.
    #[must_use]
    pub fn pending_request(&self, id: &RequestId) -> Option<&PendingRequest> {
        self.pending.get(id)
    }

    /// All pending requests, ordered by id.
    pub fn pending_requests(&self) -> impl Iterator<Item = &PendingRequest> {
        self.pending.values()
    }

    /// The pending requests submitted by `username`.
    pub fn pending_for<'a>(
        &'a self,
        username: &'a Username,
    ) -> impl Iterator<Item = &'a PendingRequest> + 'a {
        self.pending
            .values()
            .filter(move |request| &request.requester == username)
    }

    /// Summary counts, with `date` as the reference day for meetings.
    #[must_use]
    pub fn stats(&self, date: NaiveDate) -> WorkflowStats {
        let mut by_status = BTreeMap::new();
        for booking in self.bookings.values() {
            *by_status.entry(booking.status).or_insert(0) += 1;
        }

        let active_users: BTreeSet<&Username> = self
            .bookings
            .values()
            .map(|booking| &booking.owner)
            .chain(self.pending.values().map(|request| &request.requester))
            .collect();

        WorkflowStats {
            rooms: self.catalog.len(),
            pending_requests: self.pending.len(),
            total_bookings: self.bookings.len(),
            by_status,
            active_users: active_users.len(),
            meetings_on_date: self
                .bookings
                .values()
                .filter(|booking| booking.is_active() && booking.slot.date == date)
                .count(),
        }
    }
}

impl BookingWorkflow {
    fn insert_booking(&mut self, slot: Slot, owner: Username) -> Booking {
        let id = self.fresh_booking_id();
        let booking = Booking {
            id: id.clone(),
            slot,
            status: BookingStatus::Booked,
            owner,
        };
        self.bookings.insert(id, booking.clone());
        booking
    }

    fn fresh_booking_id(&mut self) -> BookingId {
        loop {
            if let Ok(id) = BookingId::new(self.booking_ids.issue()) {
                if !self.bookings.contains_key(&id) {
                    return id;
                }
            }
        }
    }

    fn fresh_request_id(&mut self) -> RequestId {
        loop {
            if let Ok(id) = RequestId::new(self.request_ids.issue()) {
                if !self.pending.contains_key(&id) {
                    return id;
                }
            }
        }
    }
}
