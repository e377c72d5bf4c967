//! Role-scoped access to the workflow.
//!
//! A [`Session`] wraps the workflow for one authenticated identity. Each
//! variant exposes only the operations its role may perform, so an ordinary
//! user has no way to approve or decline requests, and may only cancel
//! bookings they own.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Approval, Availability, Booking, BookingId, BookingResult, BookingWorkflow, CancelOutcome,
    Catalog, PendingRequest, RequestId, Slot, SlotRequest, Username, WorkflowError,
    WorkflowStats,
};

/// What an identity is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses rooms and manages their own bookings.
    User,
    /// Decides on pending requests and manages every booking.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Admin => "admin",
        })
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name.
    pub username: Username,
    /// Granted role.
    pub role: Role,
}

/// Errors from role-scoped operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The booking belongs to someone else.
    #[error("booking {booking} belongs to another user")]
    NotOwner {
        /// The booking that was targeted.
        booking: BookingId,
    },
    /// The underlying workflow operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// The workflow, as seen by one identity.
#[derive(Debug)]
pub enum Session<'w> {
    /// An ordinary user.
    User(UserSession<'w>),
    /// An administrator.
    Admin(AdminSession<'w>),
}

impl<'w> Session<'w> {
    /// Opens a session for `identity`.
    #[must_use]
    pub fn open(workflow: &'w mut BookingWorkflow, identity: Identity) -> Self {
        tracing::debug!(user = %identity.username, role = %identity.role, "session opened");
        match identity.role {
            Role::User => Self::User(UserSession {
                workflow,
                username: identity.username,
            }),
            Role::Admin => Self::Admin(AdminSession {
                workflow,
                username: identity.username,
            }),
        }
    }

    /// The logged-in user.
    #[must_use]
    pub const fn username(&self) -> &Username {
        match self {
            Self::User(session) => &session.username,
            Self::Admin(session) => &session.username,
        }
    }

    /// The session's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Admin(_) => Role::Admin,
        }
    }
}

/// Operations available to an ordinary user.
#[derive(Debug)]
pub struct UserSession<'w> {
    workflow: &'w mut BookingWorkflow,
    username: Username,
}

impl UserSession<'_> {
    /// The logged-in user.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// The room catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        self.workflow.catalog()
    }

    /// Validates a slot request.
    ///
    /// # Errors
    ///
    /// See [`BookingWorkflow::validate`].
    pub fn validate(&self, request: &SlotRequest) -> Result<Slot, WorkflowError> {
        self.workflow.validate(request)
    }

    /// Checks whether a slot can be booked directly.
    #[must_use]
    pub fn check_availability(&self, slot: &Slot) -> Availability {
        self.workflow.check_availability(slot)
    }

    /// Books a slot for this user.
    ///
    /// # Errors
    ///
    /// See [`BookingWorkflow::request_booking`].
    pub fn request_booking(&mut self, request: &SlotRequest) -> Result<BookingResult, WorkflowError> {
        self.workflow.request_booking(request, &self.username)
    }

    /// Asks an administrator to approve a slot for this user.
    ///
    /// # Errors
    ///
    /// See [`BookingWorkflow::submit_approval_request`].
    pub fn submit_approval_request(
        &mut self,
        request: &SlotRequest,
        description: impl Into<String>,
    ) -> Result<PendingRequest, WorkflowError> {
        self.workflow
            .submit_approval_request(request, &self.username, description)
    }

    /// This user's bookings, most recent date first.
    #[must_use]
    pub fn bookings(&self) -> Vec<&Booking> {
        self.workflow.bookings_for(&self.username)
    }

    /// This user's requests awaiting a decision.
    pub fn pending_requests(&self) -> impl Iterator<Item = &PendingRequest> {
        self.workflow.pending_for(&self.username)
    }

    /// Cancels one of this user's bookings.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotOwner`] if the booking belongs to someone
    /// else, or a [`WorkflowError`] if it does not exist.
    pub fn cancel_booking(&mut self, id: &BookingId) -> Result<CancelOutcome, AccessError> {
        let booking = self
            .workflow
            .booking(id)
            .ok_or_else(|| WorkflowError::BookingNotFound(id.clone()))?;

        if booking.owner != self.username {
            tracing::warn!(user = %self.username, booking = %id, "refused to cancel another user's booking");
            return Err(AccessError::NotOwner {
                booking: id.clone(),
            });
        }

        Ok(self.workflow.cancel_booking(id)?)
    }
}

/// Operations available to an administrator.
#[derive(Debug)]
pub struct AdminSession<'w> {
    workflow: &'w mut BookingWorkflow,
    username: Username,
}

impl AdminSession<'_> {
    /// The logged-in administrator.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// The room catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        self.workflow.catalog()
    }

    /// Every booking, of any status.
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.workflow.bookings()
    }

    /// Every request awaiting a decision.
    pub fn pending_requests(&self) -> impl Iterator<Item = &PendingRequest> {
        self.workflow.pending_requests()
    }

    /// Approves a pending request.
    ///
    /// # Errors
    ///
    /// See [`BookingWorkflow::approve_request`].
    pub fn approve_request(&mut self, id: &RequestId) -> Result<Approval, WorkflowError> {
        tracing::debug!(admin = %self.username, request = %id, "approving");
        self.workflow.approve_request(id)
    }

    /// Declines a pending request.
    ///
    /// # Errors
    ///
    /// See [`BookingWorkflow::decline_request`].
    pub fn decline_request(&mut self, id: &RequestId) -> Result<PendingRequest, WorkflowError> {
        tracing::debug!(admin = %self.username, request = %id, "declining");
        self.workflow.decline_request(id)
    }

    /// Cancels any booking.
    ///
    /// # Errors
    ///
    /// See [`BookingWorkflow::cancel_booking`].
    pub fn cancel_booking(&mut self, id: &BookingId) -> Result<CancelOutcome, WorkflowError> {
        self.workflow.cancel_booking(id)
    }

    /// Dashboard counts, with `date` as the reference day.
    #[must_use]
    pub fn stats(&self, date: NaiveDate) -> WorkflowStats {
        self.workflow.stats(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{BookingStatus, Config, slot::parse_time},
        storage::Fixture,
    };

    fn identity(name: &str, role: Role) -> Identity {
        Identity {
            username: Username::new(name).unwrap(),
            role,
        }
    }

    fn demo() -> BookingWorkflow {
        Fixture::demo().into_workflow(&Config::default()).unwrap()
    }

    #[test]
    fn role_selects_session_variant() {
        let mut workflow = demo();
        {
            let session = Session::open(&mut workflow, identity("user", Role::User));
            assert!(matches!(session, Session::User(_)));
            assert_eq!(session.role(), Role::User);
        }
        let session = Session::open(&mut workflow, identity("admin", Role::Admin));
        assert!(matches!(session, Session::Admin(_)));
        assert_eq!(session.username().as_str(), "admin");
    }

    #[test]
    fn users_cancel_only_their_own_bookings() {
        let mut workflow = demo();
        // Booking 2 belongs to john.doe.
        let theirs = BookingId::new("2").unwrap();
        {
            let Session::User(mut session) =
                Session::open(&mut workflow, identity("user", Role::User))
            else {
                panic!("expected a user session");
            };

            assert_eq!(
                session.cancel_booking(&theirs).unwrap_err(),
                AccessError::NotOwner {
                    booking: theirs.clone()
                }
            );

            let mine = BookingId::new("1").unwrap();
            let outcome = session.cancel_booking(&mine).unwrap();
            assert_eq!(outcome.booking.status, BookingStatus::Cancelled);

            let missing = BookingId::new("42").unwrap();
            assert_eq!(
                session.cancel_booking(&missing).unwrap_err(),
                AccessError::Workflow(WorkflowError::BookingNotFound(missing))
            );
        }

        assert_eq!(
            workflow.booking(&theirs).unwrap().status,
            BookingStatus::Booked
        );
    }

    #[test]
    fn user_bookings_are_owned_by_the_session_user() {
        let mut workflow = demo();
        let Session::User(mut session) =
            Session::open(&mut workflow, identity("john.doe", Role::User))
        else {
            panic!("expected a user session");
        };

        assert!(session.catalog().resolve("Creative Studio").is_some());
        let request = SlotRequest::new(
            "Creative Studio",
            "2024-06-11".parse().unwrap(),
            parse_time("09:00").unwrap(),
            parse_time("10:00").unwrap(),
        );
        let BookingResult::Confirmed(booking) = session.request_booking(&request).unwrap() else {
            panic!("slot should be available");
        };
        assert_eq!(booking.owner.as_str(), "john.doe");
        assert_eq!(session.bookings().len(), 2);
        assert_eq!(session.pending_requests().count(), 0);
    }

    #[test]
    fn admins_decide_on_requests_and_cancel_any_booking() {
        let mut workflow = demo();
        let Session::Admin(mut session) =
            Session::open(&mut workflow, identity("admin", Role::Admin))
        else {
            panic!("expected an admin session");
        };

        assert_eq!(session.catalog().len(), 6);
        assert_eq!(session.pending_requests().count(), 2);
        session.approve_request(&RequestId::new("1").unwrap()).unwrap();
        session.decline_request(&RequestId::new("2").unwrap()).unwrap();
        assert_eq!(session.pending_requests().count(), 0);

        let outcome = session.cancel_booking(&BookingId::new("2").unwrap()).unwrap();
        assert_eq!(outcome.booking.owner.as_str(), "john.doe");
        assert_eq!(outcome.booking.status, BookingStatus::Cancelled);
    }
}
