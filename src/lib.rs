//! Meeting-room booking
//!
//! Users browse a catalog of rooms and request time slots. Slots that the
//! availability policy accepts are confirmed straight away; the rest go to an
//! administrator for approval.
//!
//! ```
//! use roombook::{BookingResult, Config, Fixture, SlotRequest, Username};
//! use roombook::domain::slot::parse_time;
//!
//! let mut workflow = Fixture::demo().into_workflow(&Config::default()).unwrap();
//! let request = SlotRequest::new(
//!     "Quick Sync Pod",
//!     "2024-06-12".parse().unwrap(),
//!     parse_time("10:00").unwrap(),
//!     parse_time("10:30").unwrap(),
//! );
//! let user = Username::new("user").unwrap();
//!
//! let result = workflow.request_booking(&request, &user).unwrap();
//! assert!(matches!(result, BookingResult::Confirmed(_)));
//! ```

pub mod domain;
pub use domain::{
    BookingResult, BookingStatus, BookingWorkflow, Config, Role, Session, SlotRequest, Username,
};

/// Seed fixtures and credential storage.
pub mod storage;
pub use storage::{CredentialStore, Fixture};
