use crate::domain::{RequestId, Slot, Username};

/// A request for a slot that was unavailable, awaiting an administrator's
/// decision.
///
/// A request leaves the pending set when it is approved or declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// The slot being requested.
    pub slot: Slot,
    /// Who asked for it.
    pub requester: Username,
    /// Free-text reason for the meeting.
    pub description: String,
}
