//! # Friends Module
//!
//! Friend requests between users. Accepting a request is what creates a
//! conversation — there is no other way to open one.
//!
//! ## Friend Request Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      FRIEND REQUEST FLOW                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Alice (Sender)                              Bob (Recipient)           │
//! │  ─────────────────────────────────────────────────────────────         │
//! │                                                                         │
//! │  send_friend_request(alice, bob)                                       │
//! │  ┌─────────────────────┐                                               │
//! │  │ Checks:             │                                               │
//! │  │ • not to self       │                                               │
//! │  │ • no pending request│     pending_friend_requests(bob)              │
//! │  │   either direction  │  ─────────────────────────►                   │
//! │  │ • no conversation   │                          ┌─────────────────┐  │
//! │  │   between the pair  │                          │ Accept / Reject │  │
//! │  └─────────────────────┘                          └────────┬────────┘  │
//! │                                                            │           │
//! │                               accept: status = accepted    │           │
//! │                                       + ONE conversation ◄─┘           │
//! │                               reject: status = rejected                │
//! │                                                                         │
//! │  Requests are never deleted — accepted and rejected rows accumulate    │
//! │  as history. A rejected request does not block a later attempt.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::users::User;

/// Status of a friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Waiting for the recipient's answer
    Pending,
    /// Request was accepted
    Accepted,
    /// Request was rejected
    Rejected,
}

impl RequestStatus {
    /// Convert to the persisted string
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Parse from the persisted string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// A friend request record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    /// Sequentially assigned unique id
    pub id: i64,
    /// Sending user
    pub from_user_id: i64,
    /// Receiving user
    pub to_user_id: i64,
    /// Current status
    pub status: RequestStatus,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// A pending request joined with its sender, for the notifications screen
///
/// The join is computed at read time; a sender deleted since the request
/// was created leaves `from_user` as `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFriendRequest {
    /// The underlying request
    pub request: FriendRequest,
    /// The sending user, if they still exist
    pub from_user: Option<User>,
}

// ============================================================================
// TESTS
// ============================================================================
