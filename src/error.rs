//! # Error Handling
//!
//! This module provides the error types for Fieldwork Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── User Errors                                                       │
//! │  │   ├── UserNotFound          - No user with that id                  │
//! │  │   ├── UsernameTaken         - Username already registered           │
//! │  │   └── NotAuthenticated      - No active session                     │
//! │  │                                                                      │
//! │  ├── Mission Errors                                                    │
//! │  │   └── MissionNotFound       - No mission with that id               │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── StorageReadError      - Failed to read from storage           │
//! │  │   ├── StorageWriteError     - Failed to write to storage            │
//! │  │   ├── SerializationError    - Failed to serialize a collection      │
//! │  │   └── DeserializationError  - Failed to parse a collection          │
//! │  │                                                                      │
//! │  ├── Friend Errors                                                     │
//! │  │   ├── AlreadyFriends        - A conversation already links the pair │
//! │  │   ├── RequestPending        - Friend request already pending        │
//! │  │   ├── RequestNotFound       - Friend request not found              │
//! │  │   └── CannotAddSelf         - Request sent to own account           │
//! │  │                                                                      │
//! │  └── Message Errors                                                    │
//! │      └── ConversationNotFound  - Conversation doesn't exist            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failed login is deliberately NOT an error: [`crate::auth::AuthService::login`]
//! returns a [`crate::auth::LoginOutcome`] so bad credentials never surface as
//! an `Err`. Only storage failures do.

use thiserror::Error;

/// Result type alias for Fieldwork Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Fieldwork Core
///
/// Variants are categorized by module/domain so the app shell can map them
/// to alert messages without string matching.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // User Errors (200-299)
    // ========================================================================

    /// No user with the given id
    #[error("User {0} not found.")]
    UserNotFound(i64),

    /// Username already registered (usernames are case-insensitive)
    #[error("Username '{0}' is already taken.")]
    UsernameTaken(String),

    /// Operation requires an authenticated session
    #[error("Not authenticated.")]
    NotAuthenticated,

    // ========================================================================
    // Mission Errors (300-399)
    // ========================================================================

    /// No mission with the given id
    #[error("Mission {0} not found.")]
    MissionNotFound(i64),

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Failed to read from the key-value store
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Failed to write to the key-value store
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    /// Failed to serialize a collection
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to parse a stored collection
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    // ========================================================================
    // Friend Errors (600-699)
    // ========================================================================

    /// A conversation already exists between the two users
    #[error("Already friends with this user.")]
    AlreadyFriends,

    /// A friend request between the pair is already pending
    #[error("A friend request is already pending for this user.")]
    RequestPending,

    /// Friend request not found
    #[error("Friend request not found.")]
    RequestNotFound,

    /// Cannot send a request to your own account
    #[error("Cannot send a friend request to yourself.")]
    CannotAddSelf,

    // ========================================================================
    // Message Errors (700-799)
    // ========================================================================

    /// Conversation not found
    #[error("Conversation not found.")]
    ConversationNotFound,

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code for the app boundary
    ///
    /// Error codes are organized by category:
    /// - 200-299: Users
    /// - 300-399: Missions
    /// - 400-499: Storage
    /// - 600-699: Friends
    /// - 700-799: Messages
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Users (200-299)
            Error::UserNotFound(_) => 200,
            Error::UsernameTaken(_) => 201,
            Error::NotAuthenticated => 202,

            // Missions (300-399)
            Error::MissionNotFound(_) => 300,

            // Storage (400-499)
            Error::StorageReadError(_) => 400,
            Error::StorageWriteError(_) => 401,
            Error::SerializationError(_) => 402,
            Error::DeserializationError(_) => 403,

            // Friends (600-699)
            Error::AlreadyFriends => 600,
            Error::RequestPending => 601,
            Error::RequestNotFound => 602,
            Error::CannotAddSelf => 603,

            // Messages (700-799)
            Error::ConversationNotFound => 700,

            // Internal (900-999)
            Error::Internal(_) => 900,
        }
    }

    /// Check if this error is a domain conflict (shown as-is to the user)
    /// rather than a storage/internal failure (shown as a generic alert).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::UsernameTaken(_)
                | Error::AlreadyFriends
                | Error::RequestPending
                | Error::CannotAddSelf
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::DeserializationError(err.to_string())
        } else {
            Error::SerializationError(err.to_string())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::UserNotFound(1).code(), 200);
        assert_eq!(Error::MissionNotFound(1).code(), 300);
        assert_eq!(Error::StorageReadError("test".into()).code(), 400);
        assert_eq!(Error::AlreadyFriends.code(), 600);
        assert_eq!(Error::ConversationNotFound.code(), 700);
        assert_eq!(Error::Internal("test".into()).code(), 900);
    }

    #[test]
    fn test_conflict_errors() {
        assert!(Error::RequestPending.is_conflict());
        assert!(Error::UsernameTaken("admin".into()).is_conflict());
        assert!(!Error::StorageReadError("disk".into()).is_conflict());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err = serde_json::from_str::<Vec<i64>>("not json").unwrap_err();
        let converted: Error = err.into();
        assert_eq!(converted.code(), 403);
    }
}
