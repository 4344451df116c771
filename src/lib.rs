//! # Fieldwork Core
//!
//! Data-access and session core for the Fieldwork technician mission
//! marketplace: admins create and assign missions, technicians accept,
//! work and complete them, and users connect through friend requests and
//! one-to-one chat.
//!
//! Everything persists through an opaque async key-value store — each
//! collection is one JSON array under one key, and every write is a
//! whole-collection read-modify-write. That layout (including its
//! last-write-wins behavior and lack of cascades) is the contract this
//! crate implements, not an accident.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FIELDWORK CORE                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐                           │
//! │  │   auth    │  │   theme   │  │  reports  │   App-shell services      │
//! │  │ sessions  │  │ light/dark│  │ HTML/CSV  │                           │
//! │  └─────┬─────┘  └─────┬─────┘  └─────┬─────┘                           │
//! │        │              │              │ (renders from plain data)        │
//! │        ▼              │              │                                  │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │              storage::Database          │   Domain operations       │
//! │  │  users · missions · friends ·           │   over five collections   │
//! │  │  conversations · messages               │                           │
//! │  └────────────────────┬────────────────────┘                           │
//! │        │              │                                                 │
//! │        ▼              ▼                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │          storage::KeyValueStore         │   MemoryStore, FileStore  │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  Entity modules: users · missions · friends · messaging                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use fieldwork_core::{AuthService, Database, LoginOutcome, MemoryStore};
//!
//! # async fn run() -> fieldwork_core::Result<()> {
//! let database = Arc::new(Database::open(Arc::new(MemoryStore::new())).await?);
//!
//! let auth = AuthService::new(database.clone());
//! if let LoginOutcome::Success(user) = auth.login("tech", "tech123").await? {
//!     let missions = database.missions_for_user(user.id).await?;
//!     println!("{} missions for {}", missions.len(), user.display_name());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod error;
pub mod friends;
pub mod messaging;
pub mod missions;
pub mod reports;
pub mod storage;
pub mod theme;
pub mod time;
pub mod users;

pub use auth::{AuthService, AuthState, LoginOutcome};
pub use error::{Error, Result};
pub use friends::{FriendRequest, PendingFriendRequest, RequestStatus};
pub use messaging::{message_feed, Conversation, ConversationView, Message, DEFAULT_POLL_PERIOD};
pub use missions::{Mission, MissionStatus, MissionUpdate, NewMission, Urgency};
pub use storage::{Database, FileStore, KeyValueStore, MemoryStore};
pub use theme::{ThemePreference, ThemeService};
pub use users::{NewUser, Role, User, UserUpdate};

/// Crate version, from the manifest
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
