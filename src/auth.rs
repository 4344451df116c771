//! # Auth Module
//!
//! Session handling for the app shell. A session is nothing more than the
//! logged-in user's id persisted under one key; restoring a session re-reads
//! the user record, and a dangling id silently falls back to signed-out.
//!
//! ## Session Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SESSION LIFECYCLE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   app start                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   load() ── stored user id? ──► get_user(id) ──► Authenticated(user)   │
//! │      │            │                   │                                 │
//! │      │            no                  user gone (dangling id)           │
//! │      │            ▼                   ▼                                 │
//! │      └──────► Unauthenticated ◄───────┘                                 │
//! │                                                                         │
//! │   login(username, password)                                             │
//! │      │  username matched case-insensitively, password exactly           │
//! │      ├─ match ──► persist id ──► Authenticated(user) ──► Success        │
//! │      └─ no match ──► Failure { message }   (never an Err)               │
//! │                                                                         │
//! │   logout() ──► remove stored id ──► Unauthenticated                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bad credentials are an outcome, not an error: only storage failures
//! surface as `Err`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::storage::Database;
use crate::users::{User, UserUpdate};

/// Storage key holding the logged-in user's id
pub const SESSION_KEY: &str = "fieldwork.session.userId";

/// What the shell knows about the session
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Session restore has not run yet (the shell shows a splash)
    Loading,
    /// A user is signed in
    Authenticated(User),
    /// No session
    Unauthenticated,
}

/// Result of a login attempt
///
/// `Failure` carries the message the login screen shows; it is deliberately
/// the same for an unknown username and a wrong password.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Credentials matched
    Success(User),
    /// Credentials did not match
    Failure {
        /// User-facing message
        message: String,
    },
}

/// Session service over the database and its store
pub struct AuthService {
    database: Arc<Database>,
    state: RwLock<AuthState>,
}

impl AuthService {
    /// Create the service in the `Loading` state. Call [`load`](Self::load)
    /// next to restore any persisted session.
    pub fn new(database: Arc<Database>) -> Self {
        Self {
            database,
            state: RwLock::new(AuthState::Loading),
        }
    }

    /// Current session state
    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read() {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Restore a persisted session.
    ///
    /// A stored id whose user no longer exists (or fails to parse) resolves
    /// to `Unauthenticated`, never an error: the user just signs in again.
    pub async fn load(&self) -> Result<AuthState> {
        let store = self.database.store();
        let state = match store.get(SESSION_KEY).await? {
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => match self.database.get_user(id).await? {
                    Some(user) => AuthState::Authenticated(user),
                    None => {
                        tracing::warn!(id, "Stored session points at a deleted user");
                        store.remove(SESSION_KEY).await?;
                        AuthState::Unauthenticated
                    }
                },
                Err(_) => {
                    store.remove(SESSION_KEY).await?;
                    AuthState::Unauthenticated
                }
            },
            None => AuthState::Unauthenticated,
        };

        *self.state.write() = state.clone();
        Ok(state)
    }

    /// Attempt a login. Username matches case-insensitively, the password
    /// must match exactly. On success the session is persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let user = self.database.find_user_by_username(username).await?;

        match user {
            Some(user) if user.password == password => {
                self.database
                    .store()
                    .set(SESSION_KEY, &user.id.to_string())
                    .await?;
                *self.state.write() = AuthState::Authenticated(user.clone());
                tracing::info!(id = user.id, username = %user.username, "Logged in");
                Ok(LoginOutcome::Success(user))
            }
            _ => {
                tracing::info!(username, "Login failed");
                Ok(LoginOutcome::Failure {
                    message: "Invalid username or password.".into(),
                })
            }
        }
    }

    /// Sign out and clear the persisted session
    pub async fn logout(&self) -> Result<()> {
        self.database.store().remove(SESSION_KEY).await?;
        *self.state.write() = AuthState::Unauthenticated;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Update the signed-in user's profile and refresh the session copy
    pub async fn update_profile(&self, update: UserUpdate) -> Result<User> {
        let current = self.current_user().ok_or(Error::NotAuthenticated)?;
        let updated = self.database.update_user(current.id, update).await?;
        *self.state.write() = AuthState::Authenticated(updated.clone());
        Ok(updated)
    }

    /// Re-read the signed-in user from storage (e.g. after an admin edit
    /// from another screen). A deleted user drops the session.
    pub async fn refresh(&self) -> Result<AuthState> {
        let current = match self.current_user() {
            Some(user) => user,
            None => return Ok(self.state()),
        };

        let state = match self.database.get_user(current.id).await? {
            Some(user) => AuthState::Authenticated(user),
            None => {
                self.database.store().remove(SESSION_KEY).await?;
                AuthState::Unauthenticated
            }
        };

        *self.state.write() = state.clone();
        Ok(state)
    }
}

// ============================================================================
// TESTS
// ============================================================================
