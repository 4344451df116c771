//! # Users Module
//!
//! User accounts for the mission marketplace. Two roles exist: admins run
//! the back office (user and mission CRUD), technicians work missions.
//! Role gating happens in the app shell; nothing here enforces it.
//!
//! Records are persisted exactly as the app's storage layout expects
//! (camelCase keys, RFC 3339 `createdAt`), so a create followed by a read
//! returns a deep-equal record.

use serde::{Deserialize, Serialize};

/// A user's role, gating which screens the shell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office account: user and mission CRUD
    Admin,
    /// Field account: accepts and works missions
    Technician,
}

impl Role {
    /// Convert to the persisted string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Technician => "technician",
        }
    }

    /// Parse from the persisted string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "technician" => Some(Role::Technician),
            _ => None,
        }
    }
}

/// A user account record
///
/// Passwords are stored in plaintext — a documented property of the storage
/// layout this crate replicates, not an invitation to reuse it elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Sequentially assigned unique id
    pub id: i64,
    /// Login name, unique case-insensitively
    pub username: String,
    /// Plaintext password
    pub password: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Account role
    pub role: Role,
    /// Optional profile picture URI
    pub profile_picture: Option<String>,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

impl User {
    /// Display name for lists and chat headers
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for registration and the admin create-user panel
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name (uniqueness checked case-insensitively on create)
    pub username: String,
    /// Plaintext password
    pub password: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Account role
    pub role: Role,
    /// Optional profile picture URI
    pub profile_picture: Option<String>,
}

/// Partial update for self-service profile edits and the admin panel
///
/// `None` fields are left untouched. The profile picture is doubly optional
/// so `Some(None)` can clear it.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New username
    pub username: Option<String>,
    /// New password
    pub password: Option<String>,
    /// New first name
    pub first_name: Option<String>,
    /// New last name
    pub last_name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New role (admin panel only)
    pub role: Option<Role>,
    /// Set (`Some(Some(uri))`) or clear (`Some(None)`) the profile picture
    pub profile_picture: Option<Option<String>>,
}

impl UserUpdate {
    /// Apply this update to a user record in place
    pub fn apply(&self, user: &mut User) {
        if let Some(ref username) = self.username {
            user.username = username.clone();
        }
        if let Some(ref password) = self.password {
            user.password = password.clone();
        }
        if let Some(ref first_name) = self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(ref picture) = self.profile_picture {
            user.profile_picture = picture.clone();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "jdoe".into(),
            password: "secret".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            role: Role::Technician,
            profile_picture: None,
            created_at: "2026-01-15T09:00:00.000Z".into(),
        }
    }

    #[test]
    fn test_role_strings() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::parse("technician"), Some(Role::Technician));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(json.contains("\"firstName\":\"Jane\""));
        assert!(json.contains("\"profilePicture\":null"));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"role\":\"technician\""));
    }

    #[test]
    fn test_user_json_roundtrip() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        let restored: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, restored);
    }

    #[test]
    fn test_update_applies_partial_fields() {
        let mut user = sample_user();
        let update = UserUpdate {
            email: Some("jane.doe@example.com".into()),
            profile_picture: Some(Some("file:///avatar.png".into())),
            ..Default::default()
        };

        update.apply(&mut user);

        assert_eq!(user.email, "jane.doe@example.com");
        assert_eq!(user.profile_picture.as_deref(), Some("file:///avatar.png"));
        // Untouched fields survive
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.role, Role::Technician);
    }

    #[test]
    fn test_update_clears_profile_picture() {
        let mut user = sample_user();
        user.profile_picture = Some("file:///old.png".into());

        let update = UserUpdate {
            profile_picture: Some(None),
            ..Default::default()
        };
        update.apply(&mut user);

        assert!(user.profile_picture.is_none());
    }
}
