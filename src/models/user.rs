//! User profile model for storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned when the client does not send one.
pub const DEFAULT_ROLE: &str = "user";

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// External login identifier (also used as document ID)
    pub uid: String,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: String,
    /// When the profile was first saved; never overwritten
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub last_login: DateTime<Utc>,
}

/// Validated save-user input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub uid: String,
    pub email: String,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub role: String,
}

/// Fields rewritten on every save for an existing profile.
pub const REFRESHED_FIELDS: [&str; 5] = ["email", "fullName", "photoURL", "role", "lastLogin"];

/// Whether a save created the profile or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UserProfile {
    /// Profile for a first login.
    pub fn first_login(update: ProfileUpdate, now: DateTime<Utc>) -> Self {
        Self {
            uid: update.uid,
            email: update.email,
            full_name: update.full_name,
            photo_url: update.photo_url,
            role: update.role,
            created_at: now,
            last_login: now,
        }
    }
}
