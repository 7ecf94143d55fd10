// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Community event model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Creator recorded when a client does not supply one.
pub const GUEST_CREATOR_EMAIL: &str = "guest@example.com";

/// Stored event record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Firestore document ID (assigned on insert, never written as a field)
    #[serde(alias = "_firestore_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    /// Category used for equality filtering (e.g. "tech", "cleanup")
    pub event_type: String,
    /// Thumbnail image URL
    pub thumbnail: String,
    pub location: String,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub event_date: DateTime<Utc>,
    /// Owner identity; only this value authorizes update and delete
    pub creator_email: String,
    /// Emails of users who joined, without duplicates
    #[serde(default)]
    pub joined_users: Vec<String>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub thumbnail: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub creator_email: String,
}

impl Event {
    /// Build a fresh, not-yet-stored event.
    pub fn new(input: NewEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: input.title,
            description: input.description,
            event_type: input.event_type,
            thumbnail: input.thumbnail,
            location: input.location,
            event_date: input.event_date,
            creator_email: input.creator_email,
            joined_users: Vec::new(),
            created_at: now,
        }
    }

    /// Plaintext ownership check against the stored creator email.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.creator_email == email
    }

    /// Case-insensitive substring match against title or location.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.location.to_lowercase().contains(needle)
    }
}

/// Validated partial update. Only the fields listed here can ever be patched;
/// `creator_email`, `joined_users` and `created_at` are not representable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub thumbnail: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Stored field names touched by this patch (used as the update mask).
    pub fn field_paths(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("description", self.description.is_some()),
            ("eventType", self.event_type.is_some()),
            ("thumbnail", self.thumbnail.is_some()),
            ("location", self.location.is_some()),
            ("eventDate", self.event_date.is_some()),
        ]
        .into_iter()
        .filter_map(|(path, set)| set.then_some(path))
        .collect()
    }

    /// Apply the patched fields to an event in memory.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(event_type) = &self.event_type {
            event.event_type = event_type.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            event.thumbnail = thumbnail.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(event_date) = self.event_date {
            event.event_date = event_date;
        }
    }
}

/// Event as returned by the API. `_id` keeps the shape the web client reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub thumbnail: String,
    pub location: String,
    pub event_date: String,
    pub creator_email: String,
    pub joined_users: Vec<String>,
    pub created_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        use crate::time_utils::format_utc_rfc3339;

        Self {
            id: event.id.unwrap_or_default(),
            title: event.title,
            description: event.description,
            event_type: event.event_type,
            thumbnail: event.thumbnail,
            location: event.location,
            event_date: format_utc_rfc3339(event.event_date),
            creator_email: event.creator_email,
            joined_users: event.joined_users,
            created_at: format_utc_rfc3339(event.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Event::new(
            NewEvent {
                title: "Tree Planting Drive".to_string(),
                description: "Bring gloves".to_string(),
                event_type: "cleanup".to_string(),
                thumbnail: "https://img.example/tree.png".to_string(),
                location: "Mirpur, Dhaka".to_string(),
                event_date: now + chrono::Duration::days(3),
                creator_email: "a@x.com".to_string(),
            },
            now,
        )
    }

    #[test]
    fn test_new_event_starts_without_members() {
        let event = sample_event();
        assert!(event.id.is_none());
        assert!(event.joined_users.is_empty());
        assert_eq!(
            event.created_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_matches_search_title_or_location() {
        let event = sample_event();
        assert!(event.matches_search("dhaka"));
        assert!(event.matches_search("tree"));
        assert!(event.matches_search("planting drive"));
        assert!(!event.matches_search("chittagong"));
        // Description is not searched
        assert!(!event.matches_search("gloves"));
    }

    #[test]
    fn test_ownership_is_exact_match() {
        let event = sample_event();
        assert!(event.is_owned_by("a@x.com"));
        assert!(!event.is_owned_by("A@x.com"));
        assert!(!event.is_owned_by("b@x.com"));
    }

    #[test]
    fn test_patch_field_paths_and_apply() {
        let mut event = sample_event();
        let new_date = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            event_date: Some(new_date),
            ..Default::default()
        };

        assert_eq!(patch.field_paths(), vec!["title", "eventDate"]);
        patch.apply_to(&mut event);

        assert_eq!(event.title, "Renamed");
        assert_eq!(event.event_date, new_date);
        assert_eq!(event.location, "Mirpur, Dhaka");
        assert_eq!(event.creator_email, "a@x.com");
    }

    #[test]
    fn test_empty_patch() {
        assert!(EventPatch::default().is_empty());
    }

    #[test]
    fn test_storage_shape() {
        let mut event = sample_event();
        let value = serde_json::to_value(&event).unwrap();
        // No id field is written for new documents
        assert!(value.get("id").is_none());
        assert_eq!(value["eventDate"], "2026-03-04T12:00:00.000Z");
        assert_eq!(value["joinedUsers"], serde_json::json!([]));

        event.id = Some("abcdefghij0123456789".to_string());
        let response = EventResponse::from(event);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["_id"], "abcdefghij0123456789");
        assert_eq!(value["creatorEmail"], "a@x.com");
    }

    #[test]
    fn test_reads_firestore_document_id() {
        let raw = serde_json::json!({
            "_firestore_id": "abcdefghij0123456789",
            "title": "t",
            "description": "d",
            "eventType": "tech",
            "thumbnail": "u",
            "location": "l",
            "eventDate": "2026-03-04T12:00:00.000Z",
            "creatorEmail": "a@x.com",
            "createdAt": "2026-03-01T12:00:00.000Z"
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.id.as_deref(), Some("abcdefghij0123456789"));
        assert!(event.joined_users.is_empty());
    }
}
