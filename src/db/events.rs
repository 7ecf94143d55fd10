// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event operations on the `events` collection.

use crate::db::{collections, is_missing};
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Event, EventPatch, NewEvent};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{FirestoreQueryDirection, FirestoreWritePrecondition};

/// Type value meaning "no type filter".
pub const ALL_EVENT_TYPES: &str = "all";

const JOINED_USERS_FIELD: &str = "joinedUsers";

/// Optional filters for the upcoming-events listing.
#[derive(Debug, Clone, Default)]
pub struct UpcomingFilter {
    /// Exact event type; `None`, blank, or [`ALL_EVENT_TYPES`] disables it
    pub event_type: Option<String>,
    /// Case-insensitive substring matched against title or location
    pub search: Option<String>,
}

impl UpcomingFilter {
    /// Event type to filter on in the store, if any.
    pub fn type_filter(&self) -> Option<String> {
        self.event_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != ALL_EVENT_TYPES)
            .map(str::to_string)
    }

    /// Lowercased search needle, if any.
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Apply the in-process part of the filter (text search).
    ///
    /// Firestore has no substring operator, so the date and type filters run
    /// in the query and the search runs here on the sorted results.
    pub fn retain_matching(&self, events: Vec<Event>) -> Vec<Event> {
        match self.search_needle() {
            Some(needle) => events
                .into_iter()
                .filter(|e| e.matches_search(&needle))
                .collect(),
            None => events,
        }
    }
}

impl FirestoreDb {
    /// Events strictly after `now`, ascending by date.
    pub async fn list_upcoming_events(
        &self,
        filter: &UpcomingFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, AppError> {
        let now = format_utc_rfc3339(now);
        let event_type = filter.type_filter();

        let events: Vec<Event> = self
            .handle()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .filter(move |q| {
                q.for_all([
                    q.field("eventDate").greater_than(now.clone()),
                    event_type
                        .clone()
                        .and_then(|event_type| q.field("eventType").eq(event_type)),
                ])
            })
            .order_by([("eventDate", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(filter.retain_matching(events))
    }

    /// Events created by `email`, newest event date first.
    pub async fn list_events_by_creator(&self, email: &str) -> Result<Vec<Event>, AppError> {
        let email = email.to_string();
        self.handle()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .filter(move |q| q.for_all([q.field("creatorEmail").eq(email.clone())]))
            .order_by([("eventDate", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events `email` has joined, ascending by date.
    pub async fn list_joined_events(&self, email: &str) -> Result<Vec<Event>, AppError> {
        let email = email.to_string();
        self.handle()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .filter(move |q| q.for_all([q.field(JOINED_USERS_FIELD).array_contains(email.clone())]))
            .order_by([("eventDate", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an event by document ID.
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        self.handle()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an event or fail with `NotFound`.
    async fn require_event(&self, id: &str) -> Result<Event, AppError> {
        self.get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    /// Store a new event and return its generated document ID.
    pub async fn create_event(
        &self,
        input: NewEvent,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let event = Event::new(input, now);

        let stored: Event = self
            .handle()?
            .fluent()
            .insert()
            .into(collections::EVENTS)
            .generate_document_id()
            .object(&event)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id = stored
            .id
            .ok_or_else(|| {
                anyhow::anyhow!("Insert into {} returned no document ID", collections::EVENTS)
            })?;

        tracing::info!(
            event_id = %id,
            creator = %event.creator_email,
            event_type = %event.event_type,
            "Event created"
        );

        Ok(id)
    }

    /// Add `email` to the event's members. Adding an existing member is a no-op.
    ///
    /// The transform only applies to an existing document, so joining an event
    /// that was deleted is `NotFound` and does not bring it back.
    pub async fn join_event(&self, id: &str, email: &str) -> Result<(), AppError> {
        let client = self.handle()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let member = email.to_string();
        client
            .fluent()
            .update()
            .in_col(collections::EVENTS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .transforms(|t| {
                t.fields([t
                    .field(JOINED_USERS_FIELD)
                    .append_missing_elements([member.clone()])])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add join to transaction: {}", e))
            })?;

        transaction.commit().await.map_err(|e| write_error(id, e))?;

        tracing::info!(event_id = id, member = email, "User joined event");
        Ok(())
    }

    /// Patch an event on behalf of `creator_email`.
    ///
    /// Only the patched fields are written; a concurrent join is not lost.
    pub async fn update_event(
        &self,
        id: &str,
        creator_email: &str,
        patch: &EventPatch,
    ) -> Result<(), AppError> {
        let mut event = self.require_event(id).await?;

        if !event.is_owned_by(creator_email) {
            tracing::warn!(event_id = id, caller = creator_email, "Rejected update by non-owner");
            return Err(AppError::Forbidden(
                "Only the creator can update this event".to_string(),
            ));
        }

        patch.apply_to(&mut event);
        self.write_patch(id, &event, patch).await?;

        tracing::info!(event_id = id, fields = ?patch.field_paths(), "Event updated");
        Ok(())
    }

    /// Write the patched fields of `event`, failing if the document is gone.
    async fn write_patch(
        &self,
        id: &str,
        event: &Event,
        patch: &EventPatch,
    ) -> Result<(), AppError> {
        let _: () = self
            .handle()?
            .fluent()
            .update()
            .fields(patch.field_paths())
            .in_col(collections::EVENTS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .object(event)
            .execute()
            .await
            .map_err(|e| write_error(id, e))?;
        Ok(())
    }

    /// Delete an event on behalf of `creator_email`.
    pub async fn delete_event(&self, id: &str, creator_email: &str) -> Result<(), AppError> {
        let event = self.require_event(id).await?;

        if !event.is_owned_by(creator_email) {
            tracing::warn!(event_id = id, caller = creator_email, "Rejected delete by non-owner");
            return Err(AppError::Forbidden(
                "Only the creator can delete this event".to_string(),
            ));
        }

        self.handle()?
            .fluent()
            .delete()
            .from(collections::EVENTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(event_id = id, "Event deleted");
        Ok(())
    }
}

/// A write guarded by an existence precondition failed.
fn write_error(id: &str, e: FirestoreError) -> AppError {
    if is_missing(&e) {
        AppError::NotFound(format!("Event {} not found", id))
    } else {
        AppError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEvent;
    use chrono::TimeZone;

    fn new_event() -> NewEvent {
        NewEvent {
            title: "t".to_string(),
            description: "d".to_string(),
            event_type: "tech".to_string(),
            thumbnail: "u".to_string(),
            location: "l".to_string(),
            event_date: Utc::now() + chrono::Duration::days(1),
            creator_email: "a@x.com".to_string(),
        }
    }

    fn event(title: &str, location: &str) -> Event {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Event::new(
            NewEvent {
                title: title.to_string(),
                location: location.to_string(),
                event_date: now + chrono::Duration::days(1),
                ..new_event()
            },
            now,
        )
    }

    #[test]
    fn test_type_filter_ignores_all_and_blank() {
        let filter = |t: Option<&str>| UpcomingFilter {
            event_type: t.map(str::to_string),
            search: None,
        };
        assert_eq!(filter(None).type_filter(), None);
        assert_eq!(filter(Some("all")).type_filter(), None);
        assert_eq!(filter(Some("  ")).type_filter(), None);
        assert_eq!(filter(Some("tech")).type_filter(), Some("tech".to_string()));
    }

    #[test]
    fn test_search_matches_title_or_location_any_case() {
        let filter = UpcomingFilter {
            event_type: None,
            search: Some("DHAKA".to_string()),
        };
        let events = vec![
            event("Dhaka Rust Meetup", "Online"),
            event("Beach Cleanup", "Cox's Bazar"),
            event("Book Swap", "Old dhaka library"),
        ];

        let titles: Vec<String> = filter
            .retain_matching(events)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Dhaka Rust Meetup", "Book Swap"]);
    }

    #[test]
    fn test_search_is_literal_not_pattern() {
        let filter = UpcomingFilter {
            event_type: None,
            search: Some("c.t".to_string()),
        };
        assert!(filter.retain_matching(vec![event("cat show", "x")]).is_empty());
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let filter = UpcomingFilter {
            event_type: None,
            search: Some(" ".to_string()),
        };
        assert_eq!(filter.retain_matching(vec![event("a", "b")]).len(), 1);
    }

    #[tokio::test]
    async fn test_offline_db_surfaces_database_error() {
        let db = FirestoreDb::new_mock();
        let result = db.get_event("abcdefghij0123456789").await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_patch_write_does_not_recreate_deleted_event() {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_err() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }

        let db = FirestoreDb::new("test-project").await.unwrap();
        let id = db.create_event(new_event(), Utc::now()).await.unwrap();
        let mut stale = db.require_event(&id).await.unwrap();
        db.delete_event(&id, "a@x.com").await.unwrap();

        // The ownership check passed on a read taken before the delete.
        let patch = EventPatch {
            title: Some("Too late".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut stale);
        let result = db.write_patch(&id, &stale, &patch).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(db.get_event(&id).await.unwrap().is_none());
    }
}
