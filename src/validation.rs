// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request validation.
//!
//! Everything here is pure: validators turn raw request input into normalized
//! values or an [`AppError::BadRequest`], and never touch the database. Handlers
//! run them before any store call so a rejected request leaves no partial state.

use crate::error::{AppError, Result};
use crate::models::event::GUEST_CREATOR_EMAIL;
use crate::models::user::DEFAULT_ROLE;
use crate::models::{EventPatch, NewEvent, ProfileUpdate};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

/// Length of a Firestore auto-generated document ID.
pub const EVENT_ID_LEN: usize = 20;

/// Firestore rejects document IDs longer than this many bytes.
const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// Formats accepted for timestamps without an offset (interpreted as UTC).
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Years that format as four digits in RFC3339.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

// ─── Field validators ────────────────────────────────────────

/// Check that a path segment is a well-formed event ID.
///
/// A malformed ID is a client error, distinct from a well-formed ID that
/// matches no document.
pub fn parse_event_id(raw: &str) -> Result<String> {
    if raw.len() == EVENT_ID_LEN && raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(raw.to_string())
    } else {
        Err(AppError::BadRequest("Invalid event ID".to_string()))
    }
}

/// Require a non-blank email, returning it trimmed.
pub fn require_email(value: Option<&str>, field: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

/// Parse a client-supplied event date.
///
/// Accepts RFC3339, or `YYYY-MM-DDTHH:MM[:SS[.fff]]` and `YYYY-MM-DD` which are
/// taken as UTC. Years must have four digits so the stored RFC3339 string can
/// be read back and still sorts chronologically.
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    let invalid = || AppError::BadRequest(format!("Invalid eventDate: {:?}", raw));

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(invalid)?;

    if !STORABLE_YEARS.contains(&parsed.year()) {
        return Err(AppError::BadRequest(format!(
            "eventDate year must be between {} and {}",
            STORABLE_YEARS.start(),
            STORABLE_YEARS.end()
        )));
    }
    Ok(parsed)
}

/// Parse an event date that must be strictly after `now`.
pub fn parse_future_date(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let date = parse_event_date(raw)?;
    if date <= now {
        return Err(AppError::BadRequest(
            "eventDate must be in the future".to_string(),
        ));
    }
    Ok(date)
}

/// Check that a uid can be used as a Firestore document ID.
pub fn validate_uid(uid: &str) -> Result<()> {
    let reserved = uid.len() >= 4 && uid.starts_with("__") && uid.ends_with("__");
    if uid.len() > MAX_DOCUMENT_ID_BYTES
        || uid.contains('/')
        || uid == "."
        || uid == ".."
        || reserved
    {
        return Err(AppError::BadRequest("Invalid uid".to_string()));
    }
    Ok(())
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Collapse `validator` errors into one message naming the offending fields.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|k| snake_to_camel(k.as_ref()))
        .collect();
    fields.sort();
    format!("Missing or empty fields: {}", fields.join(", "))
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

// ─── Create ──────────────────────────────────────────────────

/// Body of `POST /api/events`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(required, custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub event_type: Option<String>,
    #[serde(alias = "thumbnail1")]
    #[validate(required, custom(function = "not_blank"))]
    pub thumbnail: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub location: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub event_date: Option<String>,
    pub creator_email: Option<String>,
}

impl CreateEventRequest {
    /// Validate and normalize into a [`NewEvent`].
    ///
    /// Missing fields are reported before the date is checked.
    pub fn into_new_event(self, now: DateTime<Utc>) -> Result<NewEvent> {
        self.validate()
            .map_err(|e| AppError::BadRequest(describe(&e)))?;

        let event_date = parse_future_date(self.event_date.as_deref().unwrap_or_default(), now)?;
        let creator_email = self
            .creator_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| GUEST_CREATOR_EMAIL.to_string());

        Ok(NewEvent {
            title: trimmed(self.title),
            description: trimmed(self.description),
            event_type: trimmed(self.event_type),
            thumbnail: trimmed(self.thumbnail),
            location: trimmed(self.location),
            event_date,
            creator_email,
        })
    }
}

// ─── Update ──────────────────────────────────────────────────

/// Body of `PATCH /api/events/{id}`.
///
/// Unknown fields are rejected so clients cannot write arbitrary data.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEventRequest {
    /// Ownership proof; never written
    pub creator_email: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub event_type: Option<String>,
    #[serde(alias = "thumbnail1")]
    #[validate(custom(function = "not_blank"))]
    pub thumbnail: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub location: Option<String>,
    pub event_date: Option<String>,
}

impl UpdateEventRequest {
    /// Split into the caller's claimed creator email and a typed patch.
    pub fn into_patch(self) -> Result<(String, EventPatch)> {
        let creator_email = require_email(self.creator_email.as_deref(), "creatorEmail")?;
        self.validate()
            .map_err(|e| AppError::BadRequest(describe(&e)))?;

        let event_date = self
            .event_date
            .as_deref()
            .map(parse_event_date)
            .transpose()?;

        let patch = EventPatch {
            title: self.title.map(|v| v.trim().to_string()),
            description: self.description.map(|v| v.trim().to_string()),
            event_type: self.event_type.map(|v| v.trim().to_string()),
            thumbnail: self.thumbnail.map(|v| v.trim().to_string()),
            location: self.location.map(|v| v.trim().to_string()),
            event_date,
        };

        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "No updatable fields supplied".to_string(),
            ));
        }

        Ok((creator_email, patch))
    }
}

// ─── Users ───────────────────────────────────────────────────

/// Body of `POST /api/LOGIN_USER/save-user`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserRequest {
    #[validate(required, custom(function = "not_blank"))]
    pub uid: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: Option<String>,
}

impl SaveUserRequest {
    pub fn into_profile_update(self) -> Result<ProfileUpdate> {
        self.validate()
            .map_err(|e| AppError::BadRequest(describe(&e)))?;

        let uid = trimmed(self.uid);
        validate_uid(&uid)?;

        let role = self
            .role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(ProfileUpdate {
            uid,
            email: trimmed(self.email),
            full_name: self.full_name,
            photo_url: self.photo_url,
            role,
        })
    }
}
