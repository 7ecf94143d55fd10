// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event routes.
//!
//! Every handler validates its input before touching the database, so a
//! rejected request never leaves a partial write behind.

use crate::db::UpcomingFilter;
use crate::error::{AppError, Result};
use crate::models::EventResponse;
use crate::routes::{json_body, MessageResponse};
use crate::validation::{parse_event_id, require_email, CreateEventRequest, UpdateEventRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", post(create_event))
        .route(
            "/api/events/upcoming",
            get(list_upcoming)
                .patch(reserved_event_id)
                .delete(reserved_event_id),
        )
        .route(
            "/api/events/my",
            get(list_mine).patch(reserved_event_id).delete(reserved_event_id),
        )
        .route(
            "/api/events/joined",
            get(list_joined)
                .patch(reserved_event_id)
                .delete(reserved_event_id),
        )
        .route(
            "/api/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/api/events/{id}/join", post(join_event))
}

// ─── Listings ────────────────────────────────────────────────

#[derive(Deserialize)]
struct UpcomingQuery {
    /// Event type, or "all"
    #[serde(rename = "type")]
    event_type: Option<String>,
    /// Text matched against title and location
    search: Option<String>,
}

#[derive(Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

fn to_responses(events: Vec<crate::models::Event>) -> Vec<EventResponse> {
    events.into_iter().map(EventResponse::from).collect()
}

/// Upcoming events, soonest first.
async fn list_upcoming(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UpcomingQuery>,
) -> Result<Json<Vec<EventResponse>>> {
    tracing::debug!(
        event_type = ?params.event_type,
        search = ?params.search,
        "Fetching upcoming events"
    );

    let filter = UpcomingFilter {
        event_type: params.event_type,
        search: params.search,
    };

    let db = state.connections.get_connection().await?;
    let events = db.list_upcoming_events(&filter, chrono::Utc::now()).await?;

    Ok(Json(to_responses(events)))
}

/// Events created by the given email.
async fn list_mine(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<Vec<EventResponse>>> {
    let email = require_email(params.email.as_deref(), "email")?;

    let db = state.connections.get_connection().await?;
    let events = db.list_events_by_creator(&email).await?;

    Ok(Json(to_responses(events)))
}

/// Events the given email has joined.
async fn list_joined(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<Vec<EventResponse>>> {
    let email = require_email(params.email.as_deref(), "email")?;

    let db = state.connections.get_connection().await?;
    let events = db.list_joined_events(&email).await?;

    Ok(Json(to_responses(events)))
}

// ─── Single Event ────────────────────────────────────────────

/// PATCH or DELETE on a listing path: the segment is not an event ID.
async fn reserved_event_id() -> Result<Json<MessageResponse>> {
    Err(AppError::BadRequest("Invalid event ID".to_string()))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>> {
    let id = parse_event_id(&id)?;

    let db = state.connections.get_connection().await?;
    let event = db
        .get_event(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    Ok(Json(event.into()))
}

// ─── Mutations ───────────────────────────────────────────────

/// Response for a newly created event.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let now = chrono::Utc::now();
    let input = json_body(body)?.into_new_event(now)?;

    let db = state.connections.get_connection().await?;
    let id = db.create_event(input, now).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Event created".to_string(),
            id,
        }),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest {
    user_email: Option<String>,
}

async fn join_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: std::result::Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let email = require_email(json_body(body)?.user_email.as_deref(), "userEmail")?;
    let id = parse_event_id(&id)?;

    let db = state.connections.get_connection().await?;
    db.join_event(&id, &email).await?;

    Ok(Json(MessageResponse::new("Joined successfully")))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let (creator_email, patch) = json_body(body)?.into_patch()?;
    let id = parse_event_id(&id)?;

    let db = state.connections.get_connection().await?;
    db.update_event(&id, &creator_email, &patch).await?;

    Ok(Json(MessageResponse::new("Event updated")))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteQuery {
    creator_email: Option<String>,
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteQuery>,
) -> Result<Json<MessageResponse>> {
    let id = parse_event_id(&id)?;
    let creator_email = require_email(params.creator_email.as_deref(), "creatorEmail")?;

    let db = state.connections.get_connection().await?;
    db.delete_event(&id, &creator_email).await?;

    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
