// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login profile routes.
//!
//! Called by the web client after every sign-in to record the profile.

use crate::error::Result;
use crate::models::UpsertOutcome;
use crate::routes::json_body;
use crate::validation::SaveUserRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/LOGIN_USER/save-user", post(save_user))
}

/// Response for save-user. `id` is only present for a new profile.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SaveUserResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

async fn save_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<SaveUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveUserResponse>)> {
    let update = json_body(body)?.into_profile_update()?;
    let uid = update.uid.clone();
    tracing::debug!(uid = %uid, "Saving user profile");

    let db = state.connections.get_connection().await?;
    let response = match db.save_user_profile(update, chrono::Utc::now()).await? {
        UpsertOutcome::Created => (
            StatusCode::CREATED,
            Json(SaveUserResponse {
                message: "New user created".to_string(),
                id: Some(uid),
            }),
        ),
        UpsertOutcome::Updated => (
            StatusCode::OK,
            Json(SaveUserResponse {
                message: "User data updated".to_string(),
                id: None,
            }),
        ),
    };

    Ok(response)
}
