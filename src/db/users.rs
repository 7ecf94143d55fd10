// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile operations on the `users` collection.

use crate::db::{collections, is_conflict, FirestoreDb};
use crate::error::AppError;
use crate::models::user::REFRESHED_FIELDS;
use crate::models::{ProfileUpdate, UpsertOutcome, UserProfile};
use chrono::{DateTime, Utc};

impl FirestoreDb {
    /// Get a user profile by uid.
    pub async fn get_user_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.handle()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create the profile on first login, otherwise refresh it.
    ///
    /// The create is an insert keyed by uid, which the store rejects if the
    /// document already exists. Exactly one of several concurrent first
    /// logins therefore reports `Created`; the rest fall through to the
    /// refresh, whose field mask leaves `createdAt` alone.
    pub async fn save_user_profile(
        &self,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<UpsertOutcome, AppError> {
        let client = self.handle()?;
        let profile = UserProfile::first_login(update, now);

        let inserted: Result<(), _> = client
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&profile.uid)
            .object(&profile)
            .execute()
            .await;

        let outcome = match inserted {
            Ok(()) => UpsertOutcome::Created,
            Err(e) if is_conflict(&e) => {
                let _: () = client
                    .fluent()
                    .update()
                    .fields(REFRESHED_FIELDS)
                    .in_col(collections::USERS)
                    .document_id(&profile.uid)
                    .object(&profile)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                UpsertOutcome::Updated
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        };

        tracing::info!(uid = %profile.uid, outcome = ?outcome, "User profile saved");
        Ok(outcome)
    }
}
