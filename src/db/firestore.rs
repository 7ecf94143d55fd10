// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore handle.
//!
//! Typed operations live next to their collection:
//! - [`crate::db::events`] for community events
//! - [`crate::db::users`] for login profiles

use crate::db::collections;
use crate::error::AppError;

/// Emulator address; when set, no Google credentials are looked up.
const EMULATOR_HOST_VAR: &str = "FIRESTORE_EMULATOR_HOST";

/// Unsigned JWT the emulator accepts as a bearer token.
const EMULATOR_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0.";

/// Shared Firestore handle. Offline when built with [`FirestoreDb::new_mock`].
#[derive(Clone)]
pub struct FirestoreDb {
    inner: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Connect to the project, or to the emulator if one is configured.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        let emulator = std::env::var(EMULATOR_HOST_VAR).ok();
        let inner = match &emulator {
            Some(_) => Self::connect_emulator(project_id).await?,
            None => firestore::FirestoreDb::new(project_id).await.map_err(|e| {
                AppError::Database(format!("Failed to connect to Firestore: {}", e))
            })?,
        };

        tracing::info!(
            project = project_id,
            emulator = emulator.as_deref(),
            "Connected to Firestore"
        );
        Ok(Self { inner: Some(inner) })
    }

    async fn connect_emulator(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(EMULATOR_TOKEN.to_string().into()),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        firestore::FirestoreDb::with_options_token_source(
            firestore::FirestoreDbOptions::new(project_id.to_string()),
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to Firestore emulator: {}", e)))
    }

    /// A handle with no connection. Every operation fails with a database error.
    pub fn new_mock() -> Self {
        Self { inner: None }
    }

    /// The live client, or a database error when offline.
    pub(crate) fn handle(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.inner
            .as_ref()
            .ok_or_else(|| AppError::Database("Firestore is offline".to_string()))
    }

    /// Round-trip to the store to prove the connection is usable.
    pub async fn ping(&self) -> Result<(), AppError> {
        let _ = self
            .handle()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .limit(1)
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
