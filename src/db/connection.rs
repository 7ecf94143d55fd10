// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lazily-established, process-wide database handle.

use crate::db::FirestoreDb;
use crate::error::AppError;
use tokio::sync::OnceCell;

/// Hands out the single Firestore handle for the process.
///
/// The first [`get_connection`](Self::get_connection) call connects; every
/// later call returns the cached handle. Concurrent first calls wait on the
/// same initialization, so at most one connection is established.
pub struct ConnectionProvider {
    project_id: String,
    db: OnceCell<FirestoreDb>,
}

impl ConnectionProvider {
    /// Provider that connects to `project_id` on first use.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            db: OnceCell::new(),
        }
    }

    /// Provider around an already-built handle (e.g. an offline mock).
    pub fn with_connection(db: FirestoreDb) -> Self {
        Self {
            project_id: String::new(),
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Get the database handle, connecting on the first call.
    pub async fn get_connection(&self) -> Result<&FirestoreDb, AppError> {
        self.db
            .get_or_try_init(|| async {
                tracing::info!(project = %self.project_id, "Establishing database connection");
                FirestoreDb::new(&self.project_id).await
            })
            .await
    }

    /// Whether the handle has been established.
    pub fn is_connected(&self) -> bool {
        self.db.initialized()
    }
}
