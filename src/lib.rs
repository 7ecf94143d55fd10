// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Community Events: list, create, join and manage community events
//!
//! This crate provides the REST backend for the events web client, storing
//! events and login profiles in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::ConnectionProvider;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub connections: ConnectionProvider,
}
