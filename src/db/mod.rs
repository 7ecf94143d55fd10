//! Database layer (Firestore).

pub mod connection;
pub mod events;
pub mod firestore;
pub mod users;

pub use connection::ConnectionProvider;
pub use events::UpcomingFilter;
pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const EVENTS: &str = "events";
    /// User profiles (keyed by uid)
    pub const USERS: &str = "users";
}

use ::firestore::errors::FirestoreError;

/// The store refused a create because the document already exists.
pub(crate) fn is_conflict(e: &FirestoreError) -> bool {
    matches!(e, FirestoreError::DataConflictError(_))
}

/// The store refused a write because the document does not exist.
pub(crate) fn is_missing(e: &FirestoreError) -> bool {
    matches!(e, FirestoreError::DataNotFoundError(_))
}
