//! # Ports
//!
//! The persistence and identity contracts the core depends on.
//! Calls are blocking; async callers run the core on a blocking thread.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use parley_types::models::PublicUser;

use crate::records::{MessageRecord, NewMessage};

/// Durable message records.
pub trait MessageStore: Send + Sync {
    fn get_message(&self, id: Uuid) -> anyhow::Result<Option<MessageRecord>>;

    /// Every message the user authored or is listed as a participant of,
    /// in insertion order.
    fn messages_involving(&self, user_id: Uuid) -> anyhow::Result<Vec<MessageRecord>>;

    /// The earliest-inserted message whose parent is `parent_id`.
    fn child_of(&self, parent_id: Uuid) -> anyhow::Result<Option<MessageRecord>>;

    fn insert_message(&self, message: &NewMessage) -> anyhow::Result<MessageRecord>;

    /// Replace content and timestamp. Returns `None` if the message is gone.
    fn update_content(
        &self,
        id: Uuid,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<Option<MessageRecord>>;

    /// Returns whether a row was removed.
    fn delete_message(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Resolves user ids to public profiles.
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` for ids whose user no longer exists.
    fn resolve(&self, user_id: Uuid) -> anyhow::Result<Option<PublicUser>>;
}
