use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored message as the core sees it. Author and participants are
/// still raw user ids here; they are resolved at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub id: Uuid,
    /// Insertion order assigned by the store.
    pub seq: i64,
    pub content: String,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub participants: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl MessageRecord {
    /// Whether the user authored or is listed on this message.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.author_id == user_id || self.participants.contains(&user_id)
    }
}

/// Everything needed to insert a message. The store assigns `seq`.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub participants: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}
