//! In-memory fakes for the core's ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use parley_types::models::PublicUser;

use crate::records::{MessageRecord, NewMessage};
use crate::traits::{IdentityResolver, MessageStore};

pub fn record(seq: i64, author_id: Uuid, parent_id: Option<Uuid>) -> MessageRecord {
    MessageRecord {
        id: Uuid::new_v4(),
        seq,
        content: "hello".into(),
        author_id,
        parent_id,
        participants: vec![author_id],
        timestamp: Utc::now(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<MessageRecord>>,
}

impl MemoryStore {
    /// Append with the next sequence number.
    pub fn push(&self, mut message: MessageRecord) -> MessageRecord {
        let mut messages = self.messages.lock().unwrap();
        message.seq = messages.len() as i64 + 1;
        messages.push(message.clone());
        message
    }

    pub fn remove(&self, id: Uuid) {
        self.messages.lock().unwrap().retain(|m| m.id != id);
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl MessageStore for MemoryStore {
    fn get_message(&self, id: Uuid) -> anyhow::Result<Option<MessageRecord>> {
        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().find(|m| m.id == id).cloned())
    }

    fn messages_involving(&self, user_id: Uuid) -> anyhow::Result<Vec<MessageRecord>> {
        let messages = self.messages.lock().unwrap();
        Ok(messages
            .iter()
            .filter(|m| m.author_id == user_id || m.participants.contains(&user_id))
            .cloned()
            .collect())
    }

    fn child_of(&self, parent_id: Uuid) -> anyhow::Result<Option<MessageRecord>> {
        let messages = self.messages.lock().unwrap();
        Ok(messages
            .iter()
            .find(|m| m.parent_id == Some(parent_id))
            .cloned())
    }

    fn insert_message(&self, message: &NewMessage) -> anyhow::Result<MessageRecord> {
        Ok(self.push(MessageRecord {
            id: message.id,
            seq: 0,
            content: message.content.clone(),
            author_id: message.author_id,
            parent_id: message.parent_id,
            participants: message.participants.clone(),
            timestamp: message.timestamp,
        }))
    }

    fn update_content(
        &self,
        id: Uuid,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<Option<MessageRecord>> {
        let mut messages = self.messages.lock().unwrap();
        Ok(messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.content = content.to_string();
            m.timestamp = timestamp;
            m.clone()
        }))
    }

    fn delete_message(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.id != id);
        Ok(messages.len() != before)
    }
}

#[derive(Default)]
pub struct Directory {
    users: HashMap<Uuid, PublicUser>,
    calls: AtomicUsize,
}

impl Directory {
    pub fn add(&mut self, first_name: &str, last_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.insert(
            id,
            PublicUser {
                id,
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: format!("{}@email.com", first_name.to_lowercase()),
            },
        );
        id
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl IdentityResolver for Directory {
    fn resolve(&self, user_id: Uuid) -> anyhow::Result<Option<PublicUser>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.users.get(&user_id).cloned())
    }
}
