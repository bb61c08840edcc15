//! Authorship rules for creating, editing and deleting single messages.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use parley_types::models::MessageView;

use crate::error::{CoreError, Result};
use crate::identity::IdentityCache;
use crate::records::{MessageRecord, NewMessage};
use crate::traits::{IdentityResolver, MessageStore};

/// A new message as submitted, before validation.
#[derive(Debug, Default)]
pub struct Draft {
    pub content: Option<String>,
    pub parent_id: Option<Uuid>,
    pub participants: Option<Vec<Uuid>>,
}

pub struct MutationGuard<'a, S: ?Sized, R: ?Sized> {
    store: &'a S,
    identities: &'a R,
}

impl<'a, S, R> MutationGuard<'a, S, R>
where
    S: MessageStore + ?Sized,
    R: IdentityResolver + ?Sized,
{
    pub fn new(store: &'a S, identities: &'a R) -> Self {
        Self { store, identities }
    }

    /// The author is always a participant. An explicit list is kept in the
    /// order given, with the author prepended when missing.
    pub fn create(&self, author_id: Uuid, draft: Draft) -> Result<MessageView> {
        let content = required_content(draft.content.as_deref())?;

        if let Some(parent_id) = draft.parent_id {
            if self.store.get_message(parent_id)?.is_none() {
                return Err(CoreError::Validation("Parent message does not exist".into()));
            }
        }

        let participants = self.participants(author_id, draft.participants)?;

        let message = NewMessage {
            id: Uuid::new_v4(),
            content,
            author_id,
            parent_id: draft.parent_id,
            participants,
            timestamp: Utc::now(),
        };
        let record = self.store.insert_message(&message)?;
        info!(message_id = %record.id, %author_id, parent_id = ?record.parent_id, "message created");

        IdentityCache::new(self.identities).render(record)
    }

    /// Checks run existence, then authorship, then content.
    pub fn edit(&self, message_id: Uuid, user_id: Uuid, content: Option<&str>) -> Result<MessageView> {
        self.authored(message_id, user_id)?;
        let content = required_content(content)?;

        let record = self
            .store
            .update_content(message_id, &content, Utc::now())?
            .ok_or(CoreError::NotFound)?;
        info!(%message_id, "message edited");

        IdentityCache::new(self.identities).render(record)
    }

    /// Children of the deleted message are left pointing at it.
    pub fn delete(&self, message_id: Uuid, user_id: Uuid) -> Result<Uuid> {
        self.authored(message_id, user_id)?;

        if !self.store.delete_message(message_id)? {
            return Err(CoreError::NotFound);
        }
        info!(%message_id, "message deleted");

        Ok(message_id)
    }

    fn authored(&self, message_id: Uuid, user_id: Uuid) -> Result<MessageRecord> {
        let record = self
            .store
            .get_message(message_id)?
            .ok_or(CoreError::NotFound)?;

        if record.author_id != user_id {
            return Err(CoreError::Forbidden);
        }
        Ok(record)
    }

    fn participants(&self, author_id: Uuid, explicit: Option<Vec<Uuid>>) -> Result<Vec<Uuid>> {
        let mut participants: Vec<Uuid> = Vec::new();

        for user_id in explicit.into_iter().flatten() {
            if participants.contains(&user_id) {
                continue;
            }
            if user_id != author_id && self.identities.resolve(user_id)?.is_none() {
                return Err(CoreError::Validation("Participant does not exist".into()));
            }
            participants.push(user_id);
        }

        if !participants.contains(&author_id) {
            participants.insert(0, author_id);
        }
        Ok(participants)
    }
}

fn required_content(content: Option<&str>) -> Result<String> {
    match content.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(CoreError::Validation("Message has no content".into())),
    }
}
