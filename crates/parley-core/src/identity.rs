use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use parley_types::models::{MessageView, PublicUser};

use crate::error::Result;
use crate::records::MessageRecord;
use crate::traits::IdentityResolver;

/// Memoizes identity lookups for the duration of one request, so a user who
/// appears on many messages is resolved once.
pub struct IdentityCache<'a, R: ?Sized> {
    resolver: &'a R,
    known: HashMap<Uuid, Option<PublicUser>>,
}

impl<'a, R> IdentityCache<'a, R>
where
    R: IdentityResolver + ?Sized,
{
    pub fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            known: HashMap::new(),
        }
    }

    pub fn lookup(&mut self, user_id: Uuid) -> Result<Option<PublicUser>> {
        if let Some(hit) = self.known.get(&user_id) {
            return Ok(hit.clone());
        }

        let resolved = self.resolver.resolve(user_id)?;
        if resolved.is_none() {
            debug!(%user_id, "identity no longer exists");
        }
        self.known.insert(user_id, resolved.clone());
        Ok(resolved)
    }

    /// Stale author ids render as `None`; stale participants are dropped.
    pub fn render(&mut self, record: MessageRecord) -> Result<MessageView> {
        let author = self.lookup(record.author_id)?;

        let mut participants = Vec::with_capacity(record.participants.len());
        for user_id in &record.participants {
            if let Some(user) = self.lookup(*user_id)? {
                participants.push(user);
            }
        }

        Ok(MessageView {
            id: record.id,
            content: record.content,
            author,
            timestamp: record.timestamp,
            parent_id: record.parent_id,
            participants,
        })
    }
}
