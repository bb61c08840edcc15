//! Thread reconstruction.
//!
//! Messages form singly-linked chains through `parent_id`. A thread is the
//! chain from a head down through successive earliest children. A head has
//! no parent, a parent that has since been deleted, or a parent whose
//! earliest child is some other message (a branch).

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};
use uuid::Uuid;

use parley_types::models::MessageView;

use crate::error::{CoreError, Result};
use crate::identity::IdentityCache;
use crate::records::MessageRecord;
use crate::traits::{IdentityResolver, MessageStore};

/// Upper bound on chain length, in either direction.
pub const MAX_THREAD_LENGTH: usize = 10_000;

/// Read-only projection of the message store, scoped to one user.
pub struct ThreadBuilder<'a, S: ?Sized, R: ?Sized> {
    store: &'a S,
    identities: &'a R,
}

impl<'a, S, R> ThreadBuilder<'a, S, R>
where
    S: MessageStore + ?Sized,
    R: IdentityResolver + ?Sized,
{
    pub fn new(store: &'a S, identities: &'a R) -> Self {
        Self { store, identities }
    }

    /// All threads the user takes part in, in head insertion order.
    ///
    /// A user takes part in a thread when they authored, or are listed as a
    /// participant of, any message in it.
    pub fn threads_for(&self, user_id: Uuid) -> Result<Vec<Vec<MessageView>>> {
        let heads = self.heads_for(user_id)?;
        debug!(%user_id, heads = heads.len(), "building threads");

        let mut identities = IdentityCache::new(self.identities);
        let mut threads = Vec::with_capacity(heads.len());
        for head in heads {
            let chain = self.walk(head)?;
            if !chain.iter().any(|message| message.involves(user_id)) {
                continue;
            }
            let rendered = chain
                .into_iter()
                .map(|message| identities.render(message))
                .collect::<Result<Vec<_>>>()?;
            threads.push(rendered);
        }

        Ok(threads)
    }

    /// A single message, readable by its author only.
    pub fn message_for(&self, message_id: Uuid, user_id: Uuid) -> Result<MessageView> {
        let message = self
            .store
            .get_message(message_id)?
            .ok_or(CoreError::NotFound)?;

        if message.author_id != user_id {
            return Err(CoreError::Forbidden);
        }

        IdentityCache::new(self.identities).render(message)
    }

    fn heads_for(&self, user_id: Uuid) -> Result<Vec<MessageRecord>> {
        let involved = self.store.messages_involving(user_id)?;

        let mut heads: BTreeMap<i64, MessageRecord> = BTreeMap::new();
        let mut climbed = HashSet::new();
        for message in involved {
            if let Some(head) = self.climb(message, &mut climbed)? {
                heads.entry(head.seq).or_insert(head);
            }
        }

        Ok(heads.into_values().collect())
    }

    /// Follow parent links up to the head, stopping early at a branch point
    /// so the walk back down passes through `start`. Returns `None` when the
    /// chain joins one already climbed, or loops.
    fn climb(
        &self,
        start: MessageRecord,
        climbed: &mut HashSet<Uuid>,
    ) -> Result<Option<MessageRecord>> {
        let mut path = HashSet::new();
        let mut current = start;

        loop {
            if climbed.contains(&current.id) {
                climbed.extend(path);
                return Ok(None);
            }
            if !path.insert(current.id) || path.len() > MAX_THREAD_LENGTH {
                warn!(message_id = %current.id, "parent chain loops or exceeds bound, skipping");
                climbed.extend(path);
                return Ok(None);
            }

            let Some(parent_id) = current.parent_id else {
                break;
            };
            let Some(parent) = self.store.get_message(parent_id)? else {
                debug!(message_id = %current.id, %parent_id, "parent deleted, promoting to head");
                break;
            };
            let first_child = self.store.child_of(parent_id)?.map(|child| child.id);
            if first_child != Some(current.id) {
                debug!(message_id = %current.id, %parent_id, "later sibling, starting a branch");
                break;
            }
            current = parent;
        }

        climbed.extend(path);
        Ok(Some(current))
    }

    fn walk(&self, head: MessageRecord) -> Result<Vec<MessageRecord>> {
        let head_id = head.id;
        let mut visited = HashSet::from([head_id]);
        let mut thread = vec![head];

        loop {
            let last_id = thread[thread.len() - 1].id;
            let Some(child) = self.store.child_of(last_id)? else {
                break;
            };
            if thread.len() >= MAX_THREAD_LENGTH || !visited.insert(child.id) {
                warn!(%head_id, child_id = %child.id, "thread walk stopped early");
                break;
            }
            thread.push(child);
        }

        Ok(thread)
    }
}
