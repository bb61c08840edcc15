//! SQLite implementations of the core's ports.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use parley_core::{IdentityResolver, MessageRecord, MessageStore, NewMessage};
use parley_types::models::PublicUser;

use crate::Database;
use crate::models::{MessageRow, UserRow};

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    raw.parse::<Uuid>()
        .with_context(|| format!("corrupt {what} '{raw}'"))
}

impl Database {
    fn records(&self, rows: Vec<MessageRow>) -> Result<Vec<MessageRecord>> {
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut participants = self.get_participants_for_messages(&ids)?;

        rows.into_iter()
            .map(|row| {
                let ids = participants.remove(&row.id).unwrap_or_default();
                to_record(row, ids)
            })
            .collect()
    }

    fn record(&self, row: Option<MessageRow>) -> Result<Option<MessageRecord>> {
        match row {
            Some(row) => Ok(self.records(vec![row])?.pop()),
            None => Ok(None),
        }
    }
}

fn to_record(row: MessageRow, participants: Vec<String>) -> Result<MessageRecord> {
    Ok(MessageRecord {
        id: parse_id(&row.id, "message id")?,
        seq: row.seq,
        author_id: parse_id(&row.author_id, "author_id")?,
        parent_id: row
            .parent_id
            .as_deref()
            .map(|p| parse_id(p, "parent_id"))
            .transpose()?,
        participants: participants
            .iter()
            .map(|p| parse_id(p, "participant id"))
            .collect::<Result<Vec<_>>>()?,
        timestamp: DateTime::parse_from_rfc3339(&row.timestamp)
            .with_context(|| format!("corrupt timestamp '{}' on message '{}'", row.timestamp, row.id))?
            .with_timezone(&Utc),
        content: row.content,
    })
}

impl MessageStore for Database {
    fn get_message(&self, id: Uuid) -> Result<Option<MessageRecord>> {
        let row = self.get_message_row(&id.to_string())?;
        self.record(row)
    }

    fn messages_involving(&self, user_id: Uuid) -> Result<Vec<MessageRecord>> {
        let rows = self.get_messages_involving(&user_id.to_string())?;
        self.records(rows)
    }

    fn child_of(&self, parent_id: Uuid) -> Result<Option<MessageRecord>> {
        let row = self.get_first_child(&parent_id.to_string())?;
        self.record(row)
    }

    fn insert_message(&self, message: &NewMessage) -> Result<MessageRecord> {
        let participants: Vec<String> = message.participants.iter().map(Uuid::to_string).collect();
        let timestamp = format_timestamp(message.timestamp);
        let parent_id = message.parent_id.map(|p| p.to_string());

        let seq = self.insert_message_row(
            &message.id.to_string(),
            &message.content,
            &message.author_id.to_string(),
            parent_id.as_deref(),
            &timestamp,
            &participants,
        )?;

        let row = MessageRow {
            seq,
            id: message.id.to_string(),
            content: message.content.clone(),
            author_id: message.author_id.to_string(),
            parent_id,
            timestamp,
        };
        to_record(row, participants)
    }

    fn update_content(
        &self,
        id: Uuid,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<MessageRecord>> {
        let id = id.to_string();
        if !self.update_message_content(&id, content, &format_timestamp(timestamp))? {
            return Ok(None);
        }
        let row = self.get_message_row(&id)?;
        self.record(row)
    }

    fn delete_message(&self, id: Uuid) -> Result<bool> {
        self.delete_message_row(&id.to_string())
    }
}

impl IdentityResolver for Database {
    fn resolve(&self, user_id: Uuid) -> Result<Option<PublicUser>> {
        self.get_user_by_id(&user_id.to_string())?
            .map(|row| public_user(&row))
            .transpose()
    }
}

/// The public projection of a user row: no password, no friends.
pub fn public_user(row: &UserRow) -> Result<PublicUser> {
    Ok(PublicUser {
        id: parse_id(&row.id, "user id")?,
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        email: row.email.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Draft, MutationGuard, ThreadBuilder};

    fn user(db: &Database, first: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.create_user(
            &id.to_string(),
            first,
            "Tester",
            &format!("{}@email.com", first.to_lowercase()),
            "hash",
        )
        .unwrap();
        id
    }

    fn say(db: &Database, author: Uuid, content: &str, parent: Option<Uuid>) -> Uuid {
        MutationGuard::new(db, db)
            .create(
                author,
                Draft {
                    content: Some(content.into()),
                    parent_id: parent,
                    participants: None,
                },
            )
            .unwrap()
            .id
    }

    #[test]
    fn threads_are_rebuilt_from_sqlite() {
        let db = Database::open_in_memory().unwrap();
        let a = user(&db, "Debbie");
        let b = user(&db, "Maggie");

        let hello = say(&db, a, "Hello", None);
        let reply = say(&db, b, "Hi Debbie", Some(hello));
        let again = say(&db, a, "How are you?", Some(reply));
        let other = say(&db, b, "Separate", None);

        let threads = ThreadBuilder::new(&db, &db).threads_for(a).unwrap();
        assert_eq!(threads.len(), 1);
        let ids: Vec<_> = threads[0].iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![hello, reply, again]);
        assert_eq!(threads[0][1].author.as_ref().unwrap().first_name, "Maggie");

        let threads = ThreadBuilder::new(&db, &db).threads_for(b).unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[1][0].id, other);
    }

    #[test]
    fn edit_round_trips_timestamp_and_content() {
        let db = Database::open_in_memory().unwrap();
        let a = user(&db, "Debbie");
        let id = say(&db, a, "Hello", None);

        let before = db.get_message(id).unwrap().unwrap();
        let after = db
            .update_content(id, "Edited", before.timestamp + chrono::Duration::seconds(1))
            .unwrap()
            .unwrap();

        assert_eq!(after.content, "Edited");
        assert!(after.timestamp > before.timestamp);
        assert_eq!(after.seq, before.seq);
        assert_eq!(after.participants, vec![a]);
    }

    #[test]
    fn deleted_author_resolves_to_none() {
        let db = Database::open_in_memory().unwrap();
        let a = user(&db, "Debbie");
        let id = say(&db, a, "Hello", None);

        db.delete_user(&a.to_string()).unwrap();
        assert!(db.resolve(a).unwrap().is_none());
        assert!(db.get_message(id).unwrap().is_some());
    }
}
