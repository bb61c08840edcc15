use std::collections::HashMap;

use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, created_at";
const MESSAGE_COLUMNS: &str = "seq, id, content, author_id, parent_id, timestamp";

impl Database {
    // -- Users --

    /// Returns `false` when the email is already registered.
    pub fn create_user(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, first_name, last_name, email, password) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, first_name, last_name, email, password_hash),
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Overwrites every mutable column of the user identified by `user.id`.
    /// Returns `false` when the new email belongs to another user.
    pub fn update_user(&self, user: &UserRow) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET first_name = ?2, last_name = ?3, email = ?4, password = ?5 WHERE id = ?1",
                (
                    &user.id,
                    &user.first_name,
                    &user.last_name,
                    &user.email,
                    &user.password,
                ),
            );
            match updated {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Friend edges in both directions go with the user. Messages stay.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])? > 0))
    }

    // -- Friends --

    pub fn get_friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT friend_id FROM friends WHERE user_id = ?1 ORDER BY rowid")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(ids)
        })
    }

    pub fn get_friends(&self, user_id: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.first_name, u.last_name, u.email, u.password, u.created_at
                 FROM friends f
                 JOIN users u ON u.id = f.friend_id
                 WHERE f.user_id = ?1
                 ORDER BY f.rowid",
            )?;
            let rows = stmt
                .query_map([user_id], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Adding an existing friend is a no-op.
    pub fn add_friend(&self, user_id: &str, friend_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO friends (user_id, friend_id) VALUES (?1, ?2)",
                (user_id, friend_id),
            )?;
            Ok(())
        })
    }

    pub fn remove_friend(&self, user_id: &str, friend_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM friends WHERE user_id = ?1 AND friend_id = ?2",
                (user_id, friend_id),
            )?;
            Ok(removed > 0)
        })
    }

    pub fn is_friend(&self, user_id: &str, friend_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM friends WHERE user_id = ?1 AND friend_id = ?2",
                    (user_id, friend_id),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Messages --

    /// Inserts the message and its participants in one transaction.
    /// Returns the assigned sequence number.
    pub fn insert_message_row(
        &self,
        id: &str,
        content: &str,
        author_id: &str,
        parent_id: Option<&str>,
        timestamp: &str,
        participants: &[String],
    ) -> Result<i64> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO messages (id, content, author_id, parent_id, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, content, author_id, parent_id, timestamp],
            )?;
            let seq = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO message_participants (message_id, user_id, position) VALUES (?1, ?2, ?3)",
                )?;
                for (position, user_id) in participants.iter().enumerate() {
                    stmt.execute(rusqlite::params![id, user_id, position as i64])?;
                }
            }

            tx.commit()?;
            Ok(seq)
        })
    }

    pub fn get_message_row(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1");
            let row = conn.query_row(&sql, [id], message_from_row).optional()?;
            Ok(row)
        })
    }

    /// Messages the user authored or is a participant of, in insertion order.
    pub fn get_messages_involving(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.author_id = ?1
                    OR EXISTS (
                        SELECT 1 FROM message_participants p
                        WHERE p.message_id = m.id AND p.user_id = ?1
                    )
                 ORDER BY m.seq"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_first_child(&self, parent_id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE parent_id = ?1 ORDER BY seq LIMIT 1"
            );
            let row = conn.query_row(&sql, [parent_id], message_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn update_message_content(&self, id: &str, content: &str, timestamp: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET content = ?2, timestamp = ?3 WHERE id = ?1",
                (id, content, timestamp),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_message_row(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])? > 0))
    }

    /// Batch-fetch participant ids for a set of message IDs, keyed by
    /// message id and kept in insertion position order.
    pub fn get_participants_for_messages(
        &self,
        message_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT message_id, user_id FROM message_participants
                 WHERE message_id IN ({})
                 ORDER BY message_id, position",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = message_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
            let rows = stmt.query_map(params.as_slice(), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (message_id, user_id) = row?;
                grouped.entry(message_id).or_default().push(user_id);
            }

            Ok(grouped)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        password: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        seq: row.get(0)?,
        id: row.get(1)?,
        content: row.get(2)?,
        author_id: row.get(3)?,
        parent_id: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_user(db: &Database, id: &str, email: &str) {
        db.create_user(id, "First", "Last", email, "hash").unwrap();
    }

    #[test]
    fn duplicate_email_is_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "u1", "deb@email.com");
        assert!(!db.create_user("u2", "A", "B", "deb@email.com", "hash").unwrap());
        assert!(db.get_user_by_id("u2").unwrap().is_none());
    }

    #[test]
    fn update_to_taken_email_leaves_row_alone() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "u1", "deb@email.com");
        seed_user(&db, "u2", "maggie@email.com");

        let mut row = db.get_user_by_id("u2").unwrap().unwrap();
        row.email = "deb@email.com".into();
        row.first_name = "Changed".into();
        assert!(!db.update_user(&row).unwrap());

        let stored = db.get_user_by_id("u2").unwrap().unwrap();
        assert_eq!(stored.email, "maggie@email.com");
        assert_eq!(stored.first_name, "First");

        row.email = "maggie@email.com".into();
        assert!(db.update_user(&row).unwrap());
        assert_eq!(db.get_user_by_id("u2").unwrap().unwrap().first_name, "Changed");
    }

    #[test]
    fn friendship_is_one_directional() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "a", "a@email.com");
        seed_user(&db, "b", "b@email.com");

        db.add_friend("a", "b").unwrap();
        db.add_friend("a", "b").unwrap();

        assert!(db.is_friend("a", "b").unwrap());
        assert!(!db.is_friend("b", "a").unwrap());
        assert_eq!(db.get_friend_ids("a").unwrap(), vec!["b".to_string()]);
        assert!(db.get_friend_ids("b").unwrap().is_empty());

        assert!(db.remove_friend("a", "b").unwrap());
        assert!(!db.remove_friend("a", "b").unwrap());
    }

    #[test]
    fn deleting_user_drops_friend_edges_but_keeps_messages() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "a", "a@email.com");
        seed_user(&db, "b", "b@email.com");
        db.add_friend("a", "b").unwrap();
        db.insert_message_row("m1", "hi", "b", None, "2024-01-01T00:00:00Z", &["b".into()])
            .unwrap();

        assert!(db.delete_user("b").unwrap());
        assert!(db.get_friend_ids("a").unwrap().is_empty());
        assert!(db.get_message_row("m1").unwrap().is_some());
    }

    #[test]
    fn first_child_is_earliest_inserted() {
        let db = Database::open_in_memory().unwrap();
        let ts = "2024-01-01T00:00:00Z";
        db.insert_message_row("head", "h", "a", None, ts, &[]).unwrap();
        db.insert_message_row("c1", "1", "a", Some("head"), ts, &[]).unwrap();
        db.insert_message_row("c2", "2", "a", Some("head"), ts, &[]).unwrap();

        let child = db.get_first_child("head").unwrap().unwrap();
        assert_eq!(child.id, "c1");
        assert!(db.get_first_child("c2").unwrap().is_none());
    }

    #[test]
    fn participants_are_batched_in_position_order() {
        let db = Database::open_in_memory().unwrap();
        let ts = "2024-01-01T00:00:00Z";
        db.insert_message_row("m1", "x", "a", None, ts, &["a".into(), "c".into(), "b".into()])
            .unwrap();
        db.insert_message_row("m2", "y", "b", None, ts, &["b".into()]).unwrap();

        let grouped = db
            .get_participants_for_messages(&["m1".into(), "m2".into()])
            .unwrap();
        assert_eq!(grouped["m1"], vec!["a", "c", "b"]);
        assert_eq!(grouped["m2"], vec!["b"]);

        assert!(db.delete_message_row("m1").unwrap());
        let grouped = db.get_participants_for_messages(&["m1".into()]).unwrap();
        assert!(grouped.get("m1").is_none());
    }

    #[test]
    fn involving_matches_author_or_participant() {
        let db = Database::open_in_memory().unwrap();
        let ts = "2024-01-01T00:00:00Z";
        db.insert_message_row("m1", "x", "a", None, ts, &["a".into(), "b".into()])
            .unwrap();
        db.insert_message_row("m2", "y", "c", None, ts, &["c".into()]).unwrap();
        db.insert_message_row("m3", "z", "b", Some("m1"), ts, &[]).unwrap();

        let ids: Vec<_> = db
            .get_messages_involving("b")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }
}
