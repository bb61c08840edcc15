use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public-safe identity embedded into message output.
/// Never carries the password hash or the friends list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// The caller's own profile, as returned by auth and profile endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub friends: Vec<Uuid>,
}

/// Entry of the contacts listing. Ids are deliberately left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<PublicUser> for Contact {
    fn from(user: PublicUser) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// A message with author and participants resolved to public identities.
/// `author` is `None` when the author's account no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
    pub author: Option<PublicUser>,
    pub timestamp: DateTime<Utc>,
    pub parent_id: Option<Uuid>,
    pub participants: Vec<PublicUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_view_uses_camel_case_and_null_parent() {
        let view = MessageView {
            id: Uuid::new_v4(),
            content: "Hello".into(),
            author: None,
            timestamp: Utc::now(),
            parent_id: None,
            participants: vec![],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("parentId").unwrap().is_null());
        assert!(json.get("author").unwrap().is_null());
        assert!(json.get("parent_id").is_none());
    }

    #[test]
    fn contact_drops_the_id() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            first_name: "Debbie".into(),
            last_name: "Smith".into(),
            email: "deb@email.com".into(),
        };

        let json = serde_json::to_value(Contact::from(user)).unwrap();
        assert_eq!(json["firstName"], "Debbie");
        assert!(json.get("id").is_none());
    }
}
