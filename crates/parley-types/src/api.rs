use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Contact, MessageView, PublicUser, UserProfile};

// -- JWT Claims --

/// Claims carried by every access token. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Envelope --

/// Most request bodies wrap their payload in `{ "data": { ... } }`.
/// A missing `data` key deserializes to `None` so handlers can answer
/// with their own validation message.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

// -- Profile --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

// -- Contacts --

/// `PUT /api/contacts` is the one body that is not enveloped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContactRequest {
    pub contact_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub contact: PublicUser,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub content: Option<String>,
    pub parent_id: Option<String>,
    pub participants: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ThreadsResponse {
    pub messages: Vec<Vec<MessageView>>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: MessageView,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_is_none() {
        let env: Envelope<CreateMessageRequest> = serde_json::from_str("{}").unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn create_message_reads_camel_case_fields() {
        let env: Envelope<CreateMessageRequest> = serde_json::from_str(
            r#"{"data":{"content":"hi","parentId":"abc","participants":["x","y"]}}"#,
        )
        .unwrap();
        let data = env.data.unwrap();
        assert_eq!(data.content.as_deref(), Some("hi"));
        assert_eq!(data.parent_id.as_deref(), Some("abc"));
        assert_eq!(data.participants.unwrap().len(), 2);
    }
}
