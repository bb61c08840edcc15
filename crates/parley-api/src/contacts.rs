//! Contacts are one-directional friend edges owned by the caller.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use parley_db::store::public_user;
use parley_types::api::{AddContactRequest, ContactResponse, ContactsResponse, UserResponse};
use parley_types::models::Contact;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::input::parse_id;
use crate::middleware::CurrentUser;
use crate::profile::{current_row, load_profile};

const INVALID_CONTACT: &str = "Invalid contact ID";
const NOT_FRIEND: &str = "Contact not friend";

pub async fn get_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let contacts = blocking(move || {
        let contacts = state
            .db
            .get_friends(&user.id.to_string())?
            .iter()
            .map(|row| public_user(row).map(Contact::from))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(contacts)
    })
    .await?;

    Ok(Json(ContactsResponse { contacts }))
}

pub async fn add_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<AddContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::MalformedId(INVALID_CONTACT.into()))?;
    let raw = req
        .contact_id
        .ok_or_else(|| ApiError::MalformedId(INVALID_CONTACT.into()))?;
    let contact_id = parse_id(&raw, INVALID_CONTACT)?;

    if contact_id == user.id {
        return Err(ApiError::Validation("Cannot add yourself as a contact".into()));
    }

    let profile = blocking(move || {
        let contact = contact_id.to_string();
        if state.db.get_user_by_id(&contact)?.is_none() {
            return Err(ApiError::Validation(INVALID_CONTACT.into()));
        }

        state.db.add_friend(&user.id.to_string(), &contact)?;
        info!(user_id = %user.id, %contact_id, "contact added");

        let row = current_row(&state.db, &user)?;
        Ok(load_profile(&state.db, &row)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user: profile })))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(contact_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contact_id = parse_id(&contact_id, INVALID_CONTACT)?;

    let contact = blocking(move || {
        let contact = contact_id.to_string();
        if !state.db.is_friend(&user.id.to_string(), &contact)? {
            return Err(ApiError::Relation(NOT_FRIEND.into()));
        }

        let row = state
            .db
            .get_user_by_id(&contact)?
            .ok_or_else(|| ApiError::NotFound("No user found".into()))?;
        Ok(public_user(&row)?)
    })
    .await?;

    Ok(Json(ContactResponse { contact }))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(contact_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contact_id = parse_id(&contact_id, INVALID_CONTACT)?;

    let profile = blocking(move || {
        if !state
            .db
            .remove_friend(&user.id.to_string(), &contact_id.to_string())?
        {
            return Err(ApiError::Relation(NOT_FRIEND.into()));
        }
        info!(user_id = %user.id, %contact_id, "contact removed");

        let row = current_row(&state.db, &user)?;
        Ok(load_profile(&state.db, &row)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user: profile })))
}
