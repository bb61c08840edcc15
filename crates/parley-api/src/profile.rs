use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use parley_db::Database;
use parley_db::models::UserRow;
use parley_types::api::{DeletedResponse, Envelope, UpdateProfileRequest, UserResponse};
use parley_types::models::UserProfile;

use crate::auth::{AppState, hash_password};
use crate::blocking;
use crate::error::ApiError;
use crate::input::{envelope, normalize_email, optional};
use crate::middleware::CurrentUser;

/// The caller-facing view of a user: public fields plus friend ids.
pub(crate) fn load_profile(db: &Database, row: &UserRow) -> anyhow::Result<UserProfile> {
    let friends = db
        .get_friend_ids(&row.id)?
        .iter()
        .map(|id| id.parse::<Uuid>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UserProfile {
        id: row.id.parse::<Uuid>()?,
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        email: row.email.clone(),
        friends,
    })
}

pub(crate) fn current_row(db: &Database, user: &CurrentUser) -> Result<UserRow, ApiError> {
    db.get_user_by_id(&user.id.to_string())?
        .ok_or_else(|| ApiError::NotFound("No user found".into()))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = blocking(move || {
        let row = current_row(&state.db, &user)?;
        Ok(load_profile(&state.db, &row)?)
    })
    .await?;

    Ok(Json(UserResponse { user: profile }))
}

pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<Envelope<UpdateProfileRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = envelope(payload)?
        .ok_or_else(|| ApiError::Validation("No profile data sent".into()))?;

    let first_name = optional(req.first_name, "First name cannot be empty")?;
    let last_name = optional(req.last_name, "Last name cannot be empty")?;
    let email = optional(req.email, "Email cannot be empty")?.map(|e| normalize_email(&e));
    let password = optional(req.password, "Password cannot be empty")?;

    let profile = blocking(move || {
        let mut row = current_row(&state.db, &user)?;

        if let Some(email) = email {
            if email != row.email && state.db.get_user_by_email(&email)?.is_some() {
                return Err(ApiError::Duplicate("User already exists".into()));
            }
            row.email = email;
        }
        if let Some(first_name) = first_name {
            row.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            row.last_name = last_name;
        }
        if let Some(password) = password {
            row.password = hash_password(&password)?;
        }

        if !state.db.update_user(&row)? {
            return Err(ApiError::Duplicate("User already exists".into()));
        }
        info!(user_id = %user.id, "profile updated");
        Ok(load_profile(&state.db, &row)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user: profile })))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let id = user.id;
    blocking(move || {
        if !state.db.delete_user(&user.id.to_string())? {
            return Err(ApiError::NotFound("No user found".into()));
        }
        info!(user_id = %user.id, email = %user.email, "profile deleted");
        Ok(())
    })
    .await?;

    Ok(Json(DeletedResponse { id }))
}
