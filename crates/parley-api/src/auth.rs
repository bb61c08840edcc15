use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use parley_db::Database;
use parley_keys::TokenSigner;
use parley_types::api::{AuthResponse, Envelope, LoginRequest, RegisterRequest};

use crate::error::ApiError;
use crate::input::{envelope, normalize_email, required};
use crate::profile::load_profile;
use crate::blocking;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenSigner,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Envelope<RegisterRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = envelope(payload)?.ok_or_else(|| ApiError::Validation("No user sent".into()))?;

    // Validate input
    let first_name = required(req.first_name, "No first name")?;
    let last_name = required(req.last_name, "No last name")?;
    let email = normalize_email(&required(req.email, "No email")?);
    let password = required(req.password, "No password")?;

    let (user, token) = blocking(move || {
        // Check if email is taken
        if state.db.get_user_by_email(&email)?.is_some() {
            return Err(ApiError::Duplicate("User already exists".into()));
        }

        let password_hash = hash_password(&password)?;
        let user_id = Uuid::new_v4();

        // A concurrent registration can win between the check and the insert.
        if !state
            .db
            .create_user(&user_id.to_string(), &first_name, &last_name, &email, &password_hash)?
        {
            return Err(ApiError::Duplicate("User already exists".into()));
        }
        info!(%user_id, "user registered");

        let row = state
            .db
            .get_user_by_id(&user_id.to_string())?
            .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", user_id))?;
        let user = load_profile(&state.db, &row)?;
        let token = state.tokens.issue(user_id, &email)?;
        Ok((user, token))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Envelope<LoginRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = envelope(payload)?.unwrap_or_default();

    let email = normalize_email(&required(req.email, "No email")?);
    let password = required(req.password, "No password")?;

    let response = blocking(move || {
        let user = state
            .db
            .get_user_by_email(&email)?
            .ok_or_else(|| ApiError::Validation("No user found with email".into()))?;

        // Verify password
        if !verify_password(&password, &user.password)? {
            return Err(ApiError::Authentication("Incorrect password".into()));
        }

        let user_id = user.id.parse::<Uuid>().map_err(anyhow::Error::from)?;
        let token = state.tokens.issue(user_id, &user.email)?;
        info!(%user_id, "user logged in");

        Ok(AuthResponse {
            user: load_profile(&state.db, &user)?,
            token,
        })
    })
    .await?;

    Ok(Json(response))
}

/// Hash password with Argon2id and a random salt.
pub(crate) fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub(crate) fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("corrupt password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hash = hash_password("1234password5678").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("1234password5678", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }
}
