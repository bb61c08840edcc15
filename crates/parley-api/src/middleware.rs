use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

/// Extract and validate the bearer token, then confirm the user still exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".into()))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        debug!("token rejected: {}", e);
        ApiError::Unauthorized("Not authorized, token failed".into())
    })?;

    let user_id = claims.sub;
    let user = blocking(move || Ok(state.db.get_user_by_id(&user_id.to_string())?))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no user found".into()))?;

    req.extensions_mut().insert(CurrentUser {
        id: user_id,
        email: user.email,
    });
    Ok(next.run(req).await)
}
