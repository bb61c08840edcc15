use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::auth::{self, AppState};
use crate::contacts;
use crate::messages;
use crate::middleware::require_auth;
use crate::profile;

/// Every route of the API. Transport layers (CORS, tracing) are added by
/// the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route(
            "/api/profile",
            get(profile::get_profile)
                .put(profile::edit_profile)
                .delete(profile::delete_profile),
        )
        .route(
            "/api/contacts",
            get(contacts::get_contacts).put(contacts::add_contact),
        )
        .route(
            "/api/contacts/{contact_id}",
            get(contacts::get_contact).delete(contacts::delete_contact),
        )
        .route(
            "/api/messages",
            get(messages::get_messages).post(messages::create_message),
        )
        .route(
            "/api/messages/{message_id}",
            get(messages::get_message)
                .put(messages::edit_message)
                .delete(messages::delete_message),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
