//! HTTP surface of the Parley server.

pub mod auth;
pub mod contacts;
pub mod error;
pub mod input;
pub mod messages;
pub mod middleware;
pub mod profile;
pub mod routes;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;

use tracing::error;

/// Run blocking DB work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed"))
    })?
}
