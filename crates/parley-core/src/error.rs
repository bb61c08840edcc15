use thiserror::Error;

/// Failures raised by the threading and mutation rules.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The message id does not resolve to a stored message.
    #[error("message not found")]
    NotFound,

    /// The requesting user is not the message's author.
    #[error("message not authored by user")]
    Forbidden,

    /// The payload failed validation. The text is client-facing.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
