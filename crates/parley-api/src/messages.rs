use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use parley_core::{CoreError, Draft, MutationGuard, ThreadBuilder};
use parley_types::api::{
    CreateMessageRequest, DeletedResponse, EditMessageRequest, Envelope, MessageResponse,
    ThreadsResponse,
};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::input::{envelope, parse_id};
use crate::middleware::CurrentUser;

const INVALID_MESSAGE: &str = "Message id is wrong format";

pub async fn get_messages(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let threads = blocking(move || {
        Ok(ThreadBuilder::new(&state.db, &state.db).threads_for(user.id)?)
    })
    .await?;

    Ok(Json(ThreadsResponse { messages: threads }))
}

pub async fn get_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id(&message_id, INVALID_MESSAGE)?;

    let message = blocking(move || {
        Ok(ThreadBuilder::new(&state.db, &state.db).message_for(message_id, user.id)?)
    })
    .await?;

    Ok(Json(MessageResponse { message }))
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<Envelope<CreateMessageRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = envelope(payload)?.unwrap_or_default();

    let parent_id = req
        .parent_id
        .as_deref()
        .map(|raw| parse_id(raw, "Invalid parent ID"))
        .transpose()?;
    let participants = req
        .participants
        .map(|ids| {
            ids.iter()
                .map(|raw| parse_id(raw, "Invalid participant ID"))
                .collect::<Result<Vec<Uuid>, _>>()
        })
        .transpose()?;

    let draft = Draft {
        content: req.content,
        parent_id,
        participants,
    };

    let message = blocking(move || {
        Ok(MutationGuard::new(&state.db, &state.db).create(user.id, draft)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

pub async fn edit_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(message_id): Path<String>,
    payload: Result<Json<Envelope<EditMessageRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id(&message_id, INVALID_MESSAGE)?;
    let content = envelope(payload)?.and_then(|req| req.content);

    let message = blocking(move || {
        MutationGuard::new(&state.db, &state.db)
            .edit(message_id, user.id, content.as_deref())
            .map_err(|e| match e {
                CoreError::NotFound => ApiError::NotFound("Message not found".into()),
                CoreError::Forbidden => ApiError::Relation(
                    "Cannot alter message when author and user ids do not match".into(),
                ),
                other => other.into(),
            })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id(&message_id, INVALID_MESSAGE)?;

    let id = blocking(move || {
        MutationGuard::new(&state.db, &state.db)
            .delete(message_id, user.id)
            .map_err(|e| match e {
                CoreError::NotFound => ApiError::NotFound("No message found".into()),
                CoreError::Forbidden => ApiError::Relation(
                    "Cannot delete message when author and user ids do not match".into(),
                ),
                other => other.into(),
            })
    })
    .await?;

    Ok(Json(DeletedResponse { id }))
}
