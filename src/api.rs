//! HTTP boundary: long-poll chat endpoints
//!
//! Maps four GET routes onto the room operations and translates the core
//! error taxonomy into status codes. No algorithmic content lives here;
//! handlers validate query parameters, call the room, and encode JSON.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ChatError;
use crate::message::ChatMessage;
use crate::room::ChatRoom;
use crate::types::MemberId;

/// Default long-poll wait when the client does not specify one
pub const DEFAULT_WAIT_MS: u64 = 10_000;

/// Upper bound on the client-supplied long-poll wait
pub const MAX_WAIT_MS: u64 = 60_000;

/// Boundary errors with their HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Required query parameter missing or empty (400)
    MissingParam(&'static str),
    /// Join with an id that is already a member (400)
    Duplicate(MemberId),
    /// Operation against an unknown member (404)
    NotFound(MemberId),
    /// Long-poll against a member that has left (410)
    Disconnected,
    /// Room actor has shut down (503)
    Unavailable,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParam(_) | Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Disconnected => StatusCode::GONE,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingParam(name) => format!("Missing {}", name),
            Self::Duplicate(id) => format!("Client with ID {} already exists", id),
            Self::NotFound(_) => "Client not found".to_string(),
            Self::Disconnected => "Client disconnected".to_string(),
            Self::Unavailable => "Chat room is shut down".to_string(),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::DuplicateMember(id) => Self::Duplicate(id),
            ChatError::MemberNotFound(id) => Self::NotFound(id),
            ChatError::RoomClosed => Self::Unavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "message": self.message(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct JoinParams {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveParams {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendParams {
    pub id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesParams {
    pub id: Option<String>,
    /// How long to wait for messages, in milliseconds
    pub wait_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub id: MemberId,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub status: &'static str,
    pub messages: Vec<ChatMessage>,
}

/// Validate a member id query parameter
fn require_id(id: Option<String>) -> Result<MemberId, ApiError> {
    match id {
        Some(id) if !id.is_empty() => Ok(MemberId::from(id)),
        _ => Err(ApiError::MissingParam("client ID")),
    }
}

/// GET /join?id=
pub async fn join(
    State(room): State<ChatRoom>,
    Query(params): Query<JoinParams>,
) -> Result<Json<JoinResponse>, ApiError> {
    let id = require_id(params.id)?;
    room.join(id.clone()).await?;

    Ok(Json(JoinResponse {
        status: "success",
        message: "Joined chat successfully",
        id,
    }))
}

/// GET /leave?id=
pub async fn leave(
    State(room): State<ChatRoom>,
    Query(params): Query<LeaveParams>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = require_id(params.id)?;
    let found = room.leave(id.clone()).await?;
    if !found {
        return Err(ApiError::NotFound(id));
    }

    Ok(Json(StatusResponse {
        status: "success",
        message: "Left chat successfully",
    }))
}

/// GET /send?id=&message=
pub async fn send(
    State(room): State<ChatRoom>,
    Query(params): Query<SendParams>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = require_id(params.id)?;
    let content = match params.message {
        Some(message) if !message.is_empty() => message,
        _ => return Err(ApiError::MissingParam("message")),
    };

    // Sender must currently be a member; the fan-out itself does not check
    if !room.contains(&id).await {
        return Err(ChatError::MemberNotFound(id).into());
    }
    room.broadcast(id, content).await?;

    Ok(Json(StatusResponse {
        status: "success",
        message: "Message sent",
    }))
}

/// GET /messages?id=&wait_ms=
pub async fn messages(
    State(room): State<ChatRoom>,
    Query(params): Query<MessagesParams>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let id = require_id(params.id)?;
    let wait_ms = params.wait_ms.unwrap_or(DEFAULT_WAIT_MS).min(MAX_WAIT_MS);

    let Some(mailbox) = room.mailbox(&id).await else {
        return Err(ChatError::MemberNotFound(id).into());
    };

    let batch = mailbox.retrieve(Duration::from_millis(wait_ms)).await;
    if !batch.alive {
        return Err(ApiError::Disconnected);
    }

    Ok(Json(MessagesResponse {
        status: "success",
        messages: batch.messages,
    }))
}

/// Build the application router over a shared room handle
pub fn router(room: ChatRoom) -> Router {
    Router::new()
        .route("/join", get(join))
        .route("/leave", get(leave))
        .route("/send", get(send))
        .route("/messages", get(messages))
        .with_state(room)
}
