use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use vibe_protocol::{ProtocolError, QUOTA_EXCEEDED_MESSAGE};
use vibe_state::StateError;

use crate::collaborators::CollaboratorError;

/// Request failures, rendered as `{ "detail": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ProtocolError> for ApiError {
    fn from(e: ProtocolError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::State(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Collaborator(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}
