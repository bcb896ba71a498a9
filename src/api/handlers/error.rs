use super::types::MessageResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub const INTERNAL_ERROR: &str = "Internal server error";

/// Request failures. Each variant is terminal and maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing payload")]
    MissingPayload,
    #[error("{0}")]
    Validation(String),
    #[error("User exists!")]
    Conflict,
    // unknown account and wrong password share this variant
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingPayload | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(err) => {
                error!("Request failed: {err:#}");
                INTERNAL_ERROR.to_string()
            }
            other => other.to_string(),
        };

        (self.status(), Json(MessageResponse::new(message))).into_response()
    }
}
