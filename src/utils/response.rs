use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const MALFORMED_ID_TEXT: &str = "No post with that id";

/// Error body sent with every JSON failure
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Id in the path cannot address any post, store was not touched
    #[error("No post with that id")]
    MalformedId,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Store could not be reached or answered with a failure on a read
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedId | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::MalformedId => (status, MALFORMED_ID_TEXT).into_response(),
            other => (
                status,
                Json(ErrorBody {
                    message: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// JSON body with an explicit status
pub fn response<T: Serialize>(data: T, status: StatusCode) -> (StatusCode, Json<T>) {
    (status, Json(data))
}
