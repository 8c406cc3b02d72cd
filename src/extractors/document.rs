use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use crate::{entities::post::Document, utils::response::AppError};

/// Request body that must be a JSON object
pub struct JsonDocument(pub Document);

#[derive(Debug, Error)]
pub enum DocumentRejection {
    #[error("{0}")]
    TooLarge(String),

    /// Not JSON, or JSON that is not an object
    #[error("{0}")]
    Invalid(String),
}

impl DocumentRejection {
    /// Oversized bodies always answer 413, `class` decides for invalid ones
    pub fn into_app_error(self, class: fn(String) -> AppError) -> AppError {
        match self {
            DocumentRejection::TooLarge(msg) => AppError::PayloadTooLarge(msg),
            DocumentRejection::Invalid(msg) => class(msg),
        }
    }
}

impl IntoResponse for DocumentRejection {
    fn into_response(self) -> Response {
        self.into_app_error(AppError::Conflict).into_response()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<S> FromRequest<S> for JsonDocument
where
    S: Send + Sync,
{
    type Rejection = DocumentRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => DocumentRejection::TooLarge(e.body_text()),
                _ => DocumentRejection::Invalid(e.body_text()),
            })?;

        match value {
            Value::Object(doc) => Ok(JsonDocument(doc)),
            other => Err(DocumentRejection::Invalid(format!(
                "Expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }
}
