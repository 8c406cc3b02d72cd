use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use crate::{entities::post::PostId, utils::response::AppError};

/// Post id taken from the `{id}` path segment.
/// Rejects malformed ids before the handler (and the store) is reached.
#[derive(Debug, Clone, Copy)]
pub struct PostIdPath(pub PostId);

impl<S> FromRequestParts<S> for PostIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::MalformedId)?;

        match PostId::parse(&raw) {
            Some(id) => Ok(PostIdPath(id)),
            None => {
                debug!("Rejected malformed post id {:?}", raw);
                Err(AppError::MalformedId)
            }
        }
    }
}
