use axum::{
    Router,
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::utils::{response::AppError, state::ArcAppState};

pub mod posts;

pub fn create_router() -> Router<ArcAppState> {
    Router::new()
        .nest("/posts", posts::router())
        .fallback(fallback)
}

/// `PATCH /posts/` and `DELETE /posts/` carry an empty id, which is a
/// malformed id rather than an unknown route
async fn fallback(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    let addresses_post = matches!(method, Method::PATCH | Method::DELETE)
        && uri.path().starts_with("/posts/");
    if addresses_post {
        AppError::MalformedId.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
