use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::{debug, error, info};

use crate::{
    entities::post::Post,
    extractors::{
        document::{DocumentRejection, JsonDocument},
        post_id::PostIdPath,
    },
    utils::{
        response::{AppError, response},
        state::ArcAppState,
    },
};

fn missing(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("No post with id {id}"))
}

mod list {
    use super::*;

    // Empty collection is a normal 200, only store failures are errors
    pub async fn handler(State(state): State<ArcAppState>) -> Result<Json<Vec<Post>>, AppError> {
        let posts = state.store.list().await.map_err(|err| {
            error!("listPosts error: {}", err);
            AppError::Unavailable(err.to_string())
        })?;

        debug!("Listed {} posts", posts.len());
        Ok(Json(posts))
    }
}

mod create {
    use super::*;

    pub async fn handler(
        State(state): State<ArcAppState>,
        payload: Result<JsonDocument, DocumentRejection>,
    ) -> Result<(StatusCode, Json<Post>), AppError> {
        let JsonDocument(draft) = payload.map_err(|rej| rej.into_app_error(AppError::Conflict))?;

        let post = state.store.create(draft).await.map_err(|err| {
            error!("createPost error: {}", err);
            AppError::Conflict(err.to_string())
        })?;

        info!("Created post {}", post.id);
        Ok(response(post, StatusCode::CREATED))
    }
}

mod update {
    use super::*;

    pub async fn handler(
        PostIdPath(id): PostIdPath,
        State(state): State<ArcAppState>,
        payload: Result<JsonDocument, DocumentRejection>,
    ) -> Result<Json<Post>, AppError> {
        let JsonDocument(patch) = payload.map_err(|rej| rej.into_app_error(AppError::Internal))?;

        let post = state
            .store
            .update(id, patch)
            .await
            .map_err(|err| {
                error!("updatePost error: {}", err);
                AppError::Internal(err.to_string())
            })?
            .ok_or_else(|| missing(id))?;

        info!("Updated post {}", id);
        Ok(Json(post))
    }
}

mod delete {
    use crate::entities::post::DeletedPost;

    use super::*;

    /// Deleting an id that holds no post still confirms the id
    pub async fn handler(
        PostIdPath(id): PostIdPath,
        State(state): State<ArcAppState>,
    ) -> Result<Json<DeletedPost>, AppError> {
        let removed = state.store.delete(id).await.map_err(|err| {
            error!("deletePost error: {}", err);
            AppError::Internal(err.to_string())
        })?;

        if removed {
            info!("Deleted post {}", id);
        } else {
            debug!("Delete of absent post {}", id);
        }
        Ok(Json(DeletedPost { id }))
    }
}

mod like {
    use super::*;

    pub async fn handler(
        PostIdPath(id): PostIdPath,
        State(state): State<ArcAppState>,
    ) -> Result<Json<Post>, AppError> {
        let post = state
            .store
            .like(id)
            .await
            .map_err(|err| {
                error!("likePost error: {}", err);
                AppError::Internal(err.to_string())
            })?
            .ok_or_else(|| missing(id))?;

        debug!("Post {} now has {} likes", id, post.like_count);
        Ok(Json(post))
    }
}

pub fn router() -> Router<ArcAppState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        .route("/{id}", patch(update::handler).delete(delete::handler))
        .route("/{id}/likePost", patch(like::handler))
}
