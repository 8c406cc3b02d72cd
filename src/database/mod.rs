use async_trait::async_trait;
use thiserror::Error;

use crate::entities::post::{Document, DocumentError, Post, PostId};

pub mod memory;
pub mod posts;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("{0}")]
    Build(#[from] deadpool_postgres::BuildError),

    #[error("{0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("likeCount of post {0} cannot grow any further")]
    LikeOverflow(PostId),

    #[error("post id {0} is outside the BIGINT key range")]
    IdOutOfRange(String),
}

/// Single collection of posts. Every call is independent, implementations
/// hold no per-request state.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts in creation order
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    /// Stores a new post under a freshly assigned id
    async fn create(&self, draft: Document) -> Result<Post, StoreError>;

    /// Merges top-level fields of `patch` into the post.
    /// Returns `None` when no post has this id.
    async fn update(&self, id: PostId, patch: Document) -> Result<Option<Post>, StoreError>;

    /// Returns whether a post was removed
    async fn delete(&self, id: PostId) -> Result<bool, StoreError>;

    /// Atomically adds one like, a missing count counts as 0
    async fn like(&self, id: PostId) -> Result<Option<Post>, StoreError>;
}
