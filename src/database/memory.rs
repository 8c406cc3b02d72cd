//! Process-local post store.
//!
//! Selected with `CONNECTION_URL=memory://` and used by the tests. Data is
//! lost when the process exits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    database::{PostStore, StoreError},
    entities::post::{Document, MAX_LIKE_COUNT, Post, PostId, sanitize},
    utils::snowflake::SnowflakeGenerator,
};

pub struct MemoryPostStore {
    // Snowflake ids grow with time, so key order is creation order
    posts: RwLock<BTreeMap<PostId, Post>>,
    snowflake: SnowflakeGenerator,
}

impl MemoryPostStore {
    pub fn new(snowflake: SnowflakeGenerator) -> Self {
        Self {
            posts: RwLock::new(BTreeMap::new()),
            snowflake,
        }
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

impl Default for MemoryPostStore {
    fn default() -> Self {
        Self::new(SnowflakeGenerator::new(0, 0))
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.posts.read().await.values().cloned().collect())
    }

    async fn create(&self, draft: Document) -> Result<Post, StoreError> {
        let id = PostId::new(self.snowflake.generate());
        let post = Post::from_document(id, sanitize(draft)?)?;
        self.posts.write().await.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: PostId, patch: Document) -> Result<Option<Post>, StoreError> {
        let patch = sanitize(patch)?;

        let mut posts = self.posts.write().await;
        let Some(current) = posts.get_mut(&id) else {
            return Ok(None);
        };

        let mut doc = current.clone().into_document();
        doc.extend(patch);
        let updated = Post::from_document(id, doc)?;
        *current = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: PostId) -> Result<bool, StoreError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }

    async fn like(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id) else {
            return Ok(None);
        };

        post.like_count = post
            .like_count
            .checked_add(1)
            .filter(|count| *count <= MAX_LIKE_COUNT)
            .ok_or(StoreError::LikeOverflow(id))?;
        Ok(Some(post.clone()))
    }
}
