use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use serde_json::Value;
use tokio_postgres::{Config as PgConfig, NoTls, Row};
use tracing::info;

use crate::{
    database::{PostStore, StoreError},
    entities::post::{Document, Post, PostId, sanitize},
    utils::snowflake::SnowflakeGenerator,
};

pub static SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS posts (
        id  BIGINT PRIMARY KEY,
        doc JSONB  NOT NULL
    )
";

pub static LIST_SQL: &str = "SELECT id, doc FROM posts ORDER BY id";

pub static INSERT_SQL: &str = "
    INSERT INTO posts (id, doc)
    VALUES ($1, $2)
    RETURNING id, doc
";

// Shallow merge, same as a top-level $set
pub static UPDATE_SQL: &str = "
    UPDATE posts
    SET doc = doc || $2
    WHERE id = $1
    RETURNING id, doc
";

pub static DELETE_SQL: &str = "DELETE FROM posts WHERE id = $1";

// Single statement so concurrent likes cannot overwrite each other
pub static LIKE_SQL: &str = "
    UPDATE posts
    SET doc = jsonb_set(
        doc,
        '{likeCount}',
        to_jsonb(COALESCE((doc->>'likeCount')::bigint, 0) + 1)
    )
    WHERE id = $1
    RETURNING id, doc
";

/// Posts kept as JSONB documents in PostgreSQL
pub struct PgPostStore {
    pool: Pool,
    snowflake: SnowflakeGenerator,
}

/// Private function to get Post entity from Row
/// Row needs to have `id` and `doc` columns
fn row_to_post(row: &Row) -> Result<Post, StoreError> {
    let id: i64 = row.try_get("id")?;
    let id = u64::try_from(id).map_err(|_| StoreError::IdOutOfRange(id.to_string()))?;
    let doc: Value = row.try_get("doc")?;
    let doc = match doc {
        Value::Object(doc) => doc,
        _ => Document::new(),
    };
    Ok(Post::from_document(PostId::new(id), doc)?)
}

fn sql_id(id: PostId) -> Result<i64, StoreError> {
    i64::try_from(id.get()).map_err(|_| StoreError::IdOutOfRange(id.to_string()))
}

impl PgPostStore {
    /// Builds the pool and makes sure the posts table exists.
    /// Fails when the database cannot be reached.
    pub async fn connect(
        url: &str,
        connections: usize,
        snowflake: SnowflakeGenerator,
    ) -> Result<Self, StoreError> {
        let pg_config: PgConfig = url.parse()?;
        let mgr = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(mgr).max_size(connections).build()?;

        let store = Self { pool, snowflake };
        store.ensure_schema().await?;
        info!("PostgreSQL connected, posts table ready");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let db = self.pool.get().await?;
        db.batch_execute(SCHEMA_SQL).await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let db = self.pool.get().await?;
        let rows = db.query(LIST_SQL, &[]).await?;
        rows.iter().map(row_to_post).collect()
    }

    async fn create(&self, draft: Document) -> Result<Post, StoreError> {
        let id = PostId::new(self.snowflake.generate());
        // Decoding first rejects drafts the typed fields cannot hold
        let post = Post::from_document(id, sanitize(draft)?)?;
        let doc = Value::Object(post.into_document());

        let db = self.pool.get().await?;
        let row = db.query_one(INSERT_SQL, &[&sql_id(id)?, &doc]).await?;
        row_to_post(&row)
    }

    async fn update(&self, id: PostId, patch: Document) -> Result<Option<Post>, StoreError> {
        let patch = Value::Object(sanitize(patch)?);

        let db = self.pool.get().await?;
        let row = db.query_opt(UPDATE_SQL, &[&sql_id(id)?, &patch]).await?;
        row.as_ref().map(row_to_post).transpose()
    }

    async fn delete(&self, id: PostId) -> Result<bool, StoreError> {
        let db = self.pool.get().await?;
        let removed = db.execute(DELETE_SQL, &[&sql_id(id)?]).await?;
        Ok(removed > 0)
    }

    async fn like(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let db = self.pool.get().await?;
        let row = db.query_opt(LIKE_SQL, &[&sql_id(id)?]).await?;
        row.as_ref().map(row_to_post).transpose()
    }
}
