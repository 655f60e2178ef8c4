use crate::{
    record::PostRecord,
    store::{PostStore, Result, StoreError},
};
use async_trait::async_trait;
use emojifeed_common::{
    model::post::{CreatePost, Post},
    snowflake::{SnowflakeGenerator, WorkerId},
};
use sqlx::{PgPool, postgres::PgPoolOptions, query_as};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub struct DbClient {
    pool: PgPool,
    snowflake_generator: Mutex<SnowflakeGenerator>,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool, worker_id: WorkerId) -> Self {
        Self {
            pool,
            snowflake_generator: Mutex::new(SnowflakeGenerator::new(worker_id)),
        }
    }

    pub async fn connect(url: &str, max_connections: u32, worker_id: WorkerId) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        debug!(max_connections, "Connected to database");

        Ok(Self::new(pool, worker_id))
    }
}

impl std::fmt::Debug for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbClient")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PostStore for DbClient {
    async fn fetch_recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let sql_limit = i64::try_from(limit).map_err(|_| StoreError::Limit(limit))?;

        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_snowflake,
                posts.author_id,
                posts.content,
                posts.created_at
            FROM
                posts.posts
            ORDER BY
                posts.created_at DESC,
                posts.post_snowflake DESC
            LIMIT $1
            ",
        )
        .bind(sql_limit)
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        // The generator never holds invalid state, so a poisoned lock is still usable.
        let post_snowflake = self
            .snowflake_generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()?;

        let record = query_as::<_, PostRecord>(
            "
            INSERT INTO posts.posts (post_snowflake, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING
                posts.post_snowflake,
                posts.author_id,
                posts.content,
                posts.created_at
            ",
        )
        .bind(post_snowflake.get().cast_signed())
        .bind(post.author_id.get())
        .bind(post.content.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(Post::try_from(record)?)
    }
}
