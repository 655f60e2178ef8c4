use async_trait::async_trait;
use emojifeed_common::{
    model::{
        ModelValidationError,
        post::{CreatePost, Post},
    },
    snowflake::SnowflakeTimeError,
};
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Could not generate a post id: {0}")]
    Snowflake(#[from] SnowflakeTimeError),
    #[error("The requested limit {0} is out of range")]
    Limit(usize),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence of posts.
///
/// Posts are only ever inserted and read, never updated or deleted.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// The `limit` most recent posts, newest first.
    async fn fetch_recent_posts(&self, limit: usize) -> Result<Vec<Post>>;

    /// Inserts a post. The store assigns the id and the creation time.
    async fn create_post(&self, post: &CreatePost) -> Result<Post>;
}
