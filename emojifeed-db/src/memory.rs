use crate::store::{PostStore, Result};
use async_trait::async_trait;
use emojifeed_common::{
    model::post::{CreatePost, Post},
    snowflake::{SnowflakeGenerator, WorkerId},
};
use std::sync::{Mutex, PoisonError};
use time::OffsetDateTime;

#[derive(Debug, Default)]
struct MemoryPosts {
    posts: Vec<Post>,
    snowflake_generator: SnowflakeGenerator,
}

/// A [`PostStore`] that lives in process memory.
///
/// Keeps the ordering guarantees of the database: newest first, ties broken by
/// the higher id.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    inner: Mutex<MemoryPosts>,
}

impl MemoryPostStore {
    #[must_use]
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            inner: Mutex::new(MemoryPosts {
                posts: Vec::new(),
                snowflake_generator: SnowflakeGenerator::new(worker_id),
            }),
        }
    }

    /// Inserts an already persisted post, e.g. one with a backdated timestamp.
    pub fn insert(&self, post: Post) {
        self.lock().posts.push(post);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryPosts> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn fetch_recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let mut posts = self.lock().posts.clone();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts.truncate(limit);

        Ok(posts)
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        let mut inner = self.lock();
        let created_at = OffsetDateTime::now_utc();
        let id = inner.snowflake_generator.generate_at(created_at)?;

        let post = Post {
            id: id.into(),
            author_id: post.author_id.clone(),
            content: post.content.clone(),
            created_at,
        };
        inner.posts.push(post.clone());

        Ok(post)
    }
}
