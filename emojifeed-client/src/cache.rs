use crate::api::{ClientError, FeedApi};
use emojifeed_common::model::{feed::FeedEntry, post::Post};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Notified after a post was created successfully.
pub trait PostCreatedListener: Send + Sync {
    fn post_created(&self, post: &Post);
}

/// Locally cached copy of the feed.
///
/// The cache is filled on the first read and kept until it is invalidated,
/// which happens whenever a post is created through a composer it listens to.
/// A fetch that was overtaken by an invalidation is returned to its caller but
/// not cached.
#[derive(Debug, Default)]
pub struct FeedCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: Option<Vec<FeedEntry>>,
    generation: u64,
}

impl FeedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached feed, fetching it first if there is none.
    pub async fn get(&self, api: &dyn FeedApi) -> Result<Vec<FeedEntry>, ClientError> {
        let generation = {
            let state = self.lock();
            if let Some(entries) = &state.entries {
                return Ok(entries.clone());
            }
            state.generation
        };

        let entries = api.feed().await?;

        let mut state = self.lock();
        if state.generation == generation {
            state.entries = Some(entries.clone());
        } else {
            debug!("Feed was invalidated while fetching, not caching it");
        }

        Ok(entries)
    }

    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        if state.entries.take().is_some() {
            debug!("Invalidated cached feed");
        }
    }

    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.lock().entries.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PostCreatedListener for FeedCache {
    fn post_created(&self, _post: &Post) {
        self.invalidate();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        api::{ClientError, FeedApi, Session},
        cache::{FeedCache, PostCreatedListener},
    };
    use async_trait::async_trait;
    use emojifeed_common::model::{
        author::AuthorId,
        feed::{FeedAuthor, FeedEntry},
        post::{Post, PostContent},
    };
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use time::macros::datetime;

    /// Serves the posts it was given; posts created through it are prepended.
    #[derive(Debug, Default)]
    pub(crate) struct FakeApi {
        pub entries: Mutex<Vec<FeedEntry>>,
        pub feed_calls: AtomicUsize,
        pub fail_create: bool,
    }

    pub(crate) fn entry(id: u64, content: &str) -> FeedEntry {
        let author_id = AuthorId::new("user_ada".to_owned()).unwrap();
        FeedEntry {
            post: Post {
                id: id.into(),
                author_id: author_id.clone(),
                content: PostContent::new(content.to_owned()).unwrap(),
                created_at: datetime!(2026-10-18 09:00 UTC),
            },
            author: FeedAuthor {
                id: author_id,
                username: "ada".to_owned(),
                image_url: "https://img.example/ada.png".to_owned(),
            },
        }
    }

    #[async_trait]
    impl FeedApi for FakeApi {
        async fn feed(&self) -> Result<Vec<FeedEntry>, ClientError> {
            self.feed_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn create_post(
            &self,
            _session: &Session,
            content: &str,
        ) -> Result<Post, ClientError> {
            if self.fail_create {
                return Err(ClientError::Api {
                    status: 400,
                    message: Some("Post content may only contain emojis".to_owned()),
                });
            }

            let mut entries = self.entries.lock().unwrap();
            let next_id = entries.len() as u64 + 1;
            let new_entry = entry(next_id, content);
            entries.insert(0, new_entry.clone());

            Ok(new_entry.post)
        }
    }

    /// Invalidates the cache it is given in the middle of every fetch, like a
    /// post landing while the feed request is in flight.
    struct InvalidatingApi<'a> {
        cache: &'a FeedCache,
        inner: FakeApi,
    }

    #[async_trait]
    impl FeedApi for InvalidatingApi<'_> {
        async fn feed(&self) -> Result<Vec<FeedEntry>, ClientError> {
            let entries = self.inner.feed().await;
            self.cache.invalidate();
            entries
        }

        async fn create_post(
            &self,
            session: &Session,
            content: &str,
        ) -> Result<Post, ClientError> {
            self.inner.create_post(session, content).await
        }
    }

    #[tokio::test]
    async fn fetch_overtaken_by_invalidation_is_not_cached() {
        let cache = FeedCache::new();
        let racing = InvalidatingApi {
            cache: &cache,
            inner: FakeApi::default(),
        };

        assert!(cache.get(&racing).await.unwrap().is_empty());
        assert!(!cache.is_cached());

        let api = FakeApi {
            entries: Mutex::new(vec![entry(1, "😀")]),
            ..FakeApi::default()
        };
        assert_eq!(cache.get(&api).await.unwrap().len(), 1);
        assert_eq!(api.feed_calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached());
    }

    #[tokio::test]
    async fn serves_from_cache_until_invalidated() {
        let api = FakeApi {
            entries: Mutex::new(vec![entry(1, "😀")]),
            ..FakeApi::default()
        };
        let cache = FeedCache::new();
        assert!(!cache.is_cached());

        assert_eq!(cache.get(&api).await.unwrap().len(), 1);
        assert_eq!(cache.get(&api).await.unwrap().len(), 1);
        assert_eq!(api.feed_calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached());

        api.entries.lock().unwrap().insert(0, entry(2, "🎉"));
        cache.post_created(&entry(2, "🎉").post);
        assert!(!cache.is_cached());

        let entries = cache.get(&api).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].post.content.get(), "🎉");
        assert_eq!(api.feed_calls.load(Ordering::SeqCst), 2);
    }
}
