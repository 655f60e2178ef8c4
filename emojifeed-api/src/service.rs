//! The two operations the feed offers: reading it and posting to it.

use crate::identity::{IdentityError, IdentityProvider, Principal};
use axum::http::StatusCode;
use emojifeed_common::model::{
    Id,
    feed::{FEED_LIMIT, FeedAuthor, FeedEntry},
    post::{CreatePost, CreatePostRequest, InvalidPostContentError, Post, PostContent, PostMarker},
};
use emojifeed_db::store::{PostStore, StoreError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Author for post {0} not found")]
    AuthorNotFound(Id<PostMarker>),
    #[error("Invalid post: {0}")]
    InvalidContent(#[from] InvalidPostContentError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidContent(_) => StatusCode::BAD_REQUEST,
            Error::AuthorNotFound(_) | Error::Store(_) | Error::Identity(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Assembles the feed: the newest posts, each joined with its author.
///
/// Authors are resolved with a single batched lookup. If any post's author is
/// unknown or has no username, the whole feed fails instead of leaving that
/// post out.
pub async fn feed(
    store: &dyn PostStore,
    identity: &dyn IdentityProvider,
) -> Result<Vec<FeedEntry>, Error> {
    let posts = store.fetch_recent_posts(FEED_LIMIT).await?;
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let mut author_ids = Vec::new();
    for post in &posts {
        if !author_ids.contains(&post.author_id) {
            author_ids.push(post.author_id.clone());
        }
    }

    let profiles = identity.fetch_profiles(&author_ids, FEED_LIMIT).await?;
    debug!(
        posts = posts.len(),
        authors = author_ids.len(),
        profiles = profiles.len(),
        "Joining feed"
    );

    posts
        .into_iter()
        .map(|post| -> Result<FeedEntry, Error> {
            let author = profiles
                .iter()
                .find(|profile| profile.id == post.author_id)
                .and_then(FeedAuthor::from_profile)
                .ok_or(Error::AuthorNotFound(post.id))?;

            Ok(FeedEntry { post, author })
        })
        .collect()
}

/// Creates a post on behalf of `principal`.
///
/// Requiring a [`Principal`] means the caller is authenticated before the
/// content is ever looked at.
pub async fn create_post(
    store: &dyn PostStore,
    principal: &Principal,
    request: CreatePostRequest,
) -> Result<Post, Error> {
    let content = PostContent::new(request.content)?;

    let post = store
        .create_post(&CreatePost {
            author_id: principal.author_id().clone(),
            content,
        })
        .await?;

    info!(post = %post.id, author = %post.author_id, "Created post");

    Ok(post)
}
