use async_trait::async_trait;
use emojifeed_common::model::{
    error::ErrorResponse,
    feed::FeedEntry,
    post::{CreatePostRequest, Post},
};
use reqwest::{Client, Response};
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server replied with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },
    #[error("Sign in to post")]
    SignInRequired,
}

/// A signed in session, as handed out by the identity provider.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Session {
    token: String,
}

impl Session {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self { token }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[redacted]")
            .finish()
    }
}

/// The remote procedures the server offers.
#[async_trait]
pub trait FeedApi: Send + Sync {
    async fn feed(&self) -> Result<Vec<FeedEntry>, ClientError>;

    async fn create_post(&self, session: &Session, content: &str) -> Result<Post, ClientError>;
}

#[derive(Clone, Debug)]
pub struct HttpFeedApi {
    http: Client,
    base_url: String,
}

impl HttpFeedApi {
    #[must_use]
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn error_for_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn feed(&self) -> Result<Vec<FeedEntry>, ClientError> {
        let response = self
            .http
            .get(format!("{}/posts", self.base_url))
            .send()
            .await?;

        let entries: Vec<FeedEntry> = Self::error_for_status(response).await?.json().await?;
        debug!(entries = entries.len(), "Fetched feed");

        Ok(entries)
    }

    async fn create_post(&self, session: &Session, content: &str) -> Result<Post, ClientError> {
        let response = self
            .http
            .post(format!("{}/posts/create", self.base_url))
            .bearer_auth(session.token())
            .json(&CreatePostRequest {
                content: content.to_owned(),
            })
            .send()
            .await?;

        let post: Post = Self::error_for_status(response).await?.json().await?;
        debug!(post = %post.id, "Created post");

        Ok(post)
    }
}
