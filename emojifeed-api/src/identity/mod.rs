//! Everything that talks to the identity provider: profile lookups and
//! session verification.

pub mod clerk;
pub mod directory;
pub mod session;

use async_trait::async_trait;
use emojifeed_common::model::author::{AuthorId, AuthorProfile, InvalidAuthorIdError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Identity provider replied with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Identity provider returned an invalid user: {0}")]
    InvalidProfile(#[from] InvalidAuthorIdError),
}

/// Batched lookup of public author profiles.
///
/// Implementations return at most `limit` profiles and silently leave out ids
/// they do not know. Deciding what a missing profile means is up to the caller.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_profiles(
        &self,
        ids: &[AuthorId],
        limit: usize,
    ) -> Result<Vec<AuthorProfile>, IdentityError>;
}

/// The authenticated identity a request acts on behalf of.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct Principal {
    author_id: AuthorId,
}

impl Principal {
    #[must_use]
    pub fn new(author_id: AuthorId) -> Self {
        Self { author_id }
    }

    #[must_use]
    pub fn author_id(&self) -> &AuthorId {
        &self.author_id
    }
}
