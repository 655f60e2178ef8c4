use crate::model::{
    author::{AuthorId, AuthorProfile},
    post::Post,
};
use serde::{Deserialize, Serialize};

/// Most posts a feed contains.
pub const FEED_LIMIT: usize = 100;

/// Author of a feed entry. Unlike [`AuthorProfile`] the username is guaranteed.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedAuthor {
    pub id: AuthorId,
    pub username: String,
    pub image_url: String,
}

impl FeedAuthor {
    /// Returns `None` if the profile has no usable username.
    #[must_use]
    pub fn from_profile(profile: &AuthorProfile) -> Option<Self> {
        let username = profile.username.as_deref().filter(|name| !name.is_empty())?;

        Some(Self {
            id: profile.id.clone(),
            username: username.to_owned(),
            image_url: profile.image_url.clone(),
        })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct FeedEntry {
    pub post: Post,
    pub author: FeedAuthor,
}
