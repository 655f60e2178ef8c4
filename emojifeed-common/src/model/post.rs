use crate::model::{Id, author::AuthorId};
use regex::Regex;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::sync::LazyLock;
use thiserror::Error;
use time::OffsetDateTime;

/// Maximum post length, counted in UTF-16 code units like a browser input does.
pub const POST_CONTENT_MAX_LEN: usize = 150;

// Emoji components include the bare keycap bases `#`, `*` and `0`-`9`.
static EMOJI_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\p{Extended_Pictographic}|\p{Emoji_Component})+$")
        .expect("emoji pattern is valid")
});

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author_id: AuthorId,
    pub content: PostContent,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreatePost {
    pub author_id: AuthorId,
    pub content: PostContent,
}

/// Request body of a post creation.
///
/// The content stays unvalidated here so that authentication can be checked
/// before the content policy.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreatePostRequest {
    pub content: String,
}

/// Text of a post: 1 to [`POST_CONTENT_MAX_LEN`] UTF-16 code units, emoji only.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct PostContent(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidPostContentError {
    #[error("Post content must not be empty")]
    Empty,
    #[error("Post content is {len} characters long, at most {POST_CONTENT_MAX_LEN} are allowed")]
    TooLong { len: usize },
    #[error("Post content may only contain emojis")]
    NotEmoji,
}

impl PostContent {
    pub fn new(content: String) -> Result<Self, InvalidPostContentError> {
        if content.is_empty() {
            return Err(InvalidPostContentError::Empty);
        }

        let len = content.encode_utf16().count();
        if len > POST_CONTENT_MAX_LEN {
            return Err(InvalidPostContentError::TooLong { len });
        }

        if !EMOJI_ONLY.is_match(&content) {
            return Err(InvalidPostContentError::NotEmoji);
        }

        Ok(Self(content))
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for PostContent {
    type Error = InvalidPostContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for PostContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        PostContent::new(inner.clone())
            .map_err(|_| Error::invalid_value(Unexpected::Str(&inner), &"emoji-only post content"))
    }
}
