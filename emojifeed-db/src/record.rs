use emojifeed_common::model::{
    ModelValidationError,
    author::AuthorId,
    post::{Post, PostContent},
};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub post_snowflake: i64,
    pub author_id: String,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_snowflake.cast_unsigned().into(),
            author_id: AuthorId::new(value.author_id)?,
            content: PostContent::new(value.content)?,
            created_at: value.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::PostRecord;
    use emojifeed_common::model::{ModelValidationError, post::Post};
    use time::macros::datetime;

    fn record(author_id: &str, content: &str) -> PostRecord {
        PostRecord {
            post_snowflake: -1,
            author_id: author_id.to_owned(),
            content: content.to_owned(),
            created_at: datetime!(2026-05-01 12:00 UTC),
        }
    }

    #[test]
    fn converts_valid_rows() {
        let post = Post::try_from(record("user_1", "🦀")).unwrap();

        assert_eq!(u64::from(post.id), u64::MAX);
        assert_eq!(post.author_id.get(), "user_1");
        assert_eq!(post.content.get(), "🦀");
        assert_eq!(post.created_at, datetime!(2026-05-01 12:00 UTC));
    }

    #[test]
    fn converts_keycap_base_rows() {
        let post = Post::try_from(record("user_1", "123")).unwrap();
        assert_eq!(post.content.get(), "123");
    }

    #[test]
    fn rejects_invalid_rows() {
        assert!(matches!(
            Post::try_from(record("", "🦀")),
            Err(ModelValidationError::AuthorId(_))
        ));
        assert!(matches!(
            Post::try_from(record("user_1", "crab")),
            Err(ModelValidationError::PostContent(_))
        ));
    }
}
