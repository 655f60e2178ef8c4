use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const AUTHOR_ID_MAX_LEN: usize = 128;

/// Identifier of an account at the identity provider.
///
/// Authors are not owned by this system, so the id is kept opaque.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthorId(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The author id is invalid: {0:?}")]
pub struct InvalidAuthorIdError(String);

impl AuthorId {
    pub fn new(id: String) -> Result<Self, InvalidAuthorIdError> {
        let valid = !id.is_empty()
            && id.len() <= AUTHOR_ID_MAX_LEN
            && !id.chars().any(|c| c.is_whitespace() || c.is_control());

        if valid {
            Ok(Self(id))
        } else {
            Err(InvalidAuthorIdError(id))
        }
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

impl Display for AuthorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AuthorId {
    type Error = InvalidAuthorIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for AuthorId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        AuthorId::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"AuthorId"))
    }
}

/// Public profile fields as reported by the identity provider.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: AuthorId,
    pub username: Option<String>,
    pub image_url: String,
}
