use serde::{Deserialize, Serialize};

/// Body of every non-successful API response.
///
/// `message` is only filled in for client errors.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
