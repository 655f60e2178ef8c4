use crate::identity::{IdentityError, IdentityProvider};
use async_trait::async_trait;
use emojifeed_common::model::author::{AuthorId, AuthorProfile};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.clerk.com";

/// A user as returned by the backend API.
///
/// Only the fields shown publicly are deserialized; the rest of the account
/// never leaves the provider.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct ClerkUser {
    id: String,
    first_name: Option<String>,
    #[serde(default)]
    image_url: String,
}

impl TryFrom<ClerkUser> for AuthorProfile {
    type Error = IdentityError;

    fn try_from(value: ClerkUser) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuthorId::new(value.id)?,
            username: value.first_name,
            image_url: value.image_url,
        })
    }
}

/// Client for the Clerk backend API.
#[derive(Clone)]
pub struct ClerkClient {
    http: Client,
    api_url: String,
    secret_key: String,
}

impl ClerkClient {
    #[must_use]
    pub fn new(http: Client, api_url: &str, secret_key: String) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
            secret_key,
        }
    }
}

impl std::fmt::Debug for ClerkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkClient")
            .field("api_url", &self.api_url)
            .field("secret_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn fetch_profiles(
        &self,
        ids: &[AuthorId],
        limit: usize,
    ) -> Result<Vec<AuthorProfile>, IdentityError> {
        // Without a user_id filter the endpoint lists every user.
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: Vec<(&str, String)> = ids
            .iter()
            .map(|id| ("user_id", id.get().to_owned()))
            .collect();
        query.push(("limit", limit.to_string()));

        let response = self
            .http
            .get(format!("{}/v1/users", self.api_url))
            .bearer_auth(&self.secret_key)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let users: Vec<ClerkUser> = response.json().await?;
        debug!(requested = ids.len(), received = users.len(), "Fetched user list");

        users
            .into_iter()
            .take(limit)
            .map(AuthorProfile::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::identity::{IdentityError, IdentityProvider, clerk::ClerkClient};
    use axum::{
        Json, Router,
        extract::RawQuery,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use emojifeed_common::model::author::AuthorId;
    use serde_json::json;
    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    type SeenQueries = Arc<Mutex<Vec<String>>>;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        address
    }

    fn client(address: SocketAddr) -> ClerkClient {
        ClerkClient::new(
            reqwest::Client::new(),
            &format!("http://{address}/"),
            "sk_test_secret".to_owned(),
        )
    }

    fn ids(ids: &[&str]) -> Vec<AuthorId> {
        ids.iter()
            .map(|id| AuthorId::new((*id).to_owned()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn fetches_profiles() {
        let seen: SeenQueries = Arc::default();
        let seen_by_stub = Arc::clone(&seen);

        let router = Router::new().route(
            "/v1/users",
            get(move |headers: HeaderMap, RawQuery(query): RawQuery| async move {
                seen_by_stub.lock().unwrap().push(query.unwrap_or_default());

                if headers.get("authorization").and_then(|v| v.to_str().ok())
                    != Some("Bearer sk_test_secret")
                {
                    return StatusCode::UNAUTHORIZED.into_response();
                }

                Json(json!([
                    {
                        "id": "user_a",
                        "first_name": "Ada",
                        "last_name": "Lovelace",
                        "image_url": "https://img.example/a.png",
                        "email_addresses": []
                    },
                    {
                        "id": "user_b",
                        "first_name": null,
                        "image_url": "https://img.example/b.png"
                    }
                ]))
                .into_response()
            }),
        );
        let address = serve(router).await;

        let profiles = client(address)
            .fetch_profiles(&ids(&["user_a", "user_b"]), 100)
            .await
            .unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id.get(), "user_a");
        assert_eq!(profiles[0].username.as_deref(), Some("Ada"));
        assert_eq!(profiles[0].image_url, "https://img.example/a.png");
        assert_eq!(profiles[1].username, None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["user_id=user_a&user_id=user_b&limit=100".to_owned()]
        );
    }

    #[tokio::test]
    async fn surfaces_error_status() {
        let router = Router::new().route(
            "/v1/users",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let address = serve(router).await;

        let error = client(address)
            .fetch_profiles(&ids(&["user_a"]), 100)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            IdentityError::Status { status: 429, ref body } if body == "slow down"
        ));
    }

    #[tokio::test]
    async fn skips_request_without_ids() {
        // Nothing listens on this address, so any request would fail.
        let client = ClerkClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "sk_test_secret".to_owned(),
        );

        assert_eq!(client.fetch_profiles(&[], 100).await.unwrap(), Vec::new());
    }
}
