use emojifeed_api::{
    identity::{directory::StaticDirectory, session::SessionVerifier},
    server::{self, ServerState},
};
use emojifeed_client::{
    api::{ClientError, FeedApi, HttpFeedApi, Session},
    cache::FeedCache,
    composer::Composer,
    view,
};
use emojifeed_common::model::author::{AuthorId, AuthorProfile};
use emojifeed_db::memory::MemoryPostStore;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode, get_current_timestamp};
use serde_json::json;
use std::sync::Arc;
use time::OffsetDateTime;

const SECRET: &[u8] = b"client-test-secret";

async fn spawn_server() -> HttpFeedApi {
    let state = ServerState {
        store: Arc::new(MemoryPostStore::default()),
        identity: Arc::new(StaticDirectory::new(vec![AuthorProfile {
            id: AuthorId::new("user_ada".to_owned()).unwrap(),
            username: Some("Ada".to_owned()),
            image_url: "https://img.example/ada.png".to_owned(),
        }])),
        sessions: Arc::new(SessionVerifier::new(
            DecodingKey::from_secret(SECRET),
            Algorithm::HS256,
            None,
        )),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, server::app(state)).await.unwrap() });

    HttpFeedApi::new(reqwest::Client::new(), &format!("http://{address}"))
}

fn session(user: &str) -> Session {
    Session::new(
        encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": user, "exp": get_current_timestamp() + 600 }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn posting_refreshes_cached_feed() {
    let api = spawn_server().await;
    let session = session("user_ada");

    let cache = Arc::new(FeedCache::new());
    let mut composer = Composer::new();
    composer.subscribe(cache.clone());

    assert!(cache.get(&api).await.unwrap().is_empty());
    assert!(cache.is_cached());

    for content in ["😀", "😀😀"] {
        composer.set_input(content);
        composer.submit(&api, Some(&session)).await.unwrap();
        assert_eq!(composer.input(), "");
        assert!(!cache.is_cached());
    }

    let entries = cache.get(&api).await.unwrap();
    let contents: Vec<_> = entries.iter().map(|e| e.post.content.get()).collect();
    assert_eq!(contents, ["😀😀", "😀"]);

    let page = view::render_home(
        Some(&session),
        &composer,
        Ok::<_, ClientError>(entries.as_slice()),
        OffsetDateTime::now_utc(),
    );
    assert!(page.contains("@Ada · a few seconds ago\n😀😀"));
}

#[tokio::test]
async fn rejected_post_reports_reason() {
    let api = spawn_server().await;
    let mut composer = Composer::new();

    composer.set_input("hello");
    let error = composer
        .submit(&api, Some(&session("user_ada")))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ClientError::Api { status: 400, message: Some(_) }
    ));
    assert_eq!(composer.input(), "hello");
    assert!(api.feed().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_session_is_unauthorized() {
    let api = spawn_server().await;

    let error = api
        .create_post(&Session::new("expired".to_owned()), "😀")
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Api { status: 401, .. }));
}
