use crate::{
    identity::{IdentityProvider, Principal},
    server::{Result, ServerRouter, json::Json},
    service,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use emojifeed_common::model::{
    feed::FeedEntry,
    post::{CreatePostRequest, Post},
};
use emojifeed_db::store::PostStore;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_feed)
        .typed_post(create_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts")]
struct FeedPath;

async fn get_feed(
    _: FeedPath,
    State(store): State<Arc<dyn PostStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
) -> Result<Json<Vec<FeedEntry>>> {
    let entries = service::feed(store.as_ref(), identity.as_ref()).await?;

    Ok(Json(entries))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/create")]
struct CreatePostPath;

// `Principal` is extracted before the body so unauthenticated requests are
// turned away before their content is parsed.
async fn create_post(
    _: CreatePostPath,
    State(store): State<Arc<dyn PostStore>>,
    principal: Principal,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = service::create_post(store.as_ref(), &principal, request).await?;

    Ok((StatusCode::CREATED, Json(post)))
}
