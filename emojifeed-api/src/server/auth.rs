use crate::{
    identity::{Principal, session::SessionVerifier},
    server::ServerError,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

impl<S> FromRequestParts<S> for Principal
where
    Arc<SessionVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            AuthorizationHeader::from_request_parts(parts, state)
                .await
                .map_err(ServerError::InvalidAuthorizationHeader)?;

        let principal = Arc::<SessionVerifier>::from_ref(state).verify(bearer.token())?;

        Ok(principal)
    }
}
