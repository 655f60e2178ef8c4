use crate::{
    identity::{
        IdentityProvider,
        session::{SessionError, SessionVerifier},
    },
    service,
};
use axum::{
    Router,
    extract::{FromRef, Request, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use emojifeed_common::model::error::ErrorResponse;
use emojifeed_db::store::PostStore;
use json::Json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

mod auth;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub store: Arc<dyn PostStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionVerifier>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

/// The complete application, ready to be served.
pub fn app(state: ServerState) -> Router {
    routes().layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error(transparent)]
    InvalidSession(#[from] SessionError),
    #[error(transparent)]
    Service(#[from] service::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(_) | ServerError::InvalidSession(_) => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::JsonRejection(rejection) => rejection.status(),
            ServerError::JsonResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Service(error) => error.status(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        // Server side details stay in the log.
        let message = status.is_client_error().then(|| self.to_string());
        let error_response = ErrorResponse {
            status: status.as_u16(),
            message,
        };
        (status, Json(error_response)).into_response()
    }
}
