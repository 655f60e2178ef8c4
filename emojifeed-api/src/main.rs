use emojifeed_api::{
    config::Env,
    identity::{
        clerk::ClerkClient,
        session::{SessionError, SessionVerifier},
    },
    server::{self, ServerState},
};
use emojifeed_common::snowflake::{WorkerId, WorkerIdOutOfRangeError};
use emojifeed_db::{client::DbClient, store::StoreError};
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Invalid worker id: {0}")]
    WorkerId(#[from] WorkerIdOutOfRangeError),
    #[error("Error connecting to the database: {0}")]
    Database(#[from] StoreError),
    #[error("Error setting up session verification: {0}")]
    Session(#[from] SessionError),
    #[error("Error building http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "emojifeed_api=debug,\
                emojifeed_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

async fn build_state(env: &Env) -> Result<ServerState, InitError> {
    let worker_id = WorkerId::try_from(env.worker_id)?;
    let db_client = DbClient::connect(
        &env.database_url,
        env.database_max_connections,
        worker_id,
    )
    .await?;

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let identity = ClerkClient::new(http, &env.identity_api_url, env.identity_secret_key.clone());

    let sessions =
        SessionVerifier::from_rsa_pem(&env.session_public_key, env.session_issuer.as_deref())?;

    Ok(ServerState {
        store: Arc::new(db_client),
        identity: Arc::new(identity),
        sessions: Arc::new(sessions),
    })
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down");
    token.cancel();
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;
    debug!(?env, "Loaded configuration");

    let state = build_state(&env).await?;
    let app = server::app(state);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
