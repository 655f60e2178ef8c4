use clap::{Parser, Subcommand};
use emojifeed_client::{
    api::{ClientError, HttpFeedApi, Session},
    cache::FeedCache,
    composer::Composer,
    view,
};
use std::{process::ExitCode, sync::Arc};
use time::OffsetDateTime;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Read and post to the emoji feed.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Base URL of the feed server.
    #[arg(long, env = "EMOJIFEED_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Session token of the signed in user.
    #[arg(long, env = "EMOJIFEED_SESSION", hide_env_values = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the feed (the default).
    Feed,
    /// Post some emojis, then show the updated feed.
    Post { content: String },
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emojifeed_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let api = HttpFeedApi::new(reqwest::Client::new(), &cli.api_url);
    let session = cli.session.map(Session::new);

    let cache = Arc::new(FeedCache::new());
    let mut composer = Composer::new();
    composer.subscribe(cache.clone());

    // Warm the cache like the page does before anything is posted.
    if let Err(e) = cache.get(&api).await {
        debug!(error = %e, "Could not warm feed cache");
    }

    if let Some(Command::Post { content }) = cli.command {
        composer.set_input(content);
        if let Err(e) = composer.submit(&api, session.as_ref()).await {
            warn!(error = %e, "Posting failed");
            return Err(e);
        }
    }

    let feed = cache.get(&api).await;
    if let Err(e) = &feed {
        warn!(error = %e, "Could not load feed");
    }

    println!(
        "{}",
        view::render_home(
            session.as_ref(),
            &composer,
            feed.as_deref(),
            OffsetDateTime::now_utc()
        )
    );

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    install_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
