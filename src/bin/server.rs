use std::{env, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use pocketbook_rs::{
    AppState, DocumentStore, MemoryStore, RestStore, Telegram, build_router, graceful_shutdown,
    run_daily_reminder,
};

/// The JSON API server for pocketbook_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the remote document store, e.g. https://example-app.firebaseio.com/.
    ///
    /// The STORE_AUTH_TOKEN environment variable, when set, is sent with
    /// every request.
    #[arg(long, required_unless_present = "in_memory", conflicts_with = "in_memory")]
    store_url: Option<Url>,

    /// Keep all data in process memory instead of a remote store.
    ///
    /// Data does not survive a restart; meant for local use and demos.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Telegram chat to send the daily logging reminder to.
    ///
    /// Requires the TELEGRAM_BOT_TOKEN environment variable. Without this
    /// flag no reminders are sent.
    #[arg(long)]
    reminder_chat_id: Option<i64>,

    /// Hour of the day (UTC) to send the daily reminder at.
    #[arg(long, default_value_t = 19, value_parser = clap::value_parser!(u8).range(0..24))]
    reminder_hour: u8,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let store: Arc<dyn DocumentStore> = if args.in_memory {
        tracing::warn!("Using the in-memory store; data will not survive a restart.");
        Arc::new(MemoryStore::new())
    } else {
        let base = args
            .store_url
            .expect("clap enforces --store-url unless --in-memory is set");
        let auth = env::var("STORE_AUTH_TOKEN").ok();
        Arc::new(RestStore::new(base, auth))
    };

    if let Some(chat_id) = args.reminder_chat_id {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .expect("The environment variable 'TELEGRAM_BOT_TOKEN' must be set to send reminders");
        tokio::spawn(run_daily_reminder(
            Telegram::new(token),
            chat_id,
            args.reminder_hour,
        ));
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let router = add_tracing_layer(build_router(AppState::new(store)));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
