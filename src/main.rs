use std::{net::SocketAddr, process::ExitCode};

use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mycash_api::{
    AppState, PaginationConfig, SigningKeySet, TokenVerifier, build_router, graceful_shutdown,
    issuer, jwks_url,
};

/// The REST API server for MyCash.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "mycash.sqlite3")]
    db_path: String,

    /// The socket address to serve the API from.
    #[arg(long, default_value = "127.0.0.1:3000")]
    address: SocketAddr,

    /// The base URL of the identity provider that issues bearer tokens.
    #[arg(long)]
    auth_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    // Without the provider's signing keys no request can be authenticated,
    // so a failed fetch is fatal rather than retried.
    let key_set = match SigningKeySet::fetch(&jwks_url(&args.auth_url)).await {
        Ok(key_set) => key_set,
        Err(error) => {
            tracing::error!("Could not fetch the identity provider's signing keys: {error}");
            return ExitCode::FAILURE;
        }
    };

    let db_connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open the database at {}: {error}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let token_verifier = TokenVerifier::new(key_set, issuer(&args.auth_url));
    let state = match AppState::new(db_connection, token_verifier, PaginationConfig::default()) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the application state: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    tracing::info!("HTTP server listening on {}", args.address);
    if let Err(error) = axum_server::bind(args.address)
        .handle(handle)
        .serve(build_router(state).into_make_service())
        .await
    {
        tracing::error!("The server exited with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
