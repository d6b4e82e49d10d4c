//! MyCash is a small personal-finance bookkeeping API.
//!
//! An authenticated user records income and expense transactions, lists them
//! as a paginated ledger, and views period summaries (total income, total
//! expense, balance). Identity is delegated to an external provider: requests
//! carry bearer tokens that are verified against the provider's published
//! signing keys, fetched once at startup.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod db;
mod endpoints;
mod extract;
mod pagination;
mod problem;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{SigningKeySet, TokenVerifier, issuer, jwks_url};
pub use db::initialize as initialize_db;
pub use pagination::PaginationConfig;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found, or is not owned by the caller.
    ///
    /// The two cases are deliberately indistinguishable so that one tenant
    /// cannot probe for the existence of another tenant's records.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The request carried an invalid parameter or body.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request did not carry a valid identity.
    #[error("missing or invalid credentials")]
    Unauthorized,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, title, detail) = match &self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Resource not found",
                "The requested resource could not be found".to_owned(),
            ),
            Error::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "Invalid request", detail.clone())
            }
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized access",
                "You do not have permission to access this resource".to_owned(),
            ),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "An unexpected error occurred while processing your request.".to_owned(),
                )
            }
        };

        problem::problem_response(status, title, &detail)
    }
}
