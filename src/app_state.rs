//! Implements the structs that hold the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{Error, auth::TokenVerifier, db::initialize, pagination::PaginationConfig};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The verifier for inbound bearer tokens.
    pub token_verifier: Arc<TokenVerifier>,
    /// The config that controls paging of transaction listings.
    pub pagination_config: PaginationConfig,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        token_verifier: TokenVerifier,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            token_verifier: Arc::new(token_verifier),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls paging of transaction listings.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The state needed to authenticate a request.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The verifier for inbound bearer tokens.
    pub token_verifier: Arc<TokenVerifier>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_verifier: state.token_verifier.clone(),
        }
    }
}
