//! Assembles the application's routes into a router.

use axum::{
    Router, middleware,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState, Error, endpoints,
    problem::attach_problem_instance,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        summary_endpoint, update_transaction_endpoint,
    },
};

/// Create the router for the REST API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::SUMMARY, get(summary_endpoint))
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .fallback(fallback)
        .layer(middleware::from_fn(attach_problem_instance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback() -> Error {
    Error::NotFound
}
