//! The endpoint for recording a new transaction.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    Error,
    app_state::TransactionState,
    auth::AuthenticatedUser,
    endpoints::{self, format_endpoint},
    extract::ApiJson,
    transaction::{
        TransactionResponse,
        core::{Transaction, TransactionData},
        store::insert_transaction,
    },
};

/// A handler that records a new transaction for the authenticated tenant.
///
/// The owner is always the token's subject; the body cannot assign the
/// transaction to anyone else. Responds with 201, a Location header pointing
/// at the new resource, and the stored transaction.
///
/// # Errors
/// Returns [Error::Validation] if the body is malformed, or
/// [Error::DatabaseLockError]/[Error::SqlError] if the insert fails.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    AuthenticatedUser { owner_id }: AuthenticatedUser,
    ApiJson(data): ApiJson<TransactionData>,
) -> Result<impl IntoResponse, Error> {
    let transaction = Transaction::new(owner_id, data);

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = insert_transaction(&connection, transaction)?;
    let location = format_endpoint(endpoints::TRANSACTION, transaction.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TransactionResponse::from(transaction)),
    ))
}
