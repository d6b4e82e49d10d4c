//! The endpoint for replacing the fields of an existing transaction.

use axum::{extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::TransactionState,
    auth::AuthenticatedUser,
    extract::{ApiJson, ApiPath},
    transaction::{
        core::{Transaction, TransactionData, TransactionId},
        store::update_transaction,
    },
};

/// A handler that replaces the client-controlled fields of a transaction.
///
/// The id and the owner never change. Responds with 204 on success and 404
/// when the transaction does not exist or belongs to another tenant, so the
/// two cases are indistinguishable to the caller.
///
/// # Errors
/// Returns [Error::Validation] if the path or body is malformed,
/// [Error::NotFound] if there is nothing to update, or
/// [Error::DatabaseLockError]/[Error::SqlError] if the update fails.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    AuthenticatedUser { owner_id }: AuthenticatedUser,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(data): ApiJson<TransactionData>,
) -> Result<StatusCode, Error> {
    let transaction = Transaction {
        id: transaction_id,
        owner_id,
        description: data.description,
        amount: data.amount,
        date: data.date,
        kind: data.kind,
        category: data.category,
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(&connection, &transaction)?;

    Ok(StatusCode::NO_CONTENT)
}
