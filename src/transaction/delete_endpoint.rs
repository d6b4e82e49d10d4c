//! The endpoint for deleting a transaction.

use axum::{extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::TransactionState,
    auth::AuthenticatedUser,
    extract::ApiPath,
    transaction::{core::TransactionId, store::delete_transaction},
};

/// A handler that deletes one of the authenticated tenant's transactions.
///
/// Responds with 204 on success and 404 when the transaction does not exist
/// or belongs to another tenant.
///
/// # Errors
/// Returns [Error::Validation] if the path is malformed, [Error::NotFound]
/// if there is nothing to delete, or
/// [Error::DatabaseLockError]/[Error::SqlError] if the delete fails.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    AuthenticatedUser { owner_id }: AuthenticatedUser,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(&connection, transaction_id, owner_id)?;

    Ok(StatusCode::NO_CONTENT)
}
