/*! This module defines the database initialization for the application. */

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::transaction::core::create_transaction_table;

/// Add the application's tables to the database if they do not exist.
///
/// # Errors
/// Returns an error if the schema cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
