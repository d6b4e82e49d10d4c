//! Database functions for storing and retrieving transactions.
//!
//! Every function takes the owner explicitly and scopes its SQL to that
//! owner, so a row belonging to another tenant behaves exactly like a row
//! that does not exist.

use std::str::FromStr;

use rusqlite::{Connection, params, params_from_iter, types::Value};
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::OwnerId,
    transaction::core::{
        MonthFilter, Transaction, TransactionId, TransactionType, map_row_to_transaction,
    },
};

/// The parameters for a paginated, optionally month-filtered listing.
#[derive(Debug, Clone, Copy)]
pub struct TransactionQuery {
    /// The tenant whose transactions to read.
    pub owner_id: OwnerId,
    /// An optional calendar month restriction.
    pub filter: Option<MonthFilter>,
    /// The number of rows to skip.
    pub offset: u64,
    /// The maximum number of rows to return.
    pub limit: u64,
}

/// Append the month/year predicate for `filter` to a WHERE clause, pushing
/// its bind values onto `params`.
fn month_clause(filter: Option<MonthFilter>, params: &mut Vec<Value>) -> String {
    let Some(filter) = filter else {
        return String::new();
    };

    let month_position = params.len() + 1;
    let year_position = params.len() + 2;
    params.push(Value::Integer(filter.month as i64));
    params.push(Value::Integer(filter.year as i64));

    format!(
        " AND CAST(strftime('%m', date) AS INTEGER) = ?{month_position} \
         AND CAST(strftime('%Y', date) AS INTEGER) = ?{year_position}"
    )
}

/// Count the transactions matching `owner_id` and `filter`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_transactions(
    connection: &Connection,
    owner_id: OwnerId,
    filter: Option<MonthFilter>,
) -> Result<u64, Error> {
    let mut params = vec![Value::Text(owner_id.to_string())];
    let where_clause = format!("WHERE owner_id = ?1{}", month_clause(filter, &mut params));

    let count: i64 = connection
        .prepare(&format!(
            "SELECT COUNT(*) FROM \"transaction\" {where_clause}"
        ))?
        .query_row(params_from_iter(params), |row| row.get(0))?;

    Ok(count as u64)
}

/// Retrieve one page of transactions.
///
/// Rows are ordered by date, most recent first. Rows sharing a date keep
/// their insertion order so repeated requests see a stable sequence.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn query_transactions(
    connection: &Connection,
    query: TransactionQuery,
) -> Result<Vec<Transaction>, Error> {
    let mut params = vec![Value::Text(query.owner_id.to_string())];
    let where_clause = format!(
        "WHERE owner_id = ?1{}",
        month_clause(query.filter, &mut params)
    );

    let transactions = connection
        .prepare(&format!(
            "SELECT id, owner_id, description, amount, date, kind, category
             FROM \"transaction\"
             {where_clause}
             ORDER BY date DESC, rowid ASC
             LIMIT {} OFFSET {}",
            query.limit, query.offset
        ))?
        .query_map(params_from_iter(params), map_row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Retrieve the transaction with `id`, if `owner_id` owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such transaction for this owner.
pub fn get_transaction(
    connection: &Connection,
    id: TransactionId,
    owner_id: OwnerId,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, owner_id, description, amount, date, kind, category
             FROM \"transaction\"
             WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row(
            params![id.to_string(), owner_id.to_string()],
            map_row_to_transaction,
        )?;

    Ok(transaction)
}

/// Store `transaction` in the database.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails.
pub fn insert_transaction(
    connection: &Connection,
    transaction: Transaction,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (id, owner_id, description, amount, date, kind, category)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            transaction.id.to_string(),
            transaction.owner_id.to_string(),
            transaction.description,
            transaction.amount.to_string(),
            transaction.date,
            transaction.kind,
            transaction.category,
        ],
    )?;

    Ok(transaction)
}

/// Overwrite the client-controlled fields of the transaction with `id`.
///
/// The id and the owner never change.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such transaction for this owner.
pub fn update_transaction(
    connection: &Connection,
    transaction: &Transaction,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET description = ?1, amount = ?2, date = ?3, kind = ?4, category = ?5
         WHERE id = ?6 AND owner_id = ?7",
        params![
            transaction.description,
            transaction.amount.to_string(),
            transaction.date,
            transaction.kind,
            transaction.category,
            transaction.id.to_string(),
            transaction.owner_id.to_string(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the transaction with `id`, if `owner_id` owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such transaction for this owner.
pub fn delete_transaction(
    connection: &Connection,
    id: TransactionId,
    owner_id: OwnerId,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        params![id.to_string(), owner_id.to_string()],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Sum the amounts of the owner's transactions of the given kind.
///
/// Amounts are stored as text and summed here rather than in SQL, where SUM
/// would coerce them to floating point.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn sum_transactions(
    connection: &Connection,
    owner_id: OwnerId,
    kind: TransactionType,
    filter: Option<MonthFilter>,
) -> Result<Decimal, Error> {
    let mut params = vec![
        Value::Text(owner_id.to_string()),
        Value::Text(kind.as_str().to_owned()),
    ];
    let where_clause = format!(
        "WHERE owner_id = ?1 AND kind = ?2{}",
        month_clause(filter, &mut params)
    );

    let amounts = connection
        .prepare(&format!(
            "SELECT amount FROM \"transaction\" {where_clause}"
        ))?
        .query_map(params_from_iter(params), |row| {
            let amount: String = row.get(0)?;

            Decimal::from_str(&amount).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(amounts.into_iter().fold(Decimal::ZERO, |total, amount| {
        total + amount
    }))
}
