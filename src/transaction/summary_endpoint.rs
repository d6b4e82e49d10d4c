//! The endpoint for the income/expense/balance summary.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::TransactionState,
    auth::AuthenticatedUser,
    extract::ApiQuery,
    transaction::{
        core::{MonthFilter, TransactionType},
        store::sum_transactions,
    },
};

/// The query parameters accepted by the summary endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SummaryParams {
    /// Restrict the summary to this calendar month. Requires `year`.
    month: Option<u32>,
    /// Restrict the summary to this calendar year. Requires `month`.
    year: Option<i32>,
}

/// The aggregate of a tenant's ledger over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryResponse {
    /// The sum of all income amounts in the period.
    pub total_income: Decimal,
    /// The sum of all expense amounts in the period.
    pub total_expense: Decimal,
    /// Income minus expense.
    pub balance: Decimal,
}

/// A handler that sums the authenticated tenant's income and expenses.
///
/// A `month`/`year` pair narrows the summary to one calendar month; without
/// the pair, every transaction the tenant owns is included. A period with no
/// transactions yields zeros rather than an error.
///
/// # Errors
/// Returns [Error::Validation] if the month parameter is invalid, or
/// [Error::DatabaseLockError]/[Error::SqlError] if the query fails.
pub async fn summary_endpoint(
    State(state): State<TransactionState>,
    AuthenticatedUser { owner_id }: AuthenticatedUser,
    ApiQuery(params): ApiQuery<SummaryParams>,
) -> Result<Json<SummaryResponse>, Error> {
    let filter = MonthFilter::from_params(params.month, params.year)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let total_income = sum_transactions(&connection, owner_id, TransactionType::Income, filter)?;
    let total_expense = sum_transactions(&connection, owner_id, TransactionType::Expense, filter)?;

    Ok(Json(SummaryResponse {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }))
}
