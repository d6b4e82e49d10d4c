//! The transaction feature: the model, its database functions, and the REST
//! endpoints for recording and reading a tenant's ledger.

pub mod core;
pub mod store;

mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod summary_endpoint;
mod update_endpoint;

pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::{TransactionListResponse, list_transactions_endpoint};
pub use summary_endpoint::{SummaryResponse, summary_endpoint};
pub use update_endpoint::update_transaction_endpoint;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::core::{Category, Transaction, TransactionId, TransactionType};

/// A transaction as returned to clients.
///
/// The owner is implied by the bearer token and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionResponse {
    /// The unique id of the transaction.
    pub id: TransactionId,
    /// A free-text label.
    pub description: String,
    /// The monetary value.
    pub amount: Decimal,
    /// When the transaction occurred.
    pub date: DateTime<Utc>,
    /// Whether this was income or an expense.
    #[serde(rename = "Type")]
    pub kind: TransactionType,
    /// The spending category.
    pub category: Category,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            description: transaction.description,
            amount: transaction.amount,
            date: transaction.date,
            kind: transaction.kind,
            category: transaction.category,
        }
    }
}
