//! The transaction model and its closed enumerations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, auth::OwnerId};

/// The identifier of a transaction.
pub type TransactionId = Uuid;

/// Whether a transaction brought money in or sent money out.
///
/// Determines the sign semantics for the summary aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The fixed string stored in the database for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Income" => Ok(TransactionType::Income),
            "Expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type {other:?}").into(),
            )),
        }
    }
}

/// The closed set of spending categories.
///
/// Clients may omit the category, in which case [Category::Other] is used.
/// Values outside this set are rejected at the boundary and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel, vehicle costs.
    Transport,
    /// Rent, mortgage, utilities.
    Housing,
    /// Medical costs and insurance.
    Health,
    /// Entertainment and hobbies.
    Leisure,
    /// Tuition, courses, books.
    Education,
    /// General purchases.
    Shopping,
    /// Anything that does not fit the other categories.
    #[default]
    Other,
}

impl Category {
    /// The fixed string stored in the database for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Health => "Health",
            Category::Leisure => "Leisure",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Food" => Some(Category::Food),
            "Transport" => Some(Category::Transport),
            "Housing" => Some(Category::Housing),
            "Health" => Some(Category::Health),
            "Leisure" => Some(Category::Leisure),
            "Education" => Some(Category::Education),
            "Shopping" => Some(Category::Shopping),
            "Other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;

        Category::from_name(name)
            .ok_or_else(|| FromSqlError::Other(format!("unknown category {name:?}").into()))
    }
}

/// An income or expense recorded by a tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The unique id of the transaction, assigned at creation.
    pub id: TransactionId,
    /// The tenant that owns the transaction.
    pub owner_id: OwnerId,
    /// A free-text label. May be empty.
    pub description: String,
    /// The monetary value.
    pub amount: Decimal,
    /// When the transaction occurred (not when it was recorded).
    pub date: DateTime<Utc>,
    /// Whether this was income or an expense.
    pub kind: TransactionType,
    /// The spending category.
    pub category: Category,
}

impl Transaction {
    /// Create a new transaction owned by `owner_id` with a fresh id.
    ///
    /// The owner always comes from the authenticated identity; `data` has no
    /// way to carry one.
    pub fn new(owner_id: OwnerId, data: TransactionData) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            description: data.description,
            amount: data.amount,
            date: data.date,
            kind: data.kind,
            category: data.category,
        }
    }
}

/// The client-controlled fields of a transaction, as sent in create and
/// update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionData {
    /// A free-text label. May be empty.
    pub description: String,
    /// The monetary value.
    pub amount: Decimal,
    /// When the transaction occurred.
    pub date: DateTime<Utc>,
    /// Whether this was income or an expense.
    #[serde(rename = "Type")]
    pub kind: TransactionType,
    /// The spending category. Defaults to [Category::Other] when omitted.
    #[serde(default)]
    pub category: Category,
}

/// A calendar month restriction for listing and summary queries.
///
/// Built only when both the month and the year are supplied; a partial
/// filter is never applied silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    /// The calendar month, 1 through 12.
    pub month: u32,
    /// The calendar year.
    pub year: i32,
}

impl MonthFilter {
    /// Build a filter from the optional `month` and `year` query parameters.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the month is outside 1 through 12.
    pub fn from_params(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>, Error> {
        match (month, year) {
            (Some(month), Some(year)) => {
                if !(1..=12).contains(&month) {
                    return Err(Error::Validation(format!(
                        "month must be between 1 and 12, got {month}"
                    )));
                }

                Ok(Some(Self { month, year }))
            }
            _ => Ok(None),
        }
    }
}

/// Create the transaction table and its owner/date index.
pub fn create_transaction_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS transaction_owner_date
         ON \"transaction\" (owner_id, date)",
        (),
    )?;

    Ok(())
}

/// Map a `SELECT id, owner_id, description, amount, date, kind, category`
/// row to a [Transaction].
pub fn map_row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = parse_uuid_column(0, &id)?;
    let owner: String = row.get(1)?;
    let owner_id = parse_uuid_column(1, &owner)?;
    let description = row.get(2)?;
    let amount: String = row.get(3)?;
    let amount = Decimal::from_str(&amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let date = row.get(4)?;
    let kind = row.get(5)?;
    let category = row.get(6)?;

    Ok(Transaction {
        id,
        owner_id,
        description,
        amount,
        date,
        kind,
        category,
    })
}

fn parse_uuid_column(index: usize, value: &str) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(value).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{Category, MonthFilter, TransactionData, TransactionType};

    #[test]
    fn transaction_type_parses_from_json_strings() {
        let data: TransactionData = serde_json::from_str(
            r#"{
                "Description": "Salary",
                "Amount": 5000.00,
                "Date": "2024-01-15T00:00:00Z",
                "Type": "Income"
            }"#,
        )
        .unwrap();

        assert_eq!(data.kind, TransactionType::Income);
        assert_eq!(data.category, Category::Other);
        assert_eq!(data.amount.to_string(), "5000.00");
    }

    #[test]
    fn unknown_transaction_type_is_rejected() {
        let result = serde_json::from_str::<TransactionData>(
            r#"{
                "Description": "Salary",
                "Amount": 5000.00,
                "Date": "2024-01-15T00:00:00Z",
                "Type": "Transfer"
            }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = serde_json::from_str::<TransactionData>(
            r#"{
                "Description": "Rent",
                "Amount": 1200.00,
                "Date": "2024-01-20T00:00:00Z",
                "Type": "Expense",
                "Category": "Gambling"
            }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn month_filter_requires_both_parameters() {
        assert_eq!(MonthFilter::from_params(Some(1), None), Ok(None));
        assert_eq!(MonthFilter::from_params(None, Some(2024)), Ok(None));
        assert_eq!(MonthFilter::from_params(None, None), Ok(None));
        assert_eq!(
            MonthFilter::from_params(Some(1), Some(2024)),
            Ok(Some(MonthFilter {
                month: 1,
                year: 2024
            }))
        );
    }

    #[test]
    fn month_filter_rejects_out_of_range_months() {
        assert!(matches!(
            MonthFilter::from_params(Some(0), Some(2024)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            MonthFilter::from_params(Some(13), Some(2024)),
            Err(Error::Validation(_))
        ));
    }
}
