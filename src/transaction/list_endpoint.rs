//! The endpoint for listing a tenant's transactions as a paginated ledger.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::TransactionState,
    auth::AuthenticatedUser,
    extract::ApiQuery,
    pagination::{PageRequest, total_pages},
    transaction::{
        TransactionResponse,
        core::MonthFilter,
        store::{TransactionQuery, count_transactions, query_transactions},
    },
};

/// The query parameters accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListParams {
    /// The 1-based page number.
    page: Option<i64>,
    /// The number of items per page.
    #[serde(rename = "pageSize")]
    page_size: Option<i64>,
    /// Restrict the listing to this calendar month. Requires `year`.
    month: Option<u32>,
    /// Restrict the listing to this calendar year. Requires `month`.
    year: Option<i32>,
}

/// One page of a tenant's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionListResponse {
    /// The number of transactions matching the query across all pages.
    pub total_items: u64,
    /// The 1-based page number of this page.
    pub page: u64,
    /// The page size used for this listing.
    pub page_size: u64,
    /// The number of pages needed to show every matching transaction.
    pub total_pages: u64,
    /// The transactions on this page, most recent first.
    pub items: Vec<TransactionResponse>,
}

/// A handler for listing the transactions of the authenticated tenant.
///
/// The listing is ordered by date, most recent first, and paged according to
/// the `page` and `pageSize` query parameters. A `month`/`year` pair narrows
/// the listing to one calendar month; supplying only one of the two leaves
/// the listing unfiltered.
///
/// # Errors
/// Returns [Error::Validation] if the paging or month parameters are invalid,
/// or [Error::DatabaseLockError]/[Error::SqlError] if the query fails.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    AuthenticatedUser { owner_id }: AuthenticatedUser,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<TransactionListResponse>, Error> {
    let filter = MonthFilter::from_params(params.month, params.year)?;
    let page = PageRequest::new(params.page, params.page_size, &state.pagination_config)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let total_items = count_transactions(&connection, owner_id, filter)?;
    let transactions = query_transactions(
        &connection,
        TransactionQuery {
            owner_id,
            filter,
            offset: page.offset(),
            limit: page.page_size,
        },
    )?;

    Ok(Json(TransactionListResponse {
        total_items,
        page: page.page,
        page_size: page.page_size,
        total_pages: total_pages(total_items, page.page_size),
        items: transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::{
        AppState,
        auth::OwnerId,
        build_router, endpoints,
        test_utils::{mint_token, test_app_state},
        transaction::{
            TransactionListResponse,
            core::{Category, Transaction, TransactionData, TransactionType},
            store::insert_transaction,
        },
    };

    fn seed_transactions(state: &AppState, owner_id: OwnerId, count: u32) {
        let connection = state.db_connection.lock().unwrap();

        for day in 1..=count {
            let transaction = Transaction::new(
                owner_id,
                TransactionData {
                    description: format!("Day {day}"),
                    amount: Decimal::ONE,
                    date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
                    kind: TransactionType::Expense,
                    category: Category::Other,
                },
            );
            insert_transaction(&connection, transaction).unwrap();
        }
    }

    #[tokio::test]
    async fn lists_the_first_page_with_defaults() {
        let state = test_app_state();
        let owner_id = Uuid::new_v4();
        seed_transactions(&state, owner_id, 15);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(mint_token(owner_id))
            .await;

        response.assert_status_ok();
        let page: TransactionListResponse = response.json();
        assert_eq!(page.total_items, 15);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].description, "Day 15");
    }

    #[tokio::test]
    async fn second_page_holds_the_remainder() {
        let state = test_app_state();
        let owner_id = Uuid::new_v4();
        seed_transactions(&state, owner_id, 15);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", 2)
            .add_query_param("pageSize", 10)
            .authorization_bearer(mint_token(owner_id))
            .await;

        response.assert_status_ok();
        let page: TransactionListResponse = response.json();
        assert_eq!(page.total_items, 15);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].description, "Day 5");
    }

    #[tokio::test]
    async fn page_beyond_the_last_is_empty() {
        let state = test_app_state();
        let owner_id = Uuid::new_v4();
        seed_transactions(&state, owner_id, 5);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", 3)
            .authorization_bearer(mint_token(owner_id))
            .await;

        response.assert_status_ok();
        let page: TransactionListResponse = response.json();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.items.len(), 0);
    }

    #[tokio::test]
    async fn rejects_a_zero_page() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", 0)
            .authorization_bearer(mint_token(Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_an_oversized_page_size() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("pageSize", 101)
            .authorization_bearer(mint_token(Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn month_without_year_leaves_the_listing_unfiltered() {
        let state = test_app_state();
        let owner_id = Uuid::new_v4();
        seed_transactions(&state, owner_id, 3);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", 2)
            .authorization_bearer(mint_token(owner_id))
            .await;

        response.assert_status_ok();
        let page: TransactionListResponse = response.json();
        assert_eq!(page.total_items, 3);
    }

    #[tokio::test]
    async fn month_and_year_narrow_the_listing() {
        let state = test_app_state();
        let owner_id = Uuid::new_v4();
        seed_transactions(&state, owner_id, 3);
        {
            let connection = state.db_connection.lock().unwrap();
            insert_transaction(
                &connection,
                Transaction::new(
                    owner_id,
                    TransactionData {
                        description: "February".to_owned(),
                        amount: Decimal::ONE,
                        date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                        kind: TransactionType::Expense,
                        category: Category::Other,
                    },
                ),
            )
            .unwrap();
        }
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", 2)
            .add_query_param("year", 2024)
            .authorization_bearer(mint_token(owner_id))
            .await;

        response.assert_status_ok();
        let page: TransactionListResponse = response.json();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].description, "February");
    }

    #[tokio::test]
    async fn other_tenants_transactions_are_not_listed() {
        let state = test_app_state();
        let owner_id = Uuid::new_v4();
        seed_transactions(&state, owner_id, 3);
        let server = TestServer::new(build_router(state));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(mint_token(Uuid::new_v4()))
            .await;

        response.assert_status_ok();
        let page: TransactionListResponse = response.json();
        assert_eq!(page.total_items, 0);
        assert_eq!(page.items.len(), 0);
    }

    #[tokio::test]
    async fn rejects_a_request_without_a_token() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state));

        let response = server.get(endpoints::TRANSACTIONS).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
