//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}',
//! use [format_endpoint].

use uuid::Uuid;

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the income/expense/balance summary.
pub const SUMMARY: &str = "/api/transactions/summary";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the path parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. This
/// function assumes that an endpoint path only contains ASCII characters and
/// a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: Uuid) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };
    let Some(param_end) = endpoint_path[param_start..].find('}') else {
        return endpoint_path.to_owned();
    };

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_start + param_end + 1..]
    )
}
