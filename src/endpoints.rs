//! The API endpoint URIs.

/// The root route, which answers with a greeting so the service is probeable.
pub const ROOT: &str = "/";
/// The route to create a user.
pub const USER: &str = "/users/{username}";
/// The route to create and list a user's transactions.
pub const TRANSACTIONS: &str = "/users/{username}/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/users/{username}/transactions/{transaction_id}";
/// The route to list a user's transactions with a matching category.
pub const TRANSACTIONS_BY_CATEGORY: &str = "/users/{username}/transactions/category/{category}";
/// The route to list a user's debit (Despesa) transactions.
pub const DEBITS: &str = "/users/{username}/transactions/debits";
/// The route to list a user's credit (Receita) transactions.
pub const CREDITS: &str = "/users/{username}/transactions/credits";
/// The route to list a user's transactions within a calendar month.
pub const TRANSACTIONS_BY_MONTH: &str = "/users/{username}/transactions/month/{year}/{month}";

// These tests are here so that we know the route definitions will not panic
// when the router is built.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::USER);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_BY_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::DEBITS);
        assert_endpoint_is_valid_uri(endpoints::CREDITS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_BY_MONTH);
    }
}
