//! The API endpoint URIs.

/// Liveness probe, the one route that does not require identity.
pub const HEALTH: &str = "/api/health";

/// The route to create and list transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";

/// The route to update or delete a single transaction.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";

/// The route to fetch a single month partition of transactions.
pub const TRANSACTIONS_MONTH_API: &str = "/api/transactions/months/{month}";

/// The route to create and list intake entries.
pub const INTAKE_API: &str = "/api/intake";

/// The route to delete a single intake entry.
pub const INTAKE_ENTRY_API: &str = "/api/intake/{entry_id}";

/// The route to fetch a single month partition of intake entries.
pub const INTAKE_MONTH_API: &str = "/api/intake/months/{month}";

// These tests are here so that we know the routes will parse as URIs when
// the router is built.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_MONTH_API);
        assert_endpoint_is_valid_uri(endpoints::INTAKE_API);
        assert_endpoint_is_valid_uri(endpoints::INTAKE_ENTRY_API);
        assert_endpoint_is_valid_uri(endpoints::INTAKE_MONTH_API);
    }
}
