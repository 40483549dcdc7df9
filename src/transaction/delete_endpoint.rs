//! Endpoint for deleting a transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{AppState, Error, auth::Identity, month_key::MonthKey};

/// Query parameters for the delete endpoint.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// The partition holding the record, when the client knows it. Without
    /// it the store scans the trailing months for the record.
    pub month: Option<MonthKey>,
}

/// A route handler for deleting a transaction.
///
/// Deleting a record that no longer exists is not an error; the client may
/// be retrying, or another session may have deleted it first.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(transaction_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, Error> {
    let removed_from = state
        .transactions
        .delete(&user, &transaction_id, params.month)
        .await?;

    if let Some(month) = removed_from {
        state.cache.invalidate(&user, month);
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use serde_json::json;

    use crate::{
        USER_ID_HEADER, endpoints,
        transaction::test_utils::{TEST_USER, test_server},
    };

    #[tokio::test]
    async fn delete_with_known_month_empties_the_partition() {
        let server = test_server();
        let identity = (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_static(TEST_USER),
        );

        let created: serde_json::Value = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(identity.0.clone(), identity.1.clone())
            .json(&json!({
                "date": "2025-04-15T10:00:00Z",
                "type": "income",
                "category": "Salary",
                "amount": 1200.0,
            }))
            .await
            .json();
        let id = created["id"].as_str().unwrap();

        let response = server
            .delete(&format!("/api/transactions/{id}?month=04_2025"))
            .add_header(identity.0.clone(), identity.1.clone())
            .await;

        response.assert_status(StatusCode::NO_CONTENT);

        let month = server
            .get("/api/transactions/months/04_2025")
            .add_header(identity.0.clone(), identity.1.clone())
            .await
            .json::<Option<serde_json::Value>>();

        assert_eq!(month, None);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_succeeds_without_effect() {
        let server = test_server();

        let response = server
            .delete("/api/transactions/-no-such-id")
            .add_header(
                HeaderName::from_static(USER_ID_HEADER),
                HeaderValue::from_static(TEST_USER),
            )
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
    }
}
