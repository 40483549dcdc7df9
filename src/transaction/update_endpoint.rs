//! Endpoint for editing an existing transaction.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Identity,
    month_key::MonthKey,
    transaction::{TransactionRecord, Updated},
};

/// Query parameters for the update endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    /// The partition the client last saw the record in. Saves the store a
    /// partition scan when the edit changed the date.
    pub month: Option<MonthKey>,
}

/// A route handler for overwriting a transaction.
///
/// When the edit changed the record's date, the record is re-homed to the new
/// month's partition and the stale copy is removed. Both partitions are
/// dropped from the cache.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(transaction_id): Path<String>,
    Query(params): Query<UpdateParams>,
    Json(record): Json<TransactionRecord>,
) -> Result<Json<Updated>, Error> {
    let updated = state
        .transactions
        .update(&user, &transaction_id, &record, params.month)
        .await?;

    state.cache.invalidate(&user, updated.month);

    if let Some(old) = updated.moved_from {
        state.cache.invalidate(&user, old);
    }

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue};
    use serde_json::json;

    use crate::{
        USER_ID_HEADER, endpoints,
        month_key::MonthKey,
        transaction::test_utils::{TEST_USER, rfc3339_in, test_server},
    };

    fn endpoint(id: &str) -> String {
        endpoints::TRANSACTIONS_API.to_owned() + "/" + id
    }

    #[tokio::test]
    async fn update_moves_the_record_between_partitions() {
        let server = test_server();
        let identity = (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_static(TEST_USER),
        );
        let old_month = MonthKey::current().prev();
        let new_month = MonthKey::current();

        let created: serde_json::Value = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(identity.0.clone(), identity.1.clone())
            .json(&json!({
                "date": rfc3339_in(old_month),
                "type": "expense",
                "category": "Rent",
                "amount": 1200.0,
            }))
            .await
            .json();
        let id = created["id"].as_str().unwrap();

        let response = server
            .put(&endpoint(id))
            .add_header(identity.0.clone(), identity.1.clone())
            .json(&json!({
                "date": rfc3339_in(new_month),
                "type": "expense",
                "category": "Rent",
                "amount": 1250.0,
            }))
            .await;

        response.assert_status_ok();

        let updated: serde_json::Value = response.json();

        assert_eq!(updated["month"], new_month.to_string());
        assert_eq!(updated["moved_from"], old_month.to_string());

        // The old partition no longer holds the record.
        let old = server
            .get(&format!("/api/transactions/months/{old_month}"))
            .add_header(identity.0.clone(), identity.1.clone())
            .await
            .json::<Option<serde_json::Value>>();

        assert_eq!(old, None);
    }

    #[tokio::test]
    async fn update_in_place_reports_no_move() {
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
                "type": "expense",
                "category": "Groceries",
                "amount": 42.5,
            }))
            .await
            .json();
        let id = created["id"].as_str().unwrap();

        let response = server
            .put(&format!("{}?month=04_2025", endpoint(id)))
            .add_header(identity.0.clone(), identity.1.clone())
            .json(&json!({
                "date": "2025-04-16T10:00:00Z",
                "type": "expense",
                "category": "Groceries",
                "amount": 45.0,
                "description": "Forgot the milk",
            }))
            .await;

        response.assert_status_ok();

        let updated: serde_json::Value = response.json();

        assert_eq!(updated["month"], "04_2025");
        assert!(updated.get("moved_from").is_none());
    }
}
