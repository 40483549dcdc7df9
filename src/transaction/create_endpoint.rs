//! Endpoint for recording a new transaction.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState, Error,
    auth::Identity,
    transaction::{Created, TransactionRecord},
};

/// A route handler for creating a new transaction.
///
/// Responds with the store-generated id and the month partition the record
/// was written to, and drops that month from the cache so the next read
/// sees the new record.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(record): Json<TransactionRecord>,
) -> Result<(StatusCode, Json<Created>), Error> {
    let created = state.transactions.create(&user, &record).await?;

    state.cache.invalidate(&user, created.month);

    Ok((StatusCode::CREATED, Json(created)))
}
