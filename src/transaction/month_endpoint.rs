//! Endpoint for fetching a single month partition of transactions.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState, Error,
    auth::Identity,
    month_key::MonthKey,
    transaction::{TransactionsById, list_endpoint::month_through_cache},
};

/// A route handler for fetching one month's transactions.
///
/// Responds with the partition's mapping of id to record, or JSON null when
/// the month holds no data.
pub async fn month_transactions_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(month): Path<MonthKey>,
) -> Result<Json<Option<TransactionsById>>, Error> {
    let records = month_through_cache(&state, &user, month).await?;

    Ok(Json((!records.is_empty()).then_some(records)))
}
