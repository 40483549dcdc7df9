//! Endpoint for listing transactions over a date range.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::{Identity, UserId},
    month_key::{self, MonthKey},
    transaction::TransactionsById,
};

/// Query parameters for the list endpoint.
///
/// A missing bound defaults to the corresponding edge of the all-data
/// window, so a request with no parameters lists everything the service
/// considers reachable.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Start of the range, inclusive, as `YYYY-MM-DD`.
    pub start: Option<Date>,
    /// End of the range, inclusive, as `YYYY-MM-DD`.
    pub end: Option<Date>,
}

/// A route handler for listing transactions.
///
/// Responds with a mapping of transaction id to record merged across every
/// month in the range, or JSON null when the whole range holds no data.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Query(params): Query<ListParams>,
) -> Result<Json<Option<TransactionsById>>, Error> {
    let (window_start, window_end) = month_key::all_data_window();
    let start = params.start.unwrap_or(window_start);
    let end = params.end.unwrap_or(window_end);

    let mut merged = TransactionsById::new();

    for month in month_key::keys_in_range(start, end)? {
        merged.extend(month_through_cache(&state, &user, month).await?);
    }

    Ok(Json((!merged.is_empty()).then_some(merged)))
}

/// The cached copy of a month, fetching and filling the cache on a miss.
///
/// A cached empty month is served as-is; it records that the partition was
/// absent when last fetched, which spares the remote store a read.
pub(crate) async fn month_through_cache(
    state: &AppState,
    user: &UserId,
    month: MonthKey,
) -> Result<TransactionsById, Error> {
    if let Some(records) = state.cache.get(user, month) {
        return Ok(records);
    }

    let fetched = state
        .transactions
        .fetch_month(user, month)
        .await?
        .unwrap_or_default();

    state.cache.put(user, [(month, fetched.clone())]);

    Ok(fetched)
}
