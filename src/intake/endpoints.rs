//! JSON endpoints for the food-intake log.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    auth::Identity,
    intake::{IntakeById, IntakeRecord},
    month_key::{self, MonthKey},
};

/// The id and partition assigned to a new intake entry.
#[derive(Debug, Serialize)]
pub struct IntakeCreated {
    /// The store-generated id of the new entry.
    pub id: String,
    /// The partition the entry was written to.
    pub month: MonthKey,
}

/// A route handler for logging a food item.
pub async fn create_intake_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(record): Json<IntakeRecord>,
) -> Result<(StatusCode, Json<IntakeCreated>), Error> {
    let (id, month) = state.intake.create(&user, &record).await?;

    Ok((StatusCode::CREATED, Json(IntakeCreated { id, month })))
}

/// Query parameters for the intake list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Start of the range, inclusive, as `YYYY-MM-DD`.
    pub start: Option<Date>,
    /// End of the range, inclusive, as `YYYY-MM-DD`.
    pub end: Option<Date>,
}

/// A route handler for listing intake entries over a date range.
///
/// Responds with a mapping of entry id to record, or JSON null when the
/// range holds no data.
pub async fn list_intake_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Query(params): Query<ListParams>,
) -> Result<Json<Option<IntakeById>>, Error> {
    let (window_start, window_end) = month_key::all_data_window();
    let start = params.start.unwrap_or(window_start);
    let end = params.end.unwrap_or(window_end);

    let entries = state.intake.fetch_range(&user, start, end).await?;

    Ok(Json(entries))
}

/// A route handler for fetching one month's intake entries.
pub async fn month_intake_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(month): Path<MonthKey>,
) -> Result<Json<Option<IntakeById>>, Error> {
    let entries = state.intake.fetch_month(&user, month).await?;

    Ok(Json(entries))
}

/// Query parameters for the intake delete endpoint.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// The partition holding the entry.
    pub month: MonthKey,
}

/// A route handler for deleting an intake entry.
pub async fn delete_intake_endpoint(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(entry_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, Error> {
    state.intake.delete(&user, &entry_id, params.month).await?;

    Ok(StatusCode::NO_CONTENT)
}
