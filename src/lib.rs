//! Pocketbook is a web service for tracking your personal finances and daily
//! food intake.
//!
//! All user data lives in a hosted document store addressed by
//! slash-separated paths. Records are sharded into one collection per
//! calendar month so that a single read never pulls more than a month's worth
//! of data; see [MonthKey] for the partitioning scheme and
//! [TransactionStore] for the partition-aware storage operations.
//!
//! This library provides a JSON API over those operations.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod app_state;
mod auth;
mod cache;
mod endpoints;
mod intake;
mod month_key;
mod notify;
mod reminder;
mod routing;
mod store;
mod transaction;

pub use app_state::AppState;
pub use auth::{Identity, USER_ID_HEADER, UserId};
pub use cache::MonthCache;
pub use intake::{IntakeById, IntakeRecord, IntakeStore, Meal};
pub use month_key::{MAX_YEAR, MIN_YEAR, MonthKey, all_data_window, keys_in_range};
pub use notify::Telegram;
pub use reminder::run_daily_reminder;
pub use routing::build_router;
pub use store::{DocumentStore, MemoryStore, RestStore, StoreError};
pub use transaction::{
    Created, DELETE_SCAN_MONTHS, TransactionKind, TransactionRecord, TransactionStore,
    TransactionsById, Updated,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A string could not be parsed into a valid calendar date, or a date
    /// fell outside the supported year range.
    ///
    /// Carries the offending text so callers can show it to the user.
    #[error("could not read \"{0}\" as a date")]
    InvalidDate(String),

    /// A month key did not decompose into a valid month and year.
    ///
    /// Keys must consist of exactly two numeric components with the month in
    /// [1, 12] and the year in [[MIN_YEAR], [MAX_YEAR]].
    #[error("\"{0}\" is not a valid month key")]
    InvalidKey(String),

    /// The start of a date range was after its end.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange {
        /// The start of the rejected range.
        start: Date,
        /// The end of the rejected range.
        end: Date,
    },

    /// A monetary amount was negative or not a finite number.
    ///
    /// Amounts are always non-negative; the transaction type records whether
    /// money came in or went out.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// The request did not carry an authenticated user id.
    ///
    /// Every storage path is namespaced under a user id, so no operation can
    /// proceed without one.
    #[error("no authenticated user")]
    Unauthenticated,

    /// A record could not be serialized as JSON.
    #[error("could not serialize record as JSON: {0}")]
    Serialization(String),

    /// A write to the remote store failed.
    #[error("remote write failed: {0}")]
    Write(#[source] StoreError),

    /// A read from the remote store failed.
    #[error("remote fetch failed: {0}")]
    Fetch(#[source] StoreError),

    /// A delete against the remote store failed.
    #[error("remote delete failed: {0}")]
    Delete(#[source] StoreError),

    /// A message could not be delivered to the notification service.
    #[error("could not deliver notification: {0}")]
    Notify(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidDate(_)
            | Error::InvalidKey(_)
            | Error::InvalidRange { .. }
            | Error::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Write(_) | Error::Fetch(_) | Error::Delete(_) => StatusCode::BAD_GATEWAY,
            Error::Serialization(_) | Error::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {self}");
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
