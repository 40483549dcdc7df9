//! Helpers shared by the transaction and intake tests.

use std::sync::Arc;

use axum_test::TestServer;
use time::{Date, Month, OffsetDateTime, Time};

use crate::{AppState, MemoryStore, build_router, month_key::MonthKey};

/// The user id the endpoint tests act as.
pub(crate) const TEST_USER: &str = "user_1234";

/// A test server backed by an empty in-memory store.
pub(crate) fn test_server() -> TestServer {
    let state = AppState::new(Arc::new(MemoryStore::new()));

    TestServer::new(build_router(state))
}

/// [datetime_in] as an RFC 3339 string, for JSON request bodies.
pub(crate) fn rfc3339_in(month: MonthKey) -> String {
    datetime_in(month)
        .format(&time::format_description::well_known::Rfc3339)
        .expect("UTC datetimes format as RFC 3339")
}

/// Noon (UTC) on the 15th of the keyed month, for fixtures that must land in
/// a particular partition.
pub(crate) fn datetime_in(month: MonthKey) -> OffsetDateTime {
    let date = Date::from_calendar_date(
        month.year(),
        Month::try_from(month.month()).expect("month key months are valid"),
        15,
    )
    .expect("the 15th exists in every month");

    OffsetDateTime::new_utc(date, Time::from_hms(12, 0, 0).expect("noon is a valid time"))
}
