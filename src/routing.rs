//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState, endpoints,
    intake::{
        create_intake_endpoint, delete_intake_endpoint, list_intake_endpoint,
        month_intake_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        month_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION_API,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_MONTH_API,
            get(month_transactions_endpoint),
        )
        .route(
            endpoints::INTAKE_API,
            post(create_intake_endpoint).get(list_intake_endpoint),
        )
        .route(endpoints::INTAKE_MONTH_API, get(month_intake_endpoint))
        .route(endpoints::INTAKE_ENTRY_API, delete(delete_intake_endpoint))
        .with_state(state)
}

async fn get_health() -> &'static str {
    "ok"
}
