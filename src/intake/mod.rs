//! Daily food-intake tracking.
//!
//! Intake entries share the transaction layout: one collection per calendar
//! month under `users/{userId}/intake/{MM_YYYY}/{entryId}`.

mod endpoints;
mod store;

pub use endpoints::{
    create_intake_endpoint, delete_intake_endpoint, list_intake_endpoint, month_intake_endpoint,
};
pub use store::{IntakeById, IntakeRecord, IntakeStore, Meal};
