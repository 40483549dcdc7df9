//! The intake model and its partition-aware storage operations.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserId,
    month_key::{self, MAX_YEAR, MIN_YEAR, MonthKey},
    store::{DocumentStore, StoreError, month_path, record_path},
};

const COLLECTION: &str = "intake";

/// Which meal of the day an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    /// The first meal of the day.
    Breakfast,
    /// The midday meal.
    Lunch,
    /// The evening meal.
    Dinner,
    /// Anything between meals.
    Snack,
}

/// One logged food item, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    /// When the food was eaten.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,

    /// Which meal it belonged to.
    pub meal: Meal,

    /// What was eaten.
    pub name: String,

    /// Estimated calories. Omitted from the stored record when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,

    /// Free-form note. Omitted from the stored record when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A month partition's worth of intake entries, keyed by id.
pub type IntakeById = HashMap<String, IntakeRecord>;

/// Translates intake CRUD and range queries into partition-aware operations
/// against the document store.
///
/// A slimmer sibling of [crate::transaction::TransactionStore]: intake
/// entries are only ever deleted from a known month, so there is no
/// partition scan here.
#[derive(Clone)]
pub struct IntakeStore {
    store: Arc<dyn DocumentStore>,
}

impl IntakeStore {
    /// Create a store backed by `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a new intake entry and return its store-generated id along with
    /// the partition it was written to.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidDate] if the date is outside the supported years,
    /// - [Error::Write] if the remote write fails.
    pub async fn create(
        &self,
        user: &UserId,
        record: &IntakeRecord,
    ) -> Result<(String, MonthKey), Error> {
        let date = record.at.date();

        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(Error::InvalidDate(date.to_string()));
        }

        let month = MonthKey::for_date(date);
        let value = serde_json::to_value(record)
            .map_err(|error| Error::Serialization(error.to_string()))?;
        let path = month_path(user, COLLECTION, month);

        let id = self.store.push(&path, &value).await.map_err(|error| {
            tracing::error!("could not append intake entry under {path}: {error}");
            Error::Write(error)
        })?;

        Ok((id, month))
    }

    /// Remove the intake entry `id` from the `month` partition.
    ///
    /// Removing an entry that no longer exists is not an error.
    ///
    /// # Errors
    /// This function will return an [Error::Delete] if the remote call fails.
    pub async fn delete(&self, user: &UserId, id: &str, month: MonthKey) -> Result<(), Error> {
        let path = record_path(user, COLLECTION, month, id);

        self.store.delete(&path).await.map_err(|error| {
            tracing::error!("could not delete intake entry at {path}: {error}");
            Error::Delete(error)
        })
    }

    /// Read one month's partition, or `None` if the partition does not
    /// exist.
    ///
    /// # Errors
    /// This function will return an [Error::Fetch] if the remote read fails
    /// or the stored collection cannot be decoded.
    pub async fn fetch_month(
        &self,
        user: &UserId,
        month: MonthKey,
    ) -> Result<Option<IntakeById>, Error> {
        let path = month_path(user, COLLECTION, month);

        let value = self.store.get(&path).await.map_err(|error| {
            tracing::error!("could not fetch {path}: {error}");
            Error::Fetch(error)
        })?;

        match value {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|error| {
                tracing::error!("malformed intake collection at {path}: {error}");
                Error::Fetch(StoreError::new(format!("malformed data at {path}: {error}")))
            }),
        }
    }

    /// Read every partition from the month of `start` through the month of
    /// `end` and merge the entries into one mapping by id.
    ///
    /// Returns `None` when every partition in the range was empty or absent.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidRange] if `start` is after `end`,
    /// - [Error::Fetch] if any partition read fails.
    pub async fn fetch_range(
        &self,
        user: &UserId,
        start: Date,
        end: Date,
    ) -> Result<Option<IntakeById>, Error> {
        let mut merged = IntakeById::new();

        for month in month_key::keys_in_range(start, end)? {
            if let Some(entries) = self.fetch_month(user, month).await? {
                merged.extend(entries);
            }
        }

        Ok((!merged.is_empty()).then_some(merged))
    }
}
