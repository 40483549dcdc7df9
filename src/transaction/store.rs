//! The transaction model and its partition-aware storage operations.
//!
//! Transactions are sharded into one collection per calendar month:
//!
//! ```text
//! users/{userId}/transactions/{MM_YYYY}/{transactionId}
//! ```
//!
//! Callers never see the partitions. [TransactionStore] computes the
//! partition from each record's date on the way in, and merges partitions
//! back together on the way out. There is no atomicity across partitions: a
//! range read that touches N months issues N independent reads, and
//! concurrent writers may land between them.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserId,
    month_key::{self, MAX_YEAR, MIN_YEAR, MonthKey},
    store::{DocumentStore, StoreError, month_path, record_path},
};

const COLLECTION: &str = "transactions";

/// How many trailing months [TransactionStore::delete] probes when the caller
/// does not know which partition holds the record.
pub const DELETE_SCAN_MONTHS: usize = 12;

/// Whether a transaction moved money in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money came in.
    Income,
    /// Money went out.
    Expense,
}

/// One income or expense event, as stored.
///
/// The record does not carry its own id; the id is the path segment the
/// record is stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// When the money moved.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,

    /// Whether money came in or went out.
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// A label such as "Groceries" or "Salary".
    pub category: String,

    /// The amount of money, always non-negative. `kind` carries the
    /// direction.
    pub amount: f64,

    /// Optional note. Absent notes are omitted from the stored record
    /// entirely; the store's serialization cannot represent an absent value,
    /// and writing null instead would corrupt sparse records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A month partition's worth of transactions, keyed by id.
pub type TransactionsById = HashMap<String, TransactionRecord>;

/// The id and partition assigned by [TransactionStore::create].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Created {
    /// The store-generated id of the new record.
    pub id: String,
    /// The partition the record was written to.
    pub month: MonthKey,
}

/// Where a record ended up after [TransactionStore::update].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Updated {
    /// The partition the record now lives in.
    pub month: MonthKey,
    /// The partition a stale copy was removed from, when the date edit moved
    /// the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_from: Option<MonthKey>,
}

/// Translates transaction CRUD and range queries into partition-aware
/// operations against the document store.
#[derive(Clone)]
pub struct TransactionStore {
    store: Arc<dyn DocumentStore>,
}

impl TransactionStore {
    /// Create a store backed by `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate a record and compute the partition its date homes it to.
    fn validated_month(record: &TransactionRecord) -> Result<MonthKey, Error> {
        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(Error::InvalidAmount(record.amount));
        }

        let date = record.date.date();

        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(Error::InvalidDate(date.to_string()));
        }

        Ok(MonthKey::for_date(date))
    }

    fn to_value(record: &TransactionRecord) -> Result<Value, Error> {
        serde_json::to_value(record).map_err(|error| Error::Serialization(error.to_string()))
    }

    /// Store a new transaction and return its store-generated id along with
    /// the partition it was written to.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidAmount] if the amount is negative or not finite,
    /// - [Error::InvalidDate] if the date is outside the supported years,
    /// - [Error::Write] if the remote write fails.
    pub async fn create(&self, user: &UserId, record: &TransactionRecord) -> Result<Created, Error> {
        let month = Self::validated_month(record)?;
        let value = Self::to_value(record)?;
        let path = month_path(user, COLLECTION, month);

        let id = self.store.push(&path, &value).await.map_err(|error| {
            tracing::error!("could not append transaction under {path}: {error}");
            Error::Write(error)
        })?;

        Ok(Created { id, month })
    }

    /// Overwrite the transaction `id` with `record`, re-homing it when the
    /// date moved it to a different partition.
    ///
    /// The new copy is written before the stale one is removed, so a failure
    /// between the two steps leaves a duplicate rather than losing the
    /// record; re-running the update converges. `known_month` is the
    /// partition the caller last saw the record in. Without it, the stale
    /// copy is located by the same bounded scan [TransactionStore::delete]
    /// uses, so a record edited more than [DELETE_SCAN_MONTHS] months after
    /// its original date may leave a stale copy behind.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidAmount] or [Error::InvalidDate] as for
    ///   [TransactionStore::create],
    /// - [Error::Fetch] if probing for the record's current partition fails,
    /// - [Error::Write] if the write fails,
    /// - [Error::Delete] if removing the stale copy fails.
    pub async fn update(
        &self,
        user: &UserId,
        id: &str,
        record: &TransactionRecord,
        known_month: Option<MonthKey>,
    ) -> Result<Updated, Error> {
        let month = Self::validated_month(record)?;
        let value = Self::to_value(record)?;

        let stale = match known_month {
            Some(key) if key != month => Some(key),
            Some(_) => None,
            None => self.locate(user, id, Some(month)).await.map_err(|error| {
                tracing::error!("could not probe partitions for transaction {id}: {error}");
                Error::Fetch(error)
            })?,
        };

        let path = record_path(user, COLLECTION, month, id);
        self.store.put(&path, &value).await.map_err(|error| {
            tracing::error!("could not write transaction at {path}: {error}");
            Error::Write(error)
        })?;

        if let Some(old) = stale {
            let old_path = record_path(user, COLLECTION, old, id);
            self.store.delete(&old_path).await.map_err(|error| {
                tracing::error!("could not remove stale transaction at {old_path}: {error}");
                Error::Delete(error)
            })?;
        }

        Ok(Updated {
            month,
            moved_from: stale,
        })
    }

    /// Remove the transaction `id`, returning the partition it was removed
    /// from.
    ///
    /// With `known_month` this is a single remote call. Without it, the
    /// trailing [DELETE_SCAN_MONTHS] partitions are probed oldest first and
    /// the first match is removed. A record found in none of them is a benign
    /// no-op returning `None`: months with no activity are a normal state,
    /// and the caller may already have deleted the record.
    ///
    /// # Errors
    /// This function will return an [Error::Delete] if any remote call fails.
    pub async fn delete(
        &self,
        user: &UserId,
        id: &str,
        known_month: Option<MonthKey>,
    ) -> Result<Option<MonthKey>, Error> {
        let month = match known_month {
            Some(month) => Some(month),
            None => self.locate(user, id, None).await.map_err(|error| {
                tracing::error!("could not probe partitions for transaction {id}: {error}");
                Error::Delete(error)
            })?,
        };

        let Some(month) = month else {
            tracing::debug!(
                "transaction {id} not found in the trailing {DELETE_SCAN_MONTHS} months, nothing to delete"
            );
            return Ok(None);
        };

        let path = record_path(user, COLLECTION, month, id);
        self.store.delete(&path).await.map_err(|error| {
            tracing::error!("could not delete transaction at {path}: {error}");
            Error::Delete(error)
        })?;

        Ok(Some(month))
    }

    /// Find which of the trailing candidate partitions holds `id`, probing
    /// oldest first and stopping at the first match.
    async fn locate(
        &self,
        user: &UserId,
        id: &str,
        skip: Option<MonthKey>,
    ) -> Result<Option<MonthKey>, StoreError> {
        for month in MonthKey::trailing(DELETE_SCAN_MONTHS) {
            if Some(month) == skip {
                continue;
            }

            if self.store.exists(&record_path(user, COLLECTION, month, id)).await? {
                return Ok(Some(month));
            }
        }

        Ok(None)
    }

    /// Read one month's partition.
    ///
    /// Returns `None` if the partition does not exist. Absence is not an
    /// error; months with no activity have no partition at all.
    ///
    /// # Errors
    /// This function will return an [Error::Fetch] if the remote read fails
    /// or the stored collection cannot be decoded.
    pub async fn fetch_month(
        &self,
        user: &UserId,
        month: MonthKey,
    ) -> Result<Option<TransactionsById>, Error> {
        let path = month_path(user, COLLECTION, month);

        let value = self.store.get(&path).await.map_err(|error| {
            tracing::error!("could not fetch {path}: {error}");
            Error::Fetch(error)
        })?;

        match value {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|error| {
                tracing::error!("malformed transaction collection at {path}: {error}");
                Error::Fetch(StoreError::new(format!("malformed data at {path}: {error}")))
            }),
        }
    }

    /// Read every partition from the month of `start` through the month of
    /// `end` and merge the records into one mapping by id.
    ///
    /// Returns `None` when every partition in the range was empty or absent,
    /// so callers can tell "no data" from "empty collection". Reads are
    /// issued one partition at a time in chronological order; if any read
    /// fails the whole operation fails without partial results.
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
    ) -> Result<Option<TransactionsById>, Error> {
        let mut merged = TransactionsById::new();

        for month in month_key::keys_in_range(start, end)? {
            if let Some(records) = self.fetch_month(user, month).await? {
                merged.extend(records);
            }
        }

        Ok((!merged.is_empty()).then_some(merged))
    }

    /// Read every transaction within the bounded all-data window, 5 years
    /// back to 1 year forward of the current date.
    ///
    /// This is an approximation of "everything", not a guarantee: records
    /// dated outside the window are not visited.
    ///
    /// # Errors
    /// This function will return an [Error::Fetch] if any partition read
    /// fails.
    pub async fn fetch_all(&self, user: &UserId) -> Result<Option<TransactionsById>, Error> {
        let (start, end) = month_key::all_data_window();

        self.fetch_range(user, start, end).await
    }
}
