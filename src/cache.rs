//! A read-through cache of fetched transaction months.
//!
//! Clients page through the same recent months over and over; caching whole
//! partitions spares the remote store a read per month per request. Read
//! handlers serve months from here and fill misses from the store; mutation
//! handlers invalidate exactly the partitions the store reports as touched.
//!
//! A cached month may be empty. That is distinct from "not cached": an empty
//! entry records that the partition was absent when last fetched.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use crate::{auth::UserId, month_key::MonthKey, transaction::TransactionsById};

/// A shared cache of month partitions, keyed by user and month.
///
/// Cloning is cheap; clones share the same underlying cache.
#[derive(Debug, Clone, Default)]
pub struct MonthCache {
    months: Arc<Mutex<HashMap<UserId, HashMap<MonthKey, TransactionsById>>>>,
}

impl MonthCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached copy of a month, if one is stored.
    ///
    /// # Panics
    /// Panics if the cache lock is poisoned.
    pub fn get(&self, user: &UserId, month: MonthKey) -> Option<TransactionsById> {
        self.months
            .lock()
            .unwrap()
            .get(user)
            .and_then(|months| months.get(&month))
            .cloned()
    }

    /// Store a batch of fetched months for a user, replacing any cached
    /// copies of the same months.
    ///
    /// # Panics
    /// Panics if the cache lock is poisoned.
    pub fn put(&self, user: &UserId, batch: impl IntoIterator<Item = (MonthKey, TransactionsById)>) {
        self.months
            .lock()
            .unwrap()
            .entry(user.clone())
            .or_default()
            .extend(batch);
    }

    /// Drop the cached copy of a single month.
    ///
    /// # Panics
    /// Panics if the cache lock is poisoned.
    pub fn invalidate(&self, user: &UserId, month: MonthKey) {
        if let Some(months) = self.months.lock().unwrap().get_mut(user) {
            months.remove(&month);
        }
    }

    /// Drop every cached month the predicate matches.
    ///
    /// # Panics
    /// Panics if the cache lock is poisoned.
    pub fn invalidate_matching(&self, mut predicate: impl FnMut(&UserId, MonthKey) -> bool) {
        let mut months = self.months.lock().unwrap();

        for (user, user_months) in months.iter_mut() {
            user_months.retain(|&month, _| !predicate(user, month));
        }

        months.retain(|_, user_months| !user_months.is_empty());
    }

    /// A point-in-time copy of everything cached for a user, oldest month
    /// first.
    ///
    /// # Panics
    /// Panics if the cache lock is poisoned.
    pub fn snapshot(&self, user: &UserId) -> BTreeMap<MonthKey, TransactionsById> {
        self.months
            .lock()
            .unwrap()
            .get(user)
            .map(|months| {
                months
                    .iter()
                    .map(|(month, records)| (*month, records.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod month_cache_tests {
    use time::macros::datetime;

    use crate::{
        auth::UserId,
        month_key::MonthKey,
        transaction::{TransactionKind, TransactionRecord, TransactionsById},
    };

    use super::MonthCache;

    fn test_user() -> UserId {
        UserId::new("user_1234").unwrap()
    }

    fn one_record_month(id: &str) -> TransactionsById {
        TransactionsById::from([(
            id.to_owned(),
            TransactionRecord {
                date: datetime!(2025-04-15 10:00 UTC),
                kind: TransactionKind::Expense,
                category: "Groceries".to_owned(),
                amount: 42.5,
                description: None,
            },
        )])
    }

    #[test]
    fn put_then_get_returns_the_cached_month() {
        let cache = MonthCache::new();
        let user = test_user();
        let month = MonthKey::new(4, 2025).unwrap();
        let records = one_record_month("-t1");

        cache.put(&user, [(month, records.clone())]);

        assert_eq!(cache.get(&user, month), Some(records));
    }

    #[test]
    fn cached_empty_month_is_distinct_from_uncached() {
        let cache = MonthCache::new();
        let user = test_user();
        let cached = MonthKey::new(4, 2025).unwrap();
        let uncached = MonthKey::new(5, 2025).unwrap();

        cache.put(&user, [(cached, TransactionsById::new())]);

        assert_eq!(cache.get(&user, cached), Some(TransactionsById::new()));
        assert_eq!(cache.get(&user, uncached), None);
    }

    #[test]
    fn invalidate_drops_only_that_month() {
        let cache = MonthCache::new();
        let user = test_user();
        let march = MonthKey::new(3, 2025).unwrap();
        let april = MonthKey::new(4, 2025).unwrap();

        cache.put(&user, [(march, one_record_month("-t1")), (april, one_record_month("-t2"))]);
        cache.invalidate(&user, march);

        assert_eq!(cache.get(&user, march), None);
        assert!(cache.get(&user, april).is_some());
    }

    #[test]
    fn invalidate_is_scoped_to_the_user() {
        let cache = MonthCache::new();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();
        let month = MonthKey::new(4, 2025).unwrap();

        cache.put(&alice, [(month, one_record_month("-t1"))]);
        cache.put(&bob, [(month, one_record_month("-t2"))]);
        cache.invalidate(&alice, month);

        assert_eq!(cache.get(&alice, month), None);
        assert!(cache.get(&bob, month).is_some());
    }

    #[test]
    fn invalidate_matching_drops_matched_months_everywhere() {
        let cache = MonthCache::new();
        let user = test_user();
        let old = MonthKey::new(1, 2024).unwrap();
        let recent = MonthKey::new(4, 2025).unwrap();

        cache.put(&user, [(old, one_record_month("-t1")), (recent, one_record_month("-t2"))]);
        cache.invalidate_matching(|_, month| month < recent);

        assert_eq!(cache.get(&user, old), None);
        assert!(cache.get(&user, recent).is_some());
    }

    #[test]
    fn snapshot_orders_months_chronologically() {
        let cache = MonthCache::new();
        let user = test_user();
        let december = MonthKey::new(12, 2024).unwrap();
        let january = MonthKey::new(1, 2025).unwrap();

        cache.put(&user, [(january, one_record_month("-t2")), (december, one_record_month("-t1"))]);

        let months: Vec<MonthKey> = cache.snapshot(&user).into_keys().collect();

        assert_eq!(months, vec![december, january]);
    }
}
