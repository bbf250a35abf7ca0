//! TTL + singleflight cache for provider pricing records
//!
//! The cache guarantees at most one in-flight computation per fingerprint:
//! concurrent callers for the same fingerprint await the single
//! computation's outcome instead of issuing duplicate upstream queries,
//! while callers for other fingerprints are never blocked. Failed
//! computations are not cached — a provider outage must not poison the
//! slot — and cancellation of the computing caller aborts the flight so
//! the slot becomes immediately retryable.

use advisor_core::{Fingerprint, ProviderError, ProviderRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
// tokio's Instant respects the test clock, so TTL expiry is testable
// under a paused runtime.
use tokio::time::Instant;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors surfaced by `get_or_compute`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    /// The computation ran and failed; the failure was not cached
    #[error(transparent)]
    Compute(#[from] ProviderError),

    /// The computing caller was cancelled before the flight settled
    #[error("in-flight computation for fingerprint {0} was cancelled")]
    FlightCancelled(String),

    /// Same digest, different canonical input — a defect, never resolved
    /// silently
    #[error("fingerprint collision on digest {digest}")]
    FingerprintCollision { digest: String },
}

/// A cached record plus its freshness bookkeeping.
///
/// Entries are immutable once written; expiry replaces the whole slot.
#[derive(Debug, Clone)]
struct CacheEntry {
    canonical: String,
    record: ProviderRecord,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

type FlightResult = Result<ProviderRecord>;

enum Slot {
    Ready(CacheEntry),
    InFlight(broadcast::Sender<FlightResult>),
}

enum Action {
    Hit(ProviderRecord),
    Wait(broadcast::Receiver<FlightResult>),
    Fly(broadcast::Sender<FlightResult>),
    Collision,
}

/// Fingerprint-keyed record cache with TTL eviction and singleflight
/// admission
pub struct ResultCache {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // A panicked flight already settled its slot via the drop guard,
        // so the map is consistent even after poisoning.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached record for `fingerprint` if present and fresh
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<ProviderRecord> {
        let slots = self.lock_slots();
        match slots.get(fingerprint.digest()) {
            Some(Slot::Ready(entry))
                if entry.is_fresh() && entry.canonical == fingerprint.canonical() =>
            {
                Some(entry.record.clone())
            }
            _ => None,
        }
    }

    /// Fetch the record for `fingerprint`, computing it at most once.
    ///
    /// On a fresh hit the cached record is returned without invoking
    /// `compute`. On a miss exactly one caller runs `compute`; every
    /// concurrent caller for the same fingerprint awaits that flight's
    /// outcome. A failed computation is returned to all waiters and the
    /// slot is immediately eligible for retry.
    pub async fn get_or_compute<F, Fut>(
        &self,
        fingerprint: &Fingerprint,
        ttl: Duration,
        compute: F,
    ) -> Result<ProviderRecord>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<ProviderRecord, ProviderError>>,
    {
        let action = self.admit(fingerprint);

        match action {
            Action::Hit(record) => {
                tracing::debug!(fingerprint = %fingerprint, "cache hit");
                Ok(record)
            }
            Action::Collision => Err(CacheError::FingerprintCollision {
                digest: fingerprint.digest().to_string(),
            }),
            Action::Wait(mut rx) => {
                tracing::debug!(fingerprint = %fingerprint, "awaiting in-flight computation");
                match rx.recv().await {
                    Ok(result) => result,
                    // Sender dropped without settling: the flight was
                    // cancelled between our subscription and its send.
                    Err(_) => Err(CacheError::FlightCancelled(
                        fingerprint.digest().to_string(),
                    )),
                }
            }
            Action::Fly(tx) => {
                tracing::debug!(fingerprint = %fingerprint, "cache miss, computing");
                let mut guard = FlightGuard {
                    cache: self,
                    digest: fingerprint.digest().to_string(),
                    tx: Some(tx),
                };

                let result = compute()
                    .await
                    .map_err(CacheError::from);

                guard.settle(fingerprint, ttl, &result);
                result
            }
        }
    }

    /// Classify the caller against the slot state under the map lock
    fn admit(&self, fingerprint: &Fingerprint) -> Action {
        enum State {
            Hit(ProviderRecord),
            Wait(broadcast::Receiver<FlightResult>),
            Collision,
            NeedsFlight,
        }

        let mut slots = self.lock_slots();

        let state = match slots.get(fingerprint.digest()) {
            Some(Slot::Ready(entry)) if entry.canonical != fingerprint.canonical() => {
                State::Collision
            }
            Some(Slot::Ready(entry)) if entry.is_fresh() => State::Hit(entry.record.clone()),
            Some(Slot::Ready(_)) | None => State::NeedsFlight,
            Some(Slot::InFlight(tx)) => State::Wait(tx.subscribe()),
        };

        match state {
            State::Hit(record) => Action::Hit(record),
            State::Wait(rx) => Action::Wait(rx),
            State::Collision => Action::Collision,
            State::NeedsFlight => {
                // Single message per flight; capacity 1 can never lag.
                let (tx, _) = broadcast::channel(1);
                slots.insert(
                    fingerprint.digest().to_string(),
                    Slot::InFlight(tx.clone()),
                );
                Action::Fly(tx)
            }
        }
    }

    /// Drop the cached entry for `fingerprint`, if any.
    ///
    /// An in-flight computation is left alone; it will settle into the
    /// slot as usual.
    pub fn invalidate(&self, fingerprint: &Fingerprint) {
        let mut slots = self.lock_slots();
        if matches!(slots.get(fingerprint.digest()), Some(Slot::Ready(_))) {
            slots.remove(fingerprint.digest());
        }
    }

    /// Remove every expired entry
    pub fn purge_expired(&self) {
        let mut slots = self.lock_slots();
        slots.retain(|_, slot| match slot {
            Slot::Ready(entry) => entry.is_fresh(),
            Slot::InFlight(_) => true,
        });
    }

    /// Number of occupied slots, in-flight computations included
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    /// Whether the cache holds no slots at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ResultCache {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

/// Settles or aborts a flight exactly once.
///
/// If the computing future is dropped before settling (per-request
/// deadline, caller cancellation), `Drop` clears the slot and notifies
/// waiters so the fingerprint is immediately retryable.
struct FlightGuard<'a> {
    cache: &'a ResultCache,
    digest: String,
    tx: Option<broadcast::Sender<FlightResult>>,
}

impl FlightGuard<'_> {
    fn settle(&mut self, fingerprint: &Fingerprint, ttl: Duration, result: &FlightResult) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        {
            let mut slots = self.cache.lock_slots();
            match result {
                Ok(record) => {
                    slots.insert(
                        self.digest.clone(),
                        Slot::Ready(CacheEntry {
                            canonical: fingerprint.canonical().to_string(),
                            record: record.clone(),
                            inserted_at: Instant::now(),
                            ttl,
                        }),
                    );
                }
                // Failures are never cached; free the slot for retries.
                Err(_) => {
                    slots.remove(&self.digest);
                }
            }
        }

        // No receivers is fine: there were no waiters for this flight.
        let _ = tx.send(result.clone());
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        tracing::debug!(digest = %self.digest, "flight cancelled before settling");
        {
            let mut slots = self.cache.lock_slots();
            if matches!(slots.get(&self.digest), Some(Slot::InFlight(_))) {
                slots.remove(&self.digest);
            }
        }
        let _ = tx.send(Err(CacheError::FlightCancelled(self.digest.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::{
        CostCategory, ProviderId, QuoteLine, ResourceRequirement,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, timeout};

    fn fingerprint() -> Fingerprint {
        let req = ResourceRequirement::builder().build().unwrap();
        Fingerprint::for_query(ProviderId::Aws, &req)
    }

    fn record(cost: f64) -> ProviderRecord {
        ProviderRecord::from_lines(
            ProviderId::Aws,
            vec![QuoteLine::new(CostCategory::Compute, cost, 0.9, "t3.medium")],
            &[CostCategory::Compute],
        )
    }

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = ResultCache::new();
        let fp = fingerprint();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute(&fp, TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(10.0))
            })
            .await
            .unwrap();
        assert_eq!(first.total_monthly_cost, 10.0);

        // Second call within TTL must not touch upstream.
        let second = cache
            .get_or_compute(&fp, TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(99.0))
            })
            .await
            .unwrap();
        assert_eq!(second.total_monthly_cost, 10.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_singleflight_one_compute_for_concurrent_callers() {
        let cache = ResultCache::new();
        let fp = fingerprint();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let fp = fp.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute(&fp, TTL, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        sleep(Duration::from_millis(50)).await;
                        Ok(record(42.0))
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.total_monthly_cost, 42.0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_not_cached_and_delivered_to_waiters() {
        let cache = ResultCache::new();
        let fp = fingerprint();
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let cache = cache.clone();
            let fp = fp.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_compute(&fp, TTL, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        sleep(Duration::from_millis(20)).await;
                        Err(ProviderError::Unavailable {
                            provider: ProviderId::Aws,
                            detail: "503".to_string(),
                        })
                    })
                    .await
            })
        };

        // Let the failing flight take the slot before the waiter arrives.
        tokio::task::yield_now().await;

        let waiter = {
            let cache = cache.clone();
            let fp = fp.clone();
            tokio::spawn(async move {
                // Joins the same flight; never runs its own compute.
                cache
                    .get_or_compute(&fp, TTL, || async {
                        panic!("waiter must not compute");
                    })
                    .await
            })
        };

        let first = failing.await.unwrap();
        let second = waiter.await.unwrap();
        assert!(matches!(first, Err(CacheError::Compute(_))));
        assert!(matches!(second, Err(CacheError::Compute(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The slot is immediately retryable and a success is cached.
        let retried = cache
            .get_or_compute(&fp, TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(7.0))
            })
            .await
            .unwrap();
        assert_eq!(retried.total_monthly_cost, 7.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_triggers_recompute() {
        let cache = ResultCache::new();
        let fp = fingerprint();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_millis(10);

        cache
            .get_or_compute(&fp, ttl, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(1.0))
            })
            .await
            .unwrap();

        sleep(Duration::from_millis(20)).await;

        let refreshed = cache
            .get_or_compute(&fp, ttl, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(2.0))
            })
            .await
            .unwrap();
        assert_eq!(refreshed.total_monthly_cost, 2.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_flight_frees_the_slot() {
        let cache = ResultCache::new();
        let fp = fingerprint();

        let cancelled = timeout(
            Duration::from_millis(10),
            cache.get_or_compute(&fp, TTL, || async {
                sleep(Duration::from_secs(3600)).await;
                Ok(record(1.0))
            }),
        )
        .await;
        assert!(cancelled.is_err());

        // The drop guard cleared the slot; the next caller computes.
        let result = cache
            .get_or_compute(&fp, TTL, || async { Ok(record(5.0)) })
            .await
            .unwrap();
        assert_eq!(result.total_monthly_cost, 5.0);
    }

    #[tokio::test]
    async fn test_collision_is_a_defect() {
        let cache = ResultCache::new();
        let original = Fingerprint::from_raw_parts("deadbeef", "aws|compute|medium");
        let forged = Fingerprint::from_raw_parts("deadbeef", "gcp|storage|xlarge");

        cache
            .get_or_compute(&original, TTL, || async { Ok(record(1.0)) })
            .await
            .unwrap();

        let result = cache
            .get_or_compute(&forged, TTL, || async { Ok(record(2.0)) })
            .await;
        assert!(matches!(
            result,
            Err(CacheError::FingerprintCollision { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalidate_and_purge() {
        let cache = ResultCache::new();
        let fp = fingerprint();

        cache
            .get_or_compute(&fp, TTL, || async { Ok(record(1.0)) })
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&fp).is_some());

        cache.invalidate(&fp);
        assert!(cache.get(&fp).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_drops_stale_entries_only() {
        let cache = ResultCache::new();
        let req = ResourceRequirement::builder().build().unwrap();
        let short = Fingerprint::for_query(ProviderId::Aws, &req);
        let long = Fingerprint::for_query(ProviderId::Gcp, &req);

        cache
            .get_or_compute(&short, Duration::from_millis(5), || async {
                Ok(record(1.0))
            })
            .await
            .unwrap();
        cache
            .get_or_compute(&long, TTL, || async { Ok(record(2.0)) })
            .await
            .unwrap();

        sleep(Duration::from_millis(10)).await;
        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&long).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrelated_fingerprints_do_not_block() {
        let cache = ResultCache::new();
        let req = ResourceRequirement::builder().build().unwrap();
        let slow = Fingerprint::for_query(ProviderId::Aws, &req);
        let fast = Fingerprint::for_query(ProviderId::Gcp, &req);

        let slow_task = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute(&slow, TTL, || async {
                        sleep(Duration::from_secs(60)).await;
                        Ok(record(1.0))
                    })
                    .await
            })
        };

        // Must complete while the other flight is still in the air.
        let fast_result = timeout(
            Duration::from_secs(1),
            cache.get_or_compute(&fast, TTL, || async { Ok(record(2.0)) }),
        )
        .await
        .expect("unrelated fingerprint was blocked")
        .unwrap();
        assert_eq!(fast_result.total_monthly_cost, 2.0);

        slow_task.abort();
    }
}
