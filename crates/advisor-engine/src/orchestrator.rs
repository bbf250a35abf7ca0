//! Concurrent fan-out of provider queries with retry, deadline, and cache
//!
//! Each requested provider is dispatched on its own task through the
//! singleflight cache. Providers complete, fail, or hit the deadline
//! independently — a slow provider never blocks the others, and every
//! outcome becomes a normalized `ProviderRecord`.

use crate::config::OrchestratorConfig;
use advisor_cache::{CacheError, ResultCache};
use advisor_core::{
    Fingerprint, ProviderError, ProviderId, ProviderQuery, ProviderRecord, ResourceRequirement,
};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Dispatches provider queries concurrently and collects normalized
/// records, degrading failures per provider instead of aborting
pub struct Orchestrator {
    queries: BTreeMap<ProviderId, Arc<dyn ProviderQuery>>,
    cache: ResultCache,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator over registered query sources.
    ///
    /// Registering two sources for the same provider keeps the last one.
    pub fn new(
        queries: Vec<Arc<dyn ProviderQuery>>,
        cache: ResultCache,
        config: OrchestratorConfig,
    ) -> Self {
        let mut registry: BTreeMap<ProviderId, Arc<dyn ProviderQuery>> = BTreeMap::new();
        for query in queries {
            let provider = query.provider();
            if registry.insert(provider, query).is_some() {
                warn!(provider = %provider, "duplicate query source registered, keeping the last");
            }
        }

        Self {
            queries: registry,
            cache,
            config,
        }
    }

    /// The cache shared by all dispatches
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Fan out one query per requested provider and collect all records.
    ///
    /// Always returns one record per distinct requested provider, sorted
    /// by provider identity; failures are embedded in the records, never
    /// raised.
    pub async fn analyze(
        &self,
        requirement: &ResourceRequirement,
        providers: &[ProviderId],
    ) -> Vec<ProviderRecord> {
        let mut requested: Vec<ProviderId> = providers.to_vec();
        requested.sort_unstable();
        requested.dedup();

        info!(
            request_id = %requirement.request_id,
            providers = ?requested,
            kind = ?requirement.analysis_kind,
            "dispatching provider queries"
        );

        let dispatches = requested
            .iter()
            .map(|provider| self.dispatch(*provider, requirement));
        let records = join_all(dispatches).await;

        let usable = records.iter().filter(|r| r.is_usable()).count();
        info!(
            request_id = %requirement.request_id,
            usable = usable,
            failed = records.len() - usable,
            "orchestration complete"
        );

        records
    }

    /// Resolve one provider to a record: cache, retry policy, deadline
    async fn dispatch(
        &self,
        provider: ProviderId,
        requirement: &ResourceRequirement,
    ) -> ProviderRecord {
        let Some(query) = self.queries.get(&provider) else {
            warn!(provider = %provider, "no query source registered");
            return ProviderRecord::failure(
                provider,
                &ProviderError::Unavailable {
                    provider,
                    detail: "no query source registered".to_string(),
                },
            );
        };

        let fingerprint = Fingerprint::for_query(provider, requirement);
        let dispatch = self.cache.get_or_compute(
            &fingerprint,
            self.config.cache_ttl,
            || self.query_with_retry(Arc::clone(query), requirement),
        );

        match timeout(self.config.request_deadline, dispatch).await {
            Ok(Ok(record)) => record,
            Ok(Err(CacheError::Compute(err))) => {
                debug!(provider = %provider, error = %err, "query failed permanently");
                ProviderRecord::failure(provider, &err)
            }
            Ok(Err(other)) => ProviderRecord::failure(
                provider,
                &ProviderError::Unavailable {
                    provider,
                    detail: other.to_string(),
                },
            ),
            Err(_) => {
                warn!(
                    provider = %provider,
                    deadline_ms = self.config.request_deadline.as_millis() as u64,
                    "request deadline elapsed, marking provider failed"
                );
                ProviderRecord::failure(
                    provider,
                    &ProviderError::Timeout {
                        provider,
                        detail: format!(
                            "no response within {} ms",
                            self.config.request_deadline.as_millis()
                        ),
                    },
                )
            }
        }
    }

    /// Quote with exponential backoff on retryable errors.
    ///
    /// `UpstreamRejected` fails immediately: the request itself is
    /// invalid for that provider and retrying cannot help.
    async fn query_with_retry(
        &self,
        query: Arc<dyn ProviderQuery>,
        requirement: &ResourceRequirement,
    ) -> Result<ProviderRecord, ProviderError> {
        let provider = query.provider();
        let expected = requirement.analysis_kind.expected_categories();
        let mut attempt: u32 = 1;

        loop {
            match query.quote(requirement).await {
                Ok(lines) => {
                    let record = ProviderRecord::from_lines(provider, lines, expected);
                    debug!(
                        provider = %provider,
                        attempt = attempt,
                        status = ?record.status,
                        total = record.total_monthly_cost,
                        "provider quote collected"
                    );
                    return Ok(record);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        provider = %provider,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "provider query failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        provider = %provider,
                        attempts = attempt,
                        error = %err,
                        "provider query failed permanently"
                    );
                    return Err(err);
                }
            }
        }
    }
}
