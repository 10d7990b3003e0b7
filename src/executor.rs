//! Cache-or-invoke orchestration for a single report run.
//!
//! Caching is keyed on the logical request identity (property, report key,
//! window), never on the wall clock of the call, so identical requests
//! inside the TTL cost exactly one handler invocation.

use thiserror::Error;

use crate::cache::CacheStore;
use crate::client::DataClient;
use crate::report::{ReportHandler, TabularResult};

/// A report run that could not produce a result.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The handler, or the network call underneath it, failed. Nothing was
    /// cached for this request.
    #[error("report '{key}' failed")]
    Report {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

pub struct ReportExecutor {
    cache: CacheStore,
}

impl ReportExecutor {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Serve from cache when fresh, otherwise run the handler and cache the
    /// outcome. Handler failures propagate with the cause attached and leave
    /// the cache untouched.
    pub fn execute(
        &self,
        handler: &dyn ReportHandler,
        property_id: &str,
        start_date: &str,
        end_date: &str,
        client: &dyn DataClient,
    ) -> Result<TabularResult, ExecuteError> {
        let fingerprint =
            CacheStore::fingerprint(property_id, handler.key(), start_date, end_date);

        if let Some(cached) = self.cache.get(&fingerprint) {
            tracing::debug!("Cache hit for {} ({fingerprint})", handler.key());
            return Ok(cached);
        }

        tracing::debug!("Cache miss for {}, running report", handler.key());
        let result = handler
            .run(property_id, client, start_date, end_date)
            .map_err(|source| ExecuteError::Report {
                key: handler.key().to_string(),
                source,
            })?;

        // A cache write failure must not fail a successful report.
        if let Err(e) = self.cache.put(&fingerprint, &result) {
            tracing::warn!("Failed to cache result for {}: {e}", handler.key());
        }
        Ok(result)
    }
}
