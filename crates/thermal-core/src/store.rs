//! The seam between the dashboard and wherever session rows live.

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{Result, ThermalError};
use crate::file_store::FileSessionStore;
use crate::pagination::Pagination;
use crate::rest_store::RestSessionStore;
use crate::types::SessionRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// What to fetch: whose sessions, and which slice of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub user_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl SessionQuery {
    /// A page request, already sanitized.
    pub fn page(user_id: Option<String>, page: Pagination) -> Self {
        Self {
            user_id,
            limit: page.limit as usize,
            offset: usize::try_from(page.offset).unwrap_or(usize::MAX),
        }
    }

    /// The newest `limit` sessions, as the dashboard wants them.
    pub fn recent(user_id: Option<String>, limit: usize) -> Self {
        Self {
            user_id,
            limit,
            offset: 0,
        }
    }
}

/// A source of normalized session records.
///
/// Implementations must return records newest-first by `started_at`;
/// the aggregator relies on that order for recent sessions and trends.
/// A `user_id` in the query matches only rows owned by that user; rows
/// with no owner come back only when the query names no user.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn fetch(&self, query: &SessionQuery) -> Result<Vec<SessionRecord>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Build the configured session source.
pub fn build_source(config: &StoreConfig) -> Result<Arc<dyn SessionSource>> {
    match config.backend {
        StoreBackend::File => {
            let dir = config.resolved_sessions_dir();
            tracing::debug!("Using file session store at {:?}", dir);
            Ok(Arc::new(FileSessionStore::new(dir)))
        }
        StoreBackend::Rest => {
            let base = config.rest_url.as_deref().ok_or_else(|| {
                ThermalError::Config("store.rest_url is required for the rest backend".into())
            })?;
            let store = RestSessionStore::new(base, &config.table, config.api_key.clone())?;
            tracing::debug!("Using REST session store at {}", base);
            Ok(Arc::new(store))
        }
    }
}
