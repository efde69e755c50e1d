//! Remote data access for the views.
//!
//! [`PanelSource`] is the seam to the upstream panel API. Every call is made on
//! behalf of one panel user. [`FetchCache`] sits in front of it and keeps the
//! last good response per [`CacheKey`]; it never caches errors and never
//! retries.

pub mod http;

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::metrics::Metrics;
use crate::types::{FileObject, PaginatedResult, Server, ServerQuery};

pub use http::HttpPanelSource;

#[async_trait]
pub trait PanelSource: Send + Sync {
    async fn list_servers(&self, query: &ServerQuery) -> AppResult<PaginatedResult<Server>>;
    async fn list_directory(&self, user: &str, server_id: &str, directory: &str) -> AppResult<Vec<FileObject>>;
}

/// Endpoint plus the caller and query parameters that select one response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn servers(query: &ServerQuery) -> Self {
        CacheKey {
            endpoint: "/api/client/servers".to_string(),
            params: vec![
                ("user".to_string(), query.user.clone()),
                ("admin".to_string(), query.admin.to_string()),
                ("page".to_string(), query.page.to_string()),
            ],
        }
    }

    pub fn directory(user: &str, server_id: &str, directory: &str) -> Self {
        CacheKey {
            endpoint: format!("/api/client/servers/{}/files/list", server_id),
            params: vec![
                ("user".to_string(), user.to_string()),
                ("directory".to_string(), directory.to_string()),
            ],
        }
    }
}

pub struct FetchCache {
    source: Arc<dyn PanelSource>,
    servers: Mutex<LruCache<CacheKey, PaginatedResult<Server>>>,
    files: Mutex<LruCache<CacheKey, Vec<FileObject>>>,
    metrics: Metrics,
}

impl FetchCache {
    pub fn new(source: Arc<dyn PanelSource>, capacity: usize, metrics: Metrics) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            servers: Mutex::new(LruCache::new(cap)),
            files: Mutex::new(LruCache::new(cap)),
            metrics,
        }
    }

    /// Cached server page, fetched on a miss or when `revalidate` is set.
    pub async fn servers(&self, query: &ServerQuery, revalidate: bool) -> AppResult<PaginatedResult<Server>> {
        let key = CacheKey::servers(query);
        if !revalidate {
            if let Some(hit) = self.servers.lock().await.get(&key) {
                return Ok(hit.clone());
            }
        }
        match self.source.list_servers(query).await {
            Ok(page) => {
                self.metrics.inc_fetches_ok();
                self.servers.lock().await.put(key, page.clone());
                Ok(page)
            }
            Err(e) => {
                self.metrics.inc_fetches_failed();
                Err(e)
            }
        }
    }

    /// Cached directory contents, fetched on a miss or when `revalidate` is set.
    pub async fn directory(
        &self,
        user: &str,
        server_id: &str,
        directory: &str,
        revalidate: bool,
    ) -> AppResult<Vec<FileObject>> {
        let key = CacheKey::directory(user, server_id, directory);
        if !revalidate {
            if let Some(hit) = self.files.lock().await.get(&key) {
                return Ok(hit.clone());
            }
        }
        match self.source.list_directory(user, server_id, directory).await {
            Ok(files) => {
                self.metrics.inc_fetches_ok();
                self.files.lock().await.put(key, files.clone());
                Ok(files)
            }
            Err(e) => {
                self.metrics.inc_fetches_failed();
                Err(e)
            }
        }
    }
}
