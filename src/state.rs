use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::fetch::{FetchCache, PanelSource};
use crate::listing::ListingOptions;
use crate::metrics::Metrics;
use crate::storage::KeyValueStore;
use crate::views::dashboard::DashboardView;
use crate::views::files::FileManagerView;

pub type Session<T> = Arc<Mutex<T>>;

/// Least recently used sessions, dropped once `capacity` is exceeded.
pub type SessionRegistry<K, V> = Arc<Mutex<LruCache<K, V>>>;

/// The shared application state.
///
/// Views are kept per caller: one dashboard per user and one file manager per
/// (user, server). Each sits behind its own mutex so requests from the same
/// user are serialised while different users never contend. Both registries
/// are bounded by `cache.sessions`; an evicted view is rebuilt from storage on
/// its next request.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, checked by the readiness probe.
    pub db: sqlx::SqlitePool,
    pub store: Arc<dyn KeyValueStore>,
    pub fetcher: Arc<FetchCache>,
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
    pub dashboards: SessionRegistry<String, (bool, Session<DashboardView>)>,
    pub file_views: SessionRegistry<(String, String), Session<FileManagerView>>,
}

impl AppState {
    pub fn new(
        db: sqlx::SqlitePool,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn PanelSource>,
        config: AppConfig,
    ) -> Self {
        let metrics = Metrics::new();
        let fetcher = Arc::new(FetchCache::new(source, config.cache.capacity, metrics.clone()));
        let sessions = NonZeroUsize::new(config.cache.sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            db,
            store,
            fetcher,
            config: Arc::new(config),
            metrics,
            dashboards: Arc::new(Mutex::new(LruCache::new(sessions))),
            file_views: Arc::new(Mutex::new(LruCache::new(sessions))),
        }
    }

    /// Dashboard session for `user_id`, created on first use.
    ///
    /// Sessions remember the root-admin flag they were built with and are
    /// replaced when the caller's flag changes.
    pub async fn dashboard(&self, user_id: &str, root_admin: bool) -> Session<DashboardView> {
        let mut sessions = self.dashboards.lock().await;
        if let Some((flag, existing)) = sessions.get(user_id) {
            if *flag == root_admin {
                return existing.clone();
            }
        }
        let view = DashboardView::new(user_id, root_admin, self.store.clone(), self.metrics.clone());
        let session = Arc::new(Mutex::new(view));
        sessions.put(user_id.to_string(), (root_admin, session.clone()));
        session
    }

    /// File manager session for (`user_id`, `server_id`), created on first use.
    pub async fn file_view(&self, user_id: &str, server_id: &str) -> Session<FileManagerView> {
        let key = (user_id.to_string(), server_id.to_string());
        let mut sessions = self.file_views.lock().await;
        sessions
            .get_or_insert(key, || {
                let options = ListingOptions::from(&self.config.listing);
                Arc::new(Mutex::new(FileManagerView::new(user_id, server_id, options, self.metrics.clone())))
            })
            .clone()
    }
}
