//! Dashboard controller: one user's server page in their own order.
//!
//! Persisted state (show-all toggle, order, folders) is read once by
//! [`DashboardView::load`]. Nothing is reconciled or rendered before that
//! finished, and a fetch result is only applied while its [`CacheKey`] is still
//! the one the view would request.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::folders::FolderSet;
use super::{page_location, ApplyOutcome};
use crate::error::{validation, AppResult};
use crate::fetch::CacheKey;
use crate::flash::{Flash, Flashes};
use crate::metrics::Metrics;
use crate::order::{load_json, store_json, Loaded, OrderBook, Role, ScopeKey};
use crate::storage::KeyValueStore;
use crate::types::{PaginatedResult, Pagination, Server, ServerQuery};

pub const DASHBOARD_FLASH_KEY: &str = "dashboard";

#[derive(Debug, Clone, Serialize)]
pub struct FolderGroup {
    pub name: String,
    pub collapsed: bool,
    /// Servers of this folder on the current page; empty while collapsed.
    pub servers: Vec<Server>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub loading: bool,
    pub location: String,
    pub page: u32,
    pub pagination: Option<Pagination>,
    pub show_all: bool,
    pub root_admin: bool,
    pub folders: Vec<FolderGroup>,
    /// Servers not assigned to any folder, in the user's order.
    pub servers: Vec<Server>,
    pub flash: Option<Flash>,
}

pub struct DashboardView {
    user_id: String,
    root_admin: bool,
    show_all: bool,
    page: u32,
    store: Arc<dyn KeyValueStore>,
    metrics: Metrics,
    order: OrderBook,
    folders: FolderSet,
    folders_key: ScopeKey,
    loaded: bool,
    servers: Option<PaginatedResult<Server>>,
    flashes: Flashes,
}

impl DashboardView {
    pub fn new(user_id: impl Into<String>, root_admin: bool, store: Arc<dyn KeyValueStore>, metrics: Metrics) -> Self {
        let user_id = user_id.into();
        Self {
            order: OrderBook::new(ScopeKey::server_order(Role::User, &user_id)),
            folders_key: ScopeKey::server_folders(Role::User, &user_id),
            folders: FolderSet::new(),
            user_id,
            root_admin,
            show_all: false,
            page: 1,
            store,
            metrics,
            loaded: false,
            servers: None,
            flashes: Flashes::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn root_admin(&self) -> bool {
        self.root_admin
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// Admin scope only when a root admin turned the toggle on.
    pub fn role(&self) -> Role {
        if self.root_admin && self.show_all {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn order(&self) -> &[String] {
        self.order.order()
    }

    pub fn folders(&self) -> &FolderSet {
        &self.folders
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flashes.get(DASHBOARD_FLASH_KEY)
    }

    pub fn query(&self) -> ServerQuery {
        ServerQuery { user: self.user_id.clone(), page: self.page, admin: self.role() == Role::Admin }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::servers(&self.query())
    }

    pub fn location(&self) -> String {
        page_location(self.page)
    }

    /// Moves to another page. The previous page's servers are dropped.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.servers = None;
        }
    }

    /// Reads every persisted key of this view once. Later calls are no-ops.
    pub async fn load(&mut self) {
        if self.loaded {
            return;
        }
        let mut purged = 0;
        let toggle = load_json::<bool>(self.store.as_ref(), &ScopeKey::show_all_servers(&self.user_id)).await;
        if matches!(toggle, Loaded::Purged) {
            purged += 1;
        }
        self.show_all = toggle.into_option().unwrap_or(false);
        self.rescope();
        purged += self.load_scope().await;
        self.metrics.add_entries_purged(purged);
        self.loaded = true;
        self.reconcile_current().await;
    }

    /// Hands a fetch result to the view.
    pub async fn apply_fetch(&mut self, key: &CacheKey, result: AppResult<PaginatedResult<Server>>) -> ApplyOutcome {
        if *key != self.cache_key() {
            debug!("Dropping superseded dashboard response for {:?}", key);
            return ApplyOutcome::Stale;
        }
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.flashes.clear_and_add_error(DASHBOARD_FLASH_KEY, &e);
                return ApplyOutcome::Failed;
            }
        };
        self.flashes.clear(DASHBOARD_FLASH_KEY);
        if page.pagination.current_page > 1 && page.items.is_empty() {
            debug!("Page {} of {} is empty, going back to page 1", self.page, self.user_id);
            self.page = 1;
            self.servers = None;
            return ApplyOutcome::PageReset;
        }
        self.servers = Some(page);
        self.reconcile_current().await;
        ApplyOutcome::Applied
    }

    /// Applies a drag move and persists the order.
    ///
    /// `source` and `destination` index the ungrouped `servers` list of the
    /// snapshot. Servers sitting in folders keep their place in the order.
    pub async fn reorder(&mut self, source: usize, destination: Option<usize>) -> AppResult<bool> {
        self.load().await;
        let ungrouped = self.ungrouped_positions();
        let Some(&from) = ungrouped.get(source) else {
            debug!("Drag source {} is outside the {} ungrouped servers", source, ungrouped.len());
            return Ok(false);
        };
        let to = match destination {
            Some(d) => match ungrouped.get(d) {
                Some(&to) => Some(to),
                None => return Ok(false),
            },
            None => None,
        };
        let moved = self.order.reorder(self.store.as_ref(), from, to).await?;
        if moved {
            self.metrics.inc_order_writes();
        }
        Ok(moved)
    }

    /// Persists the show-all toggle. Returns whether the view switched scope
    /// and therefore needs a new fetch.
    pub async fn set_show_all(&mut self, enabled: bool) -> AppResult<bool> {
        store_json(self.store.as_ref(), &ScopeKey::show_all_servers(&self.user_id), &enabled).await?;
        if !self.loaded {
            self.show_all = enabled;
            return Ok(false);
        }
        let before = self.role();
        self.show_all = enabled;
        if self.role() == before {
            return Ok(false);
        }
        self.rescope();
        self.servers = None;
        let purged = self.load_scope().await;
        self.metrics.add_entries_purged(purged);
        Ok(true)
    }

    pub async fn create_folder(&mut self, name: &str) -> AppResult<String> {
        self.load().await;
        let name = self.folders.create(name)?;
        self.persist_folders().await?;
        Ok(name)
    }

    pub async fn toggle_folder(&mut self, name: &str) -> AppResult<bool> {
        self.load().await;
        let collapsed = self.folders.toggle(name)?;
        self.persist_folders().await?;
        Ok(collapsed)
    }

    pub async fn move_to_folder(&mut self, uuid: &str, folder: &str) -> AppResult<()> {
        validation::validate_identifier(uuid, "uuid")?;
        self.load().await;
        self.folders.assign(uuid, folder)?;
        self.persist_folders().await
    }

    /// Fetched servers in the user's order. Empty until loaded.
    pub fn ordered_servers(&self) -> Vec<&Server> {
        if !self.loaded {
            return Vec::new();
        }
        let Some(page) = &self.servers else {
            return Vec::new();
        };
        let by_id: HashMap<&str, &Server> = page.items.iter().map(|s| (s.uuid.as_str(), s)).collect();
        self.order
            .order()
            .iter()
            .filter_map(|id| match by_id.get(id.as_str()) {
                Some(server) => Some(*server),
                None => {
                    debug!("Ordered id {} has no fetched server, skipping", id);
                    None
                }
            })
            .collect()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let ordered = self.ordered_servers();
        let folders = self
            .folders
            .folders()
            .iter()
            .map(|f| FolderGroup {
                name: f.name.clone(),
                collapsed: f.collapsed,
                servers: if f.collapsed {
                    Vec::new()
                } else {
                    ordered
                        .iter()
                        .filter(|s| self.folders.folder_of(&s.uuid) == Some(f.name.as_str()))
                        .map(|s| (*s).clone())
                        .collect()
                },
            })
            .collect();
        let servers = ordered
            .iter()
            .filter(|s| self.folders.folder_of(&s.uuid).is_none())
            .map(|s| (*s).clone())
            .collect();

        DashboardSnapshot {
            loading: !self.loaded || self.servers.is_none(),
            location: self.location(),
            page: self.page,
            pagination: self.servers.as_ref().map(|p| p.pagination),
            show_all: self.show_all,
            root_admin: self.root_admin,
            folders,
            servers,
            flash: self.flash().cloned(),
        }
    }

    /// Positions in the order of servers that are not in any folder.
    fn ungrouped_positions(&self) -> Vec<usize> {
        self.order
            .order()
            .iter()
            .enumerate()
            .filter(|(_, id)| self.folders.folder_of(id).is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn rescope(&mut self) {
        let role = self.role();
        self.order = OrderBook::new(ScopeKey::server_order(role, &self.user_id));
        self.folders_key = ScopeKey::server_folders(role, &self.user_id);
        self.folders = FolderSet::new();
    }

    /// Loads order and folders for the current role; returns the purge count.
    async fn load_scope(&mut self) -> u64 {
        let mut purged = 0;
        if self.order.load(self.store.as_ref()).await {
            purged += 1;
        }
        let folders = load_json::<FolderSet>(self.store.as_ref(), &self.folders_key).await;
        if matches!(folders, Loaded::Purged) {
            purged += 1;
        }
        self.folders = folders.into_option().unwrap_or_default();
        purged
    }

    async fn reconcile_current(&mut self) {
        let Some(page) = &self.servers else {
            return;
        };
        let ids: Vec<String> = page.items.iter().map(|s| s.uuid.clone()).collect();
        match self.order.reconcile(self.store.as_ref(), &ids).await {
            Ok(true) => {
                self.metrics.inc_orders_reconciled();
                self.metrics.inc_order_writes();
            }
            Ok(false) => {}
            Err(e) => warn!("Failed to persist reconciled order {}: {}", self.order.key(), e),
        }
    }

    async fn persist_folders(&self) -> AppResult<()> {
        store_json(self.store.as_ref(), &self.folders_key, &self.folders).await
    }
}
