//! User-defined item ordering that survives refetches and restarts.
//!
//! The pure half ([`reconcile`], [`reorder`]) never touches storage. [`OrderBook`]
//! owns one persisted order under one [`ScopeKey`] and gates reconciliation on
//! the persisted value having been loaded.

use std::collections::HashSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;
use crate::storage::KeyValueStore;

pub type OrderList = Vec<String>;

/// Which collection a dashboard is showing; part of every dashboard scope key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The caller's own servers.
    User,
    /// Other users' servers, only reachable by root admins.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Storage key for one persisted piece of view state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn server_order(role: Role, user_id: &str) -> Self {
        ScopeKey(format!("{}:serversOrder:{}", role, user_id))
    }

    pub fn server_folders(role: Role, user_id: &str) -> Self {
        ScopeKey(format!("{}:serversFolders:{}", role, user_id))
    }

    pub fn show_all_servers(user_id: &str) -> Self {
        ScopeKey(format!("{}:show_all_servers", user_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Merges a persisted order with a freshly fetched id sequence.
///
/// Known ids keep their relative order, ids that were not fetched are dropped
/// and new ids are appended in fetched order. An empty `current` adopts
/// `fetched` (duplicate ids collapse to their first occurrence).
pub fn reconcile(current: &[String], fetched: &[String]) -> OrderList {
    let fetched_set: HashSet<&str> = fetched.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(fetched.len());
    let mut next = Vec::with_capacity(fetched.len());

    for id in current {
        if fetched_set.contains(id.as_str()) && seen.insert(id.as_str()) {
            next.push(id.clone());
        }
    }
    for id in fetched {
        if seen.insert(id.as_str()) {
            next.push(id.clone());
        }
    }
    next
}

/// Moves the id at `source` to `destination`.
///
/// A missing destination (drag dropped outside any target) or an index outside
/// the list leaves the order untouched.
pub fn reorder(order: &[String], source: usize, destination: Option<usize>) -> OrderList {
    let Some(destination) = destination else {
        return order.to_vec();
    };
    if source >= order.len() || destination >= order.len() || source == destination {
        return order.to_vec();
    }
    let mut next = order.to_vec();
    let moved = next.remove(source);
    next.insert(destination, moved);
    next
}

/// Result of reading one persisted JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Missing,
    Value(T),
    /// The stored value did not parse and the entry was deleted.
    Purged,
}

impl<T> Loaded<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Loaded::Value(v) => Some(v),
            Loaded::Missing | Loaded::Purged => None,
        }
    }
}

/// Reads and parses the JSON value under `key`.
///
/// Never fails: a failed read counts as missing, an unparsable value is purged
/// from the store. Both are logged, neither reaches the user.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &ScopeKey) -> Loaded<T> {
    let raw = match store.read(key.as_str()).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::Missing,
        Err(e) => {
            tracing::warn!("Failed to read persisted entry {}: {}", key, e);
            return Loaded::Missing;
        }
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Loaded::Value(value),
        Err(e) => {
            tracing::warn!("Discarding malformed persisted entry {}: {}", key, e);
            if let Err(e) = store.remove(key.as_str()).await {
                tracing::warn!("Failed to purge malformed entry {}: {}", key, e);
            }
            Loaded::Purged
        }
    }
}

/// Serialises `value` and writes it under `key`.
pub async fn store_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &ScopeKey,
    value: &T,
) -> AppResult<()> {
    let raw = serde_json::to_string(value)?;
    store.write(key.as_str(), &raw).await
}

/// One persisted order and its load state.
#[derive(Debug, Clone)]
pub struct OrderBook {
    key: ScopeKey,
    order: OrderList,
    loaded: bool,
}

impl OrderBook {
    pub fn new(key: ScopeKey) -> Self {
        Self { key, order: Vec::new(), loaded: false }
    }

    pub fn key(&self) -> &ScopeKey {
        &self.key
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads the persisted order once. Later calls are no-ops.
    ///
    /// Returns whether a malformed entry had to be purged.
    pub async fn load(&mut self, store: &dyn KeyValueStore) -> bool {
        if self.loaded {
            return false;
        }
        let loaded = load_json::<OrderList>(store, &self.key).await;
        let purged = matches!(loaded, Loaded::Purged);
        self.order = loaded.into_option().unwrap_or_default();
        self.loaded = true;
        purged
    }

    /// Reconciles against `fetched` and persists when the order changed.
    ///
    /// Returns `Ok(true)` if a new order was stored. Does nothing before
    /// [`OrderBook::load`] completed.
    pub async fn reconcile(&mut self, store: &dyn KeyValueStore, fetched: &[String]) -> AppResult<bool> {
        if !self.loaded {
            tracing::debug!("Skipping reconcile for {}: order not loaded yet", self.key);
            return Ok(false);
        }
        let next = reconcile(&self.order, fetched);
        if next == self.order {
            return Ok(false);
        }
        self.order = next;
        store_json(store, &self.key, &self.order).await?;
        Ok(true)
    }

    /// Applies a drag move and persists it immediately.
    ///
    /// Returns `Ok(false)` when the move was a no-op.
    pub async fn reorder(
        &mut self,
        store: &dyn KeyValueStore,
        source: usize,
        destination: Option<usize>,
    ) -> AppResult<bool> {
        let next = reorder(&self.order, source, destination);
        if next == self.order {
            return Ok(false);
        }
        self.order = next;
        store_json(store, &self.key, &self.order).await?;
        Ok(true)
    }
}
