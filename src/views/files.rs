//! File manager controller for one server.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use super::{hash_to_path, ApplyOutcome};
use crate::error::AppResult;
use crate::fetch::CacheKey;
use crate::flash::{Flash, Flashes};
use crate::listing::{build_listing, filter_by_name, Listing, ListingOptions, PageInfo};
use crate::metrics::Metrics;
use crate::types::FileObject;

pub const FILES_FLASH_KEY: &str = "files";

#[derive(Debug, Clone, Serialize)]
pub struct FileManagerSnapshot {
    pub server_id: String,
    pub directory: String,
    pub search: String,
    pub loading: bool,
    pub items: Vec<FileObject>,
    pub page: Option<PageInfo>,
    pub matched: usize,
    pub selected: Vec<String>,
    pub all_selected: bool,
    pub flash: Option<Flash>,
}

pub struct FileManagerView {
    user_id: String,
    server_id: String,
    directory: String,
    search: String,
    page: usize,
    options: ListingOptions,
    metrics: Metrics,
    files: Option<Vec<FileObject>>,
    selected: BTreeSet<String>,
    flashes: Flashes,
}

impl FileManagerView {
    pub fn new(user_id: impl Into<String>, server_id: impl Into<String>, options: ListingOptions, metrics: Metrics) -> Self {
        Self {
            user_id: user_id.into(),
            server_id: server_id.into(),
            directory: "/".to_string(),
            search: String::new(),
            page: 1,
            options,
            metrics,
            files: None,
            selected: BTreeSet::new(),
            flashes: Flashes::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flashes.get(FILES_FLASH_KEY)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::directory(&self.user_id, &self.server_id, &self.directory)
    }

    /// Follows a location hash. Returns whether the directory changed.
    pub fn navigate(&mut self, hash: &str) -> bool {
        let directory = hash_to_path(hash);
        if directory == self.directory {
            return false;
        }
        self.flashes.clear(FILES_FLASH_KEY);
        self.selected.clear();
        self.directory = directory;
        self.page = 1;
        self.files = None;
        true
    }

    /// Changes the filter term. Returns whether it changed, in which case the
    /// view is back on page 1 with nothing selected.
    pub fn set_search(&mut self, term: &str) -> bool {
        if term == self.search {
            return false;
        }
        self.search = term.to_string();
        self.page = 1;
        self.selected.clear();
        true
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn apply_fetch(&mut self, key: &CacheKey, result: AppResult<Vec<FileObject>>) -> ApplyOutcome {
        if *key != self.cache_key() {
            debug!("Dropping superseded listing for {:?}", key);
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(files) => {
                self.flashes.clear(FILES_FLASH_KEY);
                let names: HashSet<&str> = files.iter().map(|f| f.name.as_str()).collect();
                self.selected.retain(|n| names.contains(n.as_str()));
                self.files = Some(files);
                ApplyOutcome::Applied
            }
            Err(e) => {
                self.flashes.clear_and_add_error(FILES_FLASH_KEY, &e);
                ApplyOutcome::Failed
            }
        }
    }

    /// The current page of the listing, `None` until the directory arrived.
    pub fn listing(&self) -> Option<Listing<FileObject>> {
        let files = self.files.as_ref()?;
        self.metrics.inc_listings_built();
        Some(build_listing(files, &self.search, self.page, self.options))
    }

    /// Distinct names matching the current filter.
    pub fn filtered_names(&self) -> BTreeSet<String> {
        match &self.files {
            Some(files) => filter_by_name(files, &self.search, self.options.case_sensitive)
                .into_iter()
                .map(|f| f.name.clone())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Selects every filtered entry, or clears the selection.
    pub fn select_all(&mut self, select: bool) {
        self.selected = if select { self.filtered_names() } else { BTreeSet::new() };
    }

    /// Replaces the selection. Names not in the directory are ignored.
    pub fn set_selection<I: IntoIterator<Item = String>>(&mut self, names: I) {
        let Some(files) = &self.files else {
            self.selected.clear();
            return;
        };
        let known: HashSet<&str> = files.iter().map(|f| f.name.as_str()).collect();
        self.selected = names.into_iter().filter(|n| known.contains(n.as_str())).collect();
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn all_selected(&self) -> bool {
        let filtered = self.filtered_names();
        !filtered.is_empty() && filtered.is_subset(&self.selected) && self.selected.len() == filtered.len()
    }

    pub fn snapshot(&self) -> FileManagerSnapshot {
        let listing = self.listing();
        let (items, page, matched) = match listing {
            Some(l) => (l.items, Some(l.page), l.matched),
            None => (Vec::new(), None, 0),
        };
        FileManagerSnapshot {
            server_id: self.server_id.clone(),
            directory: self.directory.clone(),
            search: self.search.clone(),
            loading: self.files.is_none(),
            items,
            page,
            matched,
            selected: self.selected.iter().cloned().collect(),
            all_selected: self.all_selected(),
            flash: self.flash().cloned(),
        }
    }
}
