//! Directory listing pipeline: filter → sort → dedup → paginate.
//!
//! Every stage borrows the fetched entries and returns a new sequence, so the
//! same input always renders the same page and the fetched data is never
//! reordered in place.

use std::cmp::Ordering;

use serde::Serialize;

use crate::types::FileObject;

/// Entries per rendered page.
pub const FILES_PER_PAGE: usize = 250;

/// Anything the pipeline can list.
pub trait Listable {
    fn name(&self) -> &str;
    fn is_container(&self) -> bool;
}

impl Listable for FileObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_container(&self) -> bool {
        !self.is_file
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub page_size: usize,
    pub case_sensitive: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self { page_size: FILES_PER_PAGE, case_sensitive: true }
    }
}

impl From<&crate::config::ListingConfig> for ListingOptions {
    fn from(cfg: &crate::config::ListingConfig) -> Self {
        Self { page_size: cfg.page_size.max(1), case_sensitive: cfg.case_sensitive }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
}

/// One rendered page plus the counts the view needs around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub page: PageInfo,
    /// Entries matching the filter, before deduplication.
    pub matched: usize,
}

pub fn filter_by_name<'a, T: Listable>(items: &'a [T], term: &str, case_sensitive: bool) -> Vec<&'a T> {
    if term.is_empty() {
        return items.iter().collect();
    }
    if case_sensitive {
        items.iter().filter(|i| i.name().contains(term)).collect()
    } else {
        let needle = term.to_lowercase();
        items.iter().filter(|i| i.name().to_lowercase().contains(&needle)).collect()
    }
}

/// Numeric-aware, case-insensitive name comparison ("file2" < "file10").
///
/// Only case is folded. Accented letters stay distinct and order by code
/// point, so "étoile" sorts after "zebra".
pub fn compare_names(a: &str, b: &str) -> Ordering {
    alphanumeric_sort::compare_str(a.to_lowercase(), b.to_lowercase())
}

/// Stable sort: directories first, then by name within each group.
pub fn sort_entries<T: Listable>(items: &mut [&T]) {
    items.sort_by(|a, b| {
        b.is_container().cmp(&a.is_container()).then_with(|| compare_names(a.name(), b.name()))
    });
}

/// Drops an entry whose name equals the one right before it.
pub fn dedup_adjacent<'a, T: Listable>(items: Vec<&'a T>) -> Vec<&'a T> {
    let mut out: Vec<&'a T> = Vec::with_capacity(items.len());
    for item in items {
        if out.last().is_some_and(|prev| prev.name() == item.name()) {
            continue;
        }
        out.push(item);
    }
    out
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if count == 0 || page_size == 0 {
        0
    } else {
        count.div_ceil(page_size)
    }
}

/// Clamps a 1-indexed page into `[1, total_pages]` (page 1 when there are none).
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

pub fn paginate<T: Clone>(items: &[&T], requested_page: usize, page_size: usize) -> (Vec<T>, PageInfo) {
    let page_size = page_size.max(1);
    let total = total_pages(items.len(), page_size);
    let current = clamp_page(requested_page, total);
    let start = (current - 1) * page_size;
    let page = items.iter().skip(start).take(page_size).map(|i| (*i).clone()).collect();
    (
        page,
        PageInfo { current_page: current, total_pages: total, page_size, total_items: items.len() },
    )
}

/// Runs the whole pipeline over `items`.
pub fn build_listing<T: Listable + Clone>(
    items: &[T],
    term: &str,
    requested_page: usize,
    options: ListingOptions,
) -> Listing<T> {
    let mut filtered = filter_by_name(items, term, options.case_sensitive);
    let matched = filtered.len();
    sort_entries(&mut filtered);
    let unique = dedup_adjacent(filtered);
    let (page_items, page) = paginate(&unique, requested_page, options.page_size);
    Listing { items: page_items, page, matched }
}
