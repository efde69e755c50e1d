//! View controllers for the panel pages.
//!
//! - [`dashboard`]: ordered, folder-grouped server list
//! - [`files`]: filtered, sorted and paginated directory listing
//! - [`folders`]: persisted folder grouping used by the dashboard
//!
//! Views own no I/O loop. Callers feed them storage loads and fetch results and
//! read back serialisable snapshots.

pub mod dashboard;
pub mod files;
pub mod folders;

/// What happened to a fetch result handed to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The result belonged to a scope the view has since left.
    Stale,
    /// The fetch failed; a flash was recorded and previous data kept.
    Failed,
    /// The upstream page was empty past page 1; the view went back to page 1
    /// and needs a new fetch.
    PageReset,
}

/// Location to show for a page: `/` for the first page, `/?page=N` otherwise.
pub fn page_location(page: u32) -> String {
    if page <= 1 {
        "/".to_string()
    } else {
        format!("/?page={}", page)
    }
}

/// First value of `name` in a raw query string.
pub fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query
        .unwrap_or_default()
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Reads `page` from a raw query string. Missing, non-numeric or non-positive
/// values mean page 1.
pub fn parse_page(query: Option<&str>) -> u32 {
    query_param(query, "page")
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

/// Converts a location hash (`#/plugins/config`) into a directory path.
pub fn hash_to_path(hash: &str) -> String {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    let decoded = match urlencoding::decode(raw) {
        Ok(d) => d.into_owned(),
        Err(_) => raw.to_string(),
    };
    let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
