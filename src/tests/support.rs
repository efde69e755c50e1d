//! Fixtures shared by the test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::fetch::PanelSource;
use crate::state::AppState;
use crate::storage::MemoryStore;
use crate::types::{FileObject, PaginatedResult, Pagination, Server, ServerQuery};

type Canned<T> = Result<T, String>;

/// In-memory upstream. Server pages set for a user win over pages set for
/// everyone. Unknown server pages come back empty, unknown directories as not
/// found.
#[derive(Default)]
pub struct MockSource {
    servers: Mutex<HashMap<(Option<String>, bool, u32), Canned<PaginatedResult<Server>>>>,
    directories: Mutex<HashMap<(String, String), Canned<Vec<FileObject>>>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn page(servers: Vec<Server>, page: u32) -> PaginatedResult<Server> {
        let count = servers.len() as u64;
        PaginatedResult {
            items: servers,
            pagination: Pagination { total: count, count, per_page: 50, current_page: page, total_pages: page },
        }
    }

    pub fn set_servers(&self, admin: bool, page: u32, servers: Vec<Server>) {
        self.servers.lock().unwrap().insert((None, admin, page), Ok(Self::page(servers, page)));
    }

    /// Servers only `user` sees on `page`.
    pub fn set_user_servers(&self, user: &str, admin: bool, page: u32, servers: Vec<Server>) {
        self.servers
            .lock()
            .unwrap()
            .insert((Some(user.to_string()), admin, page), Ok(Self::page(servers, page)));
    }

    pub fn fail_servers(&self, admin: bool, page: u32, message: &str) {
        self.servers.lock().unwrap().insert((None, admin, page), Err(message.to_string()));
    }

    pub fn set_directory(&self, server_id: &str, directory: &str, files: Vec<FileObject>) {
        self.directories.lock().unwrap().insert((server_id.to_string(), directory.to_string()), Ok(files));
    }

    pub fn fail_directory(&self, server_id: &str, directory: &str, message: &str) {
        self.directories
            .lock()
            .unwrap()
            .insert((server_id.to_string(), directory.to_string()), Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PanelSource for MockSource {
    async fn list_servers(&self, query: &ServerQuery) -> AppResult<PaginatedResult<Server>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let servers = self.servers.lock().unwrap();
        let canned = servers
            .get(&(Some(query.user.clone()), query.admin, query.page))
            .or_else(|| servers.get(&(None, query.admin, query.page)));
        match canned {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(msg)) => Err(AppError::Upstream(msg.clone())),
            None => Ok(PaginatedResult {
                items: Vec::new(),
                pagination: Pagination { current_page: query.page, ..Default::default() },
            }),
        }
    }

    async fn list_directory(&self, _user: &str, server_id: &str, directory: &str) -> AppResult<Vec<FileObject>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.directories.lock().unwrap().get(&(server_id.to_string(), directory.to_string())) {
            Some(Ok(files)) => Ok(files.clone()),
            Some(Err(msg)) => Err(AppError::Upstream(msg.clone())),
            None => Err(AppError::NotFound(format!("directory {} not found", directory))),
        }
    }
}

pub fn server(uuid: &str) -> Server {
    Server {
        uuid: uuid.to_string(),
        identifier: uuid.chars().take(8).collect(),
        name: format!("Server {}", uuid),
        description: None,
        folder: None,
    }
}

pub fn servers(uuids: &[&str]) -> Vec<Server> {
    uuids.iter().map(|u| server(u)).collect()
}

pub fn file(name: &str) -> FileObject {
    FileObject {
        key: format!("file_{}", name),
        name: name.to_string(),
        is_file: true,
        is_symlink: false,
        size: 1024,
        mimetype: "text/plain".to_string(),
        modified_at: None,
    }
}

pub fn dir(name: &str) -> FileObject {
    FileObject {
        key: format!("dir_{}", name),
        name: name.to_string(),
        is_file: false,
        is_symlink: false,
        size: 4096,
        mimetype: "inode/directory".to_string(),
        modified_at: None,
    }
}

pub fn names(files: &[FileObject]) -> Vec<&str> {
    files.iter().map(|f| f.name.as_str()).collect()
}

/// App state over an in-memory SQLite pool, a [`MemoryStore`] and `source`.
pub async fn test_state(source: Arc<MockSource>) -> (AppState, MemoryStore) {
    test_state_with(source, AppConfig::default()).await
}

pub async fn test_state_with(source: Arc<MockSource>, config: AppConfig) -> (AppState, MemoryStore) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    let store = MemoryStore::new();
    let state = AppState::new(pool, Arc::new(store.clone()), source, config);
    (state, store)
}
