use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ---------------------- DOMAIN ITEMS ----------------------

/// A server shown on the dashboard. `uuid` is the stable ordering identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub uuid: String,
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    pub folder: Option<String>,
}

/// A file or directory entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    /// Render key, unique per kind and name (`file_<name>` / `dir_<name>`).
    pub key: String,
    pub name: String,
    pub is_file: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub mimetype: String,
    pub modified_at: Option<String>,
}

impl FileObject {
    pub fn is_container(&self) -> bool {
        !self.is_file
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub count: u64,
    pub per_page: u64,
    pub current_page: u32,
    pub total_pages: u32,
}

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Query parameters for the server collection, made on behalf of `user`.
/// `admin` lists other users' servers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerQuery {
    pub user: String,
    pub page: u32,
    pub admin: bool,
}

// ---------------------- UPSTREAM WIRE FORMAT ----------------------

/// `{ "data": [ { "attributes": … } ], "meta": { "pagination": … } }`
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<Attributed<T>>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attributed<T> {
    pub attributes: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListMeta {
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServer {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFileObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_file: Option<bool>,
    #[serde(default)]
    pub is_symlink: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl TryFrom<RawServer> for Server {
    type Error = AppError;

    fn try_from(raw: RawServer) -> Result<Self, Self::Error> {
        let uuid = raw
            .uuid
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("server record without uuid".to_string()))?;
        let name = raw
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Upstream(format!("server {} has no name", uuid)))?;
        let identifier = raw.identifier.unwrap_or_else(|| uuid.chars().take(8).collect());
        Ok(Server {
            uuid,
            identifier,
            name,
            description: raw.description,
            folder: raw.folder.filter(|f| !f.trim().is_empty()),
        })
    }
}

impl TryFrom<RawFileObject> for FileObject {
    type Error = AppError;

    fn try_from(raw: RawFileObject) -> Result<Self, Self::Error> {
        let name = raw
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Upstream("file record without name".to_string()))?;
        let is_file = raw
            .is_file
            .ok_or_else(|| AppError::Upstream(format!("file record {} has no type", name)))?;
        Ok(FileObject {
            key: format!("{}_{}", if is_file { "file" } else { "dir" }, name),
            name,
            is_file,
            is_symlink: raw.is_symlink,
            size: raw.size,
            mimetype: raw.mimetype,
            modified_at: raw.modified_at,
        })
    }
}

impl<T> ListEnvelope<T> {
    /// Validates every record and returns the typed page.
    ///
    /// Upstreams that omit `meta` get a single synthetic page.
    pub fn into_page<U>(self) -> Result<PaginatedResult<U>, AppError>
    where
        U: TryFrom<T, Error = AppError>,
    {
        let items = self
            .data
            .into_iter()
            .map(|a| U::try_from(a.attributes))
            .collect::<Result<Vec<U>, AppError>>()?;
        let pagination = match self.meta {
            Some(meta) => meta.pagination,
            None => Pagination {
                total: items.len() as u64,
                count: items.len() as u64,
                per_page: items.len() as u64,
                current_page: 1,
                total_pages: 1,
            },
        };
        Ok(PaginatedResult { items, pagination })
    }
}

// ---------------------- HTTP REQUEST BODIES ----------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub source_index: usize,
    /// Absent when the drag ended outside a valid drop target.
    #[serde(default)]
    pub destination_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowAllRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveToFolderRequest {
    pub uuid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub select_all: Option<bool>,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}
