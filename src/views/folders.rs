use serde::{Deserialize, Serialize};

use crate::error::{validation, AppError, AppResult, OptionExt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
    /// Server uuids, in the order they were dropped in.
    #[serde(default)]
    pub servers: Vec<String>,
}

/// User-created folders. A server belongs to at most one folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderSet {
    folders: Vec<Folder>,
}

impl FolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn get(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    /// Adds an empty folder. Returns the trimmed name that was stored.
    pub fn create(&mut self, name: &str) -> AppResult<String> {
        let name = validation::validate_folder_name(name)?;
        if self.get(&name).is_some() {
            return Err(AppError::Conflict(format!("folder '{}' already exists", name)));
        }
        self.folders.push(Folder { name: name.clone(), collapsed: false, servers: Vec::new() });
        Ok(name)
    }

    /// Flips the collapsed flag and returns the new value.
    pub fn toggle(&mut self, name: &str) -> AppResult<bool> {
        let folder = self.folders.iter_mut().find(|f| f.name == name).ok_or_not_found("folder")?;
        folder.collapsed = !folder.collapsed;
        Ok(folder.collapsed)
    }

    /// Moves a server into `name`, taking it out of any other folder.
    pub fn assign(&mut self, uuid: &str, name: &str) -> AppResult<()> {
        if self.get(name).is_none() {
            return Err(AppError::NotFound(format!("folder '{}' not found", name)));
        }
        for folder in self.folders.iter_mut() {
            if folder.name == name {
                if !folder.servers.iter().any(|s| s == uuid) {
                    folder.servers.push(uuid.to_string());
                }
            } else {
                folder.servers.retain(|s| s != uuid);
            }
        }
        Ok(())
    }

    pub fn folder_of(&self, uuid: &str) -> Option<&str> {
        self.folders.iter().find(|f| f.servers.iter().any(|s| s == uuid)).map(|f| f.name.as_str())
    }
}
