// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::types::{PortalData, StoreError};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(test)]
use std::sync::{Arc, RwLock};

/// Persistence boundary for the portal. One load returns the whole data set;
/// one save replaces it. The file implementation replaces the backing file
/// atomically, so a save either fully applies or leaves the previous state
/// untouched.
pub trait EmployeeStore: Send + Sync {
    fn load(&self) -> Result<PortalData, StoreError>;
    fn save(&self, data: &PortalData) -> Result<(), StoreError>;
}

pub struct FileEmployeeStore {
    data_file: PathBuf,
}

impl FileEmployeeStore {
    pub fn new(data_file: PathBuf) -> Result<Self, StoreError> {
        if data_file.as_os_str().is_empty() {
            return Err(StoreError::ConfigurationError(
                "Portal data file path is empty".to_string(),
            ));
        }
        Ok(Self { data_file })
    }

    fn read_data_file(&self) -> Result<String, StoreError> {
        std::fs::read_to_string(&self.data_file)
            .map_err(|e| StoreError::FileError(format!("Failed to read portal data file: {}", e)))
    }

    fn write_data_file(&self, content: &str) -> Result<(), StoreError> {
        let parent = self.data_file.parent().ok_or_else(|| {
            StoreError::FileError("Portal data file path has no parent directory".to_string())
        })?;
        let file_name = self.data_file.file_name().ok_or_else(|| {
            StoreError::FileError("Portal data file path has no file name".to_string())
        })?;
        let (mut file, temp_path) = create_temp_file(parent, file_name)?;

        if let Ok(metadata) = std::fs::metadata(&self.data_file) {
            #[cfg(unix)]
            {
                if let Err(err) = std::fs::set_permissions(&temp_path, metadata.permissions()) {
                    let _ = std::fs::remove_file(&temp_path);
                    return Err(StoreError::FileError(format!(
                        "Failed to set temp data file permissions: {}",
                        err
                    )));
                }
            }
        }

        if let Err(err) = file.write_all(content.as_bytes()) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to write portal temp file: {}",
                err
            )));
        }
        if let Err(err) = file.sync_all() {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to sync portal temp file: {}",
                err
            )));
        }

        if let Err(err) = std::fs::rename(&temp_path, &self.data_file) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to replace portal data file: {}",
                err
            )));
        }

        #[cfg(unix)]
        {
            if let Err(err) = sync_parent_dir(parent) {
                log::warn!("Portal data directory sync failed: {}", err);
            }
        }

        Ok(())
    }
}

fn create_temp_file(
    dir: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(std::fs::File, PathBuf), StoreError> {
    use std::fs::OpenOptions;
    const MAX_ATTEMPTS: u32 = 100;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::FileError(format!(
                    "Failed to create temp data file: {}",
                    err
                )));
            }
        }
    }
    Err(StoreError::FileError(
        "Failed to create temp data file after repeated attempts".to_string(),
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), StoreError> {
    let dir = std::fs::File::open(parent).map_err(|err| {
        StoreError::FileError(format!("Failed to open data directory for sync: {}", err))
    })?;
    dir.sync_all()
        .map_err(|err| StoreError::FileError(format!("Failed to sync data directory: {}", err)))
}

impl EmployeeStore for FileEmployeeStore {
    fn load(&self) -> Result<PortalData, StoreError> {
        if !self.data_file.exists() {
            return Ok(PortalData::new());
        }
        let content = self.read_data_file()?;
        serde_yaml::from_str(&content)
            .map_err(|e| StoreError::ParseError(format!("Failed to parse portal data: {}", e)))
    }

    fn save(&self, data: &PortalData) -> Result<(), StoreError> {
        let content = serde_yaml::to_string(data)
            .map_err(|e| StoreError::ParseError(format!("Failed to serialize portal data: {}", e)))?;
        self.write_data_file(&content)
    }
}

#[cfg(test)]
pub struct MemoryEmployeeStore {
    data: Arc<RwLock<PortalData>>,
}

#[cfg(test)]
impl MemoryEmployeeStore {
    pub fn new(initial: PortalData) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl EmployeeStore for MemoryEmployeeStore {
    fn load(&self) -> Result<PortalData, StoreError> {
        match self.data.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => {
                log::error!("MemoryEmployeeStore lock poisoned on read; recovering");
                Ok(poisoned.into_inner().clone())
            }
        }
    }

    fn save(&self, data: &PortalData) -> Result<(), StoreError> {
        match self.data.write() {
            Ok(mut guard) => {
                *guard = data.clone();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("MemoryEmployeeStore lock poisoned on write; recovering");
                let mut guard = poisoned.into_inner();
                *guard = data.clone();
                Ok(())
            }
        }
    }
}
