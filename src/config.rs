// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DATA_FILE_NAME: &str = "portal.yaml";
pub const UPLOAD_DIR_NAME: &str = "uploads/profile_pics";

/// Hard ceiling on request bodies; `upload.max_photo_bytes` must fit under
/// it or the photo handler could never see the oversized payload.
pub const MAX_REQUEST_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug)]
pub enum ConfigError {
    FileError(String),
    ParseError(String),
    ValidationError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileError(msg) => write!(f, "File error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Idle timeout; reading a session pushes its expiry out by this much.
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Argon2Params {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub password: Argon2Params,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Load `config.yaml` from the runtime root, writing a default file on
    /// first run so a fresh checkout starts with its configuration visible.
    pub fn load_or_create(runtime_root: &Path) -> Result<(AppConfig, bool), ConfigError> {
        let config_path = runtime_root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            let config = AppConfig::default();
            let content = serde_yaml::to_string(&config).map_err(|err| {
                ConfigError::ParseError(format!("Failed to serialize default config: {}", err))
            })?;
            std::fs::write(&config_path, content).map_err(|err| {
                ConfigError::FileError(format!(
                    "Failed to write {}: {}",
                    config_path.display(),
                    err
                ))
            })?;
            config.validate()?;
            return Ok((config, true));
        }

        let content = std::fs::read_to_string(&config_path).map_err(|err| {
            ConfigError::FileError(format!("Failed to read {}: {}", config_path.display(), err))
        })?;
        let config: AppConfig = serde_yaml::from_str(&content).map_err(|err| {
            ConfigError::ParseError(format!(
                "Failed to parse {}: {}",
                config_path.display(),
                err
            ))
        })?;
        config.validate()?;
        Ok((config, false))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host must not be empty".to_string(),
            ));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }
        if self.session.ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "session.ttl_seconds must be at least 1".to_string(),
            ));
        }
        if self.password.memory_kib < 8 {
            return Err(ConfigError::ValidationError(
                "password.memory_kib must be at least 8".to_string(),
            ));
        }
        if self.password.iterations == 0 || self.password.parallelism == 0 {
            return Err(ConfigError::ValidationError(
                "password.iterations and password.parallelism must be at least 1".to_string(),
            ));
        }
        if self.upload.max_photo_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "upload.max_photo_bytes must be at least 1".to_string(),
            ));
        }
        if self.upload.max_photo_bytes > MAX_REQUEST_PAYLOAD_BYTES {
            return Err(ConfigError::ValidationError(format!(
                "upload.max_photo_bytes must be at most {}",
                MAX_REQUEST_PAYLOAD_BYTES
            )));
        }
        Ok(())
    }

    pub fn data_file(runtime_root: &Path) -> PathBuf {
        runtime_root.join(DATA_FILE_NAME)
    }

    pub fn upload_dir(runtime_root: &Path) -> PathBuf {
        runtime_root.join(UPLOAD_DIR_NAME)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    2
}

fn default_session_ttl() -> u64 {
    1800
}

fn default_memory_kib() -> u32 {
    65536
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    1
}

fn default_max_photo_bytes() -> usize {
    2 * 1024 * 1024
}
