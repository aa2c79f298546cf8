// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::ResetTokenStore;
use crate::config::AppConfig;
use crate::csrf::CsrfTokenStore;
use crate::sessions::SessionStore;
use crate::templates::{MiniJinjaEngine, TemplateEngine};

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub sessions: SessionStore,
    pub csrf_tokens: CsrfTokenStore,
    pub reset_tokens: ResetTokenStore,
    pub upload_dir: PathBuf,
    pub max_photo_bytes: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, upload_dir: PathBuf) -> Self {
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            sessions: SessionStore::new(Duration::from_secs(config.session.ttl_seconds)),
            csrf_tokens: CsrfTokenStore::new(),
            reset_tokens: ResetTokenStore::new(),
            upload_dir,
            max_photo_bytes: config.upload.max_photo_bytes,
        }
    }
}
