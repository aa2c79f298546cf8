// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::companies::Company;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One registered employee. Records are keyed in [`PortalData::employees`]
/// by the lowercased email; `email` keeps the casing the user registered
/// with for display.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Employee {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub company: Company,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackEntry {
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BugReport {
    pub reporter_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    pub description: String,
    pub status: String,
    pub reported_at: DateTime<Utc>,
}

pub const BUG_STATUS_NEW: &str = "New";

/// The whole persisted state of the portal, written as one YAML document.
/// BTreeMap keeps the serialized form stable across saves.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PortalData {
    #[serde(default)]
    pub employees: BTreeMap<String, Employee>,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
    #[serde(default)]
    pub bug_reports: Vec<BugReport>,
    #[serde(default = "default_next_employee_id")]
    pub next_employee_id: u64,
}

fn default_next_employee_id() -> u64 {
    1
}

impl PortalData {
    pub fn new() -> Self {
        Self {
            employees: BTreeMap::new(),
            feedback: Vec::new(),
            bug_reports: Vec::new(),
            next_employee_id: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreError {
    ConfigurationError(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            StoreError::FileError(msg) => write!(f, "File error: {}", msg),
            StoreError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
