// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

pub const MAX_ROLE_CHARS: usize = 64;

/// Companies whose employees may register. The wire key ("Company A" and
/// friends) is what registration forms submit and what the store persists;
/// the display name is what pages render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Company {
    #[serde(rename = "Company A")]
    CompanyA,
    #[serde(rename = "Company B")]
    CompanyB,
    #[serde(rename = "Company C")]
    CompanyC,
}

impl Company {
    pub fn all() -> [Company; 3] {
        [Company::CompanyA, Company::CompanyB, Company::CompanyC]
    }

    pub fn from_key(key: &str) -> Option<Company> {
        match key.trim() {
            "Company A" => Some(Company::CompanyA),
            "Company B" => Some(Company::CompanyB),
            "Company C" => Some(Company::CompanyC),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Company::CompanyA => "Company A",
            Company::CompanyB => "Company B",
            Company::CompanyC => "Company C",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Company::CompanyA => "Accenture",
            Company::CompanyB => "Zoho",
            Company::CompanyC => "Capgemini",
        }
    }

    /// Email endings accepted for this company, lowercase.
    pub fn email_domains(&self) -> &'static [&'static str] {
        match self {
            Company::CompanyA => &["@accenture.com"],
            Company::CompanyB => &["@zoho.com", "@zohocorp.com"],
            Company::CompanyC => &["@capgemini.com"],
        }
    }

    pub fn matches_email(&self, email: &str) -> bool {
        let lowered = email.trim().to_lowercase();
        self.email_domains()
            .iter()
            .any(|domain| lowered.ends_with(domain))
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug)]
pub struct RoleValidationError {
    message: String,
}

impl RoleValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RoleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RoleValidationError {}

/// Roles are free-form display strings picked on the welcome page. Keep them
/// bounded and printable; they end up in session state and rendered pages.
pub fn normalize_role(role: &str) -> Result<String, RoleValidationError> {
    let trimmed = role.trim();
    if trimmed.is_empty() {
        return Err(RoleValidationError::new("Role is required"));
    }
    if trimmed.chars().count() > MAX_ROLE_CHARS {
        return Err(RoleValidationError::new(format!(
            "Role must be at most {} characters",
            MAX_ROLE_CHARS
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '/')
    {
        return Err(RoleValidationError::new(format!(
            "Role '{}' contains invalid characters",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}
