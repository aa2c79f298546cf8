// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use validator::ValidateEmail;

pub const MAX_EMAIL_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 256;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 512;
pub const MAX_URL_CHARS: usize = 2048;

/// Validate user email input
pub fn validate_email_field(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_CHARS
        ));
    }
    if !trimmed.validate_email() {
        return Err("Email format is invalid".to_string());
    }
    Ok(())
}

/// Policy check for new passwords (registration, change, reset).
pub fn validate_new_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_CHARS
        ));
    }
    if password.chars().count() > MAX_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at most {} characters",
            MAX_PASSWORD_CHARS
        ));
    }
    Ok(())
}

/// Optional page URL on bug reports. Empty is fine; anything else must be an
/// absolute http(s) URL.
pub fn validate_page_url_field(url: &str) -> Result<(), String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.chars().count() > MAX_URL_CHARS {
        return Err(format!("URL must be at most {} characters", MAX_URL_CHARS));
    }
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => Err("The provided URL is not valid".to_string()),
    }
}

/// Validate and sanitize user names for display safety
/// Allows letters, numbers, spaces, apostrophes, hyphens, and periods
/// Replaces invalid characters with spaces and collapses multiple spaces
pub fn validate_and_sanitize_user_name(name: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    let sanitized = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '\'' || c == '-' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>();

    let sanitized = sanitized
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    let sanitized_len = sanitized.chars().count();
    if !(2..=MAX_NAME_CHARS).contains(&sanitized_len) {
        return Err(format!(
            "Name must be between 2 and {} characters",
            MAX_NAME_CHARS
        ));
    }

    Ok(sanitized)
}
