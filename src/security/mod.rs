// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod validation;

pub use validation::{
    validate_and_sanitize_user_name, validate_email_field, validate_new_password,
    validate_page_url_field, MAX_EMAIL_CHARS, MAX_NAME_CHARS, MIN_PASSWORD_CHARS,
};

/// Constant-time byte comparison. Mismatched lengths return early, which is
/// fine for fixed-length tokens; the per-byte fold never short-circuits.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
