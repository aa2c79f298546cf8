// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod app_state;
pub mod auth;
pub mod companies;
pub mod config;
pub mod csrf;
pub mod pages;
pub mod security;
pub mod sessions;
pub mod templates;
