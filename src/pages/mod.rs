// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::config::MAX_REQUEST_PAYLOAD_BYTES;
use actix_web::web;

mod account;
mod dashboard;
mod feedback;
mod helpers;
mod password;
mod profile;
mod register;
mod session;
mod welcome;

pub use profile::CSRF_HEADER_NAME;

/// Wire up every portal page. Handlers that mutate state validate the
/// session's CSRF token first; login, registration, and reset stage 1
/// predate any session and are exempt.
pub fn configure_pages(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_REQUEST_PAYLOAD_BYTES))
        .route("/", web::get().to(welcome::welcome_page))
        .route("/register", web::get().to(register::register_form))
        .route("/register", web::post().to(register::handle_register))
        .route("/login", web::get().to(session::login_form))
        .route("/login", web::post().to(session::handle_login))
        .route("/logout", web::post().to(session::handle_logout))
        .route("/dashboard", web::get().to(dashboard::dashboard_page))
        .route(
            "/change-password",
            web::get().to(password::change_password_form),
        )
        .route(
            "/change-password",
            web::post().to(password::handle_change_password),
        )
        .route(
            "/reset-password",
            web::get().to(password::reset_password_form),
        )
        .route(
            "/reset-password",
            web::post().to(password::handle_reset_password),
        )
        .route("/profile", web::get().to(profile::profile_page))
        .route("/profile/photo", web::post().to(profile::handle_photo_upload))
        .route("/feedback", web::get().to(feedback::feedback_form))
        .route("/feedback", web::post().to(feedback::handle_feedback))
        .route("/report-bug", web::get().to(feedback::report_bug_form))
        .route("/report-bug", web::post().to(feedback::handle_report_bug))
        .route(
            "/delete-account",
            web::get().to(account::delete_account_form),
        )
        .route(
            "/delete-account",
            web::post().to(account::handle_delete_account),
        );
}
