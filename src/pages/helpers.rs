// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::ServiceError;
use crate::companies::Company;
use crate::sessions::{SessionData, SESSION_COOKIE_NAME};
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use minijinja::Value;
use serde::{Deserialize, Serialize};

pub(super) const CSRF_ERROR_TEXT: &str = "Invalid request. Please refresh and try again.";
pub(super) const INFRASTRUCTURE_ERROR_TEXT: &str =
    "Something went wrong on our side. Please try again later.";

/// The one hidden field every state-changing form carries.
#[derive(Deserialize)]
pub(super) struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Serialize)]
struct CompanyOption {
    key: &'static str,
    display_name: &'static str,
}

/// Dropdown entries for the company pickers on welcome and reset pages.
pub(super) fn company_options() -> Value {
    let options: Vec<CompanyOption> = Company::all()
        .iter()
        .map(|company| CompanyOption {
            key: company.key(),
            display_name: company.display_name(),
        })
        .collect();
    Value::from_serialize(&options)
}

pub(super) fn render_page(state: &AppState, template: &str, ctx: Value) -> HttpResponse {
    match state.templates.render(template, ctx) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render {}: {}", template, err);
            HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body("Internal server error")
        }
    }
}

pub(super) fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

pub(super) fn session_cookie(session_id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, session_id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// Expired replacement cookie sent on logout and account deletion.
pub(super) fn logout_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .finish()
}

pub(super) fn presented_session_id(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Resolve the request's live session or send the caller to the login page.
pub(super) async fn require_session(
    req: &HttpRequest,
    state: &AppState,
) -> Result<(String, SessionData), HttpResponse> {
    let session_id = match presented_session_id(req) {
        Some(session_id) => session_id,
        None => return Err(redirect_to("/login")),
    };
    match state.sessions.read(&session_id).await {
        Ok(Some(data)) => Ok((session_id, data)),
        Ok(None) => Err(redirect_to("/login")),
        Err(err) => {
            log::error!("Session lookup failed: {}", err.message());
            Err(redirect_to("/login"))
        }
    }
}

/// Map a service error to the text a page may show. Infrastructure details
/// go to the log, never to the browser.
pub(super) fn user_error_text(err: &ServiceError) -> String {
    match err {
        ServiceError::Infrastructure(detail) => {
            log::error!("{}", detail);
            INFRASTRUCTURE_ERROR_TEXT.to_string()
        }
        other => other.to_string(),
    }
}
