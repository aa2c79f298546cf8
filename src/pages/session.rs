// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::{EmployeeService, ServiceError};
use crate::security::validate_email_field;
use crate::sessions::SessionData;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;

use super::helpers::{
    logout_cookie, presented_session_id, redirect_to, render_page, require_session,
    session_cookie, user_error_text, CsrfForm, INFRASTRUCTURE_ERROR_TEXT,
};

const RESET_FLASH_TEXT: &str =
    "Your password has been reset. Please log in with your new password.";

#[derive(Deserialize)]
pub(super) struct LoginQuery {
    #[serde(default)]
    reset: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub(super) async fn login_form(
    req: HttpRequest,
    query: web::Query<LoginQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Already-authenticated visitors skip straight to the dashboard.
    if let Some(session_id) = presented_session_id(&req) {
        if let Ok(Some(_)) = state.sessions.read(&session_id).await {
            return Ok(redirect_to("/dashboard"));
        }
    }

    let message = query.reset.as_deref().map(|_| RESET_FLASH_TEXT);
    Ok(render_page(&state, "login.html", context! { message }))
}

pub(super) async fn handle_login(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let render_failure = |error: &str| {
        render_page(
            &state,
            "login.html",
            context! { error, email => form.email.trim() },
        )
    };

    // Malformed email shares the generic failure text; the form never
    // reveals which half of the credentials was wrong.
    if validate_email_field(&form.email).is_err() || form.password.is_empty() {
        return Ok(render_failure(&ServiceError::Authentication.to_string()));
    }

    let employee = match service.authenticate(form.email.trim(), &form.password) {
        Ok(Some(employee)) => employee,
        Ok(None) => {
            log::info!("Failed login attempt");
            return Ok(render_failure(&ServiceError::Authentication.to_string()));
        }
        Err(err) => return Ok(render_failure(&user_error_text(&err))),
    };

    // Whatever identifier the client arrived with dies here; a login always
    // starts a brand-new session.
    if let Some(presented) = presented_session_id(&req) {
        if let Err(err) = state.sessions.destroy(&presented).await {
            log::error!("Failed to destroy presented session: {}", err.message());
        }
        state.csrf_tokens.clear(&presented);
    }

    let data = SessionData {
        user_id: employee.id,
        name: employee.name.clone(),
        email: employee.email.clone(),
        company: employee.company,
        role: employee.role.clone(),
    };
    match state.sessions.create(data).await {
        Ok(session_id) => {
            log::info!("Employee {} logged in", employee.id);
            Ok(HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/dashboard"))
                .cookie(session_cookie(&session_id))
                .finish())
        }
        Err(err) => {
            log::error!("Failed to create session: {}", err.message());
            Ok(render_failure(INFRASTRUCTURE_ERROR_TEXT))
        }
    }
}

pub(super) async fn handle_logout(
    req: HttpRequest,
    form: web::Form<CsrfForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (session_id, _session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    // A stale token logs nobody out; the dashboard re-renders with the
    // current one.
    if !state.csrf_tokens.validate(&session_id, &form.csrf_token) {
        return Ok(redirect_to("/dashboard"));
    }

    if let Err(err) = state.sessions.destroy(&session_id).await {
        log::error!("Failed to destroy session on logout: {}", err.message());
    }
    state.csrf_tokens.clear(&session_id);

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/login"))
        .cookie(logout_cookie())
        .finish())
}
