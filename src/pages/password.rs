// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::{EmployeeService, PendingReset, ServiceError, RESET_TOKEN_TTL_SECONDS};
use crate::companies::Company;
use crate::security::{validate_email_field, validate_new_password};
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;
use std::time::Duration;

use super::helpers::{
    company_options, redirect_to, render_page, require_session, user_error_text,
    CSRF_ERROR_TEXT, INFRASTRUCTURE_ERROR_TEXT,
};

const PASSWORD_MISMATCH_TEXT: &str = "New passwords do not match.";
const RESET_EXPIRED_TEXT: &str =
    "Your reset request has expired. Please verify your identity again.";

#[derive(Deserialize)]
pub(super) struct ChangePasswordForm {
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    confirm_password: String,
}

#[derive(Deserialize)]
pub(super) struct ResetPasswordForm {
    #[serde(default)]
    action: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    reset_token: String,
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    confirm_password: String,
}

pub(super) async fn change_password_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (session_id, _session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
    Ok(render_page(
        &state,
        "change_password.html",
        context! { csrf_token },
    ))
}

pub(super) async fn handle_change_password(
    req: HttpRequest,
    form: web::Form<ChangePasswordForm>,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let (session_id, session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    if !state.csrf_tokens.validate(&session_id, &form.csrf_token) {
        let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
        return Ok(render_page(
            &state,
            "change_password.html",
            context! { error => CSRF_ERROR_TEXT, csrf_token },
        ));
    }

    let render_error = |error: String| {
        let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
        render_page(
            &state,
            "change_password.html",
            context! { error, csrf_token },
        )
    };

    if form.new_password != form.confirm_password {
        return Ok(render_error(PASSWORD_MISMATCH_TEXT.to_string()));
    }
    if let Err(message) = validate_new_password(&form.new_password) {
        return Ok(render_error(message));
    }

    match service.change_password(session.user_id, &form.current_password, &form.new_password) {
        Ok(()) => {
            let csrf_token = state.csrf_tokens.rotate(&session_id);
            Ok(render_page(
                &state,
                "change_password.html",
                context! { success => "Password changed successfully.", csrf_token },
            ))
        }
        Err(err) => Ok(render_error(user_error_text(&err))),
    }
}

pub(super) async fn reset_password_form(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(render_page(
        &state,
        "reset_password.html",
        context! { companies => company_options() },
    ))
}

/// Both reset stages post to this route; the hidden `action` field picks
/// the stage. Stage 1 never runs under a session and is CSRF-exempt; stage
/// 2 is bound by the one-time reset token instead.
pub(super) async fn handle_reset_password(
    form: web::Form<ResetPasswordForm>,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    match form.action.as_str() {
        "verify" => handle_verify_stage(&form, &state, &service).await,
        "reset" => handle_reset_stage(&form, &state, &service).await,
        _ => Ok(redirect_to("/reset-password")),
    }
}

async fn handle_verify_stage(
    form: &ResetPasswordForm,
    state: &AppState,
    service: &EmployeeService,
) -> Result<HttpResponse> {
    let render_error = |error: String| {
        render_page(
            state,
            "reset_password.html",
            context! {
                error,
                email => form.email.trim(),
                company_key => form.company.as_str(),
                companies => company_options(),
            },
        )
    };

    if let Err(message) = validate_email_field(&form.email) {
        return Ok(render_error(message));
    }
    let company = match Company::from_key(&form.company) {
        Some(company) => company,
        None => return Ok(render_error("Please select your company.".to_string())),
    };

    let employee = match service.verify_identity(form.email.trim(), company) {
        Ok(Some(employee)) => employee,
        // Zero matches and ambiguity share one generic message.
        Ok(None) => {
            return Ok(render_error(ServiceError::IdentityNotVerified.to_string()));
        }
        Err(err) => return Ok(render_error(user_error_text(&err))),
    };

    let token = match state
        .reset_tokens
        .issue(
            employee.id,
            &employee.email,
            employee.company,
            Duration::from_secs(RESET_TOKEN_TTL_SECONDS),
        )
        .await
    {
        Ok(token) => token,
        Err(err) => {
            log::error!("Failed to issue reset token: {}", err.message());
            return Ok(render_error(INFRASTRUCTURE_ERROR_TEXT.to_string()));
        }
    };

    log::info!("Password reset identity verified for employee {}", employee.id);
    Ok(render_page(
        state,
        "reset_password.html",
        context! {
            message => "Identity verified. Please set your new password.",
            show_password_fields => true,
            reset_token => token.as_str(),
        },
    ))
}

async fn handle_reset_stage(
    form: &ResetPasswordForm,
    state: &AppState,
    service: &EmployeeService,
) -> Result<HttpResponse> {
    let pending: PendingReset = match state.reset_tokens.get(&form.reset_token).await {
        Ok(Some(pending)) => pending,
        Ok(None) => {
            return Ok(render_page(
                state,
                "reset_password.html",
                context! {
                    error => RESET_EXPIRED_TEXT,
                    companies => company_options(),
                },
            ));
        }
        Err(err) => {
            log::error!("Reset token lookup failed: {}", err.message());
            return Ok(render_page(
                state,
                "reset_password.html",
                context! {
                    error => INFRASTRUCTURE_ERROR_TEXT,
                    companies => company_options(),
                },
            ));
        }
    };

    // Validation failures keep the token live so the form can be corrected.
    let render_error = |error: String| {
        render_page(
            state,
            "reset_password.html",
            context! {
                error,
                show_password_fields => true,
                reset_token => form.reset_token.as_str(),
            },
        )
    };

    if form.new_password != form.confirm_password {
        return Ok(render_error(PASSWORD_MISMATCH_TEXT.to_string()));
    }
    if let Err(message) = validate_new_password(&form.new_password) {
        return Ok(render_error(message));
    }

    if let Err(err) = service.reset_password(pending.user_id, &form.new_password) {
        return Ok(render_error(user_error_text(&err)));
    }

    // One-time: a completed reset burns the token.
    if let Err(err) = state.reset_tokens.invalidate(&form.reset_token).await {
        log::error!("Failed to invalidate reset token: {}", err.message());
    }
    log::info!("Password reset completed for employee {}", pending.user_id);
    Ok(redirect_to("/login?reset=1"))
}
