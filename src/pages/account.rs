// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::EmployeeService;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;

use super::helpers::{
    logout_cookie, render_page, require_session, user_error_text, CsrfForm, CSRF_ERROR_TEXT,
};

// TODO: require the current password alongside the CSRF token before
// deleting; a hijacked session can currently erase the account on its own.
pub(super) async fn delete_account_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let (session_id, session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    // A session can outlive its account; render a dead end instead of a
    // delete button nothing backs.
    if let Ok(None) = service.find_by_id(session.user_id) {
        return Ok(render_page(
            &state,
            "delete_account.html",
            context! {
                error => "Your account could not be found.",
                fatal => true,
            },
        ));
    }

    let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
    Ok(render_page(
        &state,
        "delete_account.html",
        context! { csrf_token },
    ))
}

pub(super) async fn handle_delete_account(
    req: HttpRequest,
    form: web::Form<CsrfForm>,
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
            "delete_account.html",
            context! { error => CSRF_ERROR_TEXT, csrf_token },
        ));
    }

    // Account, feedback, and bug reports go in one atomic save; a failure
    // leaves all of them in place.
    if let Err(err) = service.delete_account(session.user_id) {
        let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
        return Ok(render_page(
            &state,
            "delete_account.html",
            context! { error => user_error_text(&err), csrf_token },
        ));
    }

    if let Err(err) = state.sessions.destroy(&session_id).await {
        log::error!(
            "Failed to destroy session after account deletion: {}",
            err.message()
        );
    }
    state.csrf_tokens.clear(&session_id);

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(logout_cookie())
        .finish())
}
