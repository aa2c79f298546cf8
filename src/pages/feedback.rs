// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::EmployeeService;
use crate::security::validate_page_url_field;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;

use super::helpers::{render_page, require_session, user_error_text, CSRF_ERROR_TEXT};

#[derive(Deserialize)]
pub(super) struct FeedbackForm {
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    feedback: String,
}

#[derive(Deserialize)]
pub(super) struct BugReportForm {
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    page_url: String,
    #[serde(default)]
    description: String,
}

pub(super) async fn feedback_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (session_id, session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
    Ok(render_page(
        &state,
        "feedback.html",
        context! {
            name => session.name,
            email => session.email,
            csrf_token,
        },
    ))
}

pub(super) async fn handle_feedback(
    req: HttpRequest,
    form: web::Form<FeedbackForm>,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let (session_id, session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    let render_error = |error: String, feedback: &str| {
        let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
        render_page(
            &state,
            "feedback.html",
            context! {
                error,
                name => session.name.as_str(),
                email => session.email.as_str(),
                feedback,
                csrf_token,
            },
        )
    };

    if !state.csrf_tokens.validate(&session_id, &form.csrf_token) {
        return Ok(render_error(CSRF_ERROR_TEXT.to_string(), form.feedback.trim()));
    }

    let message = form.feedback.trim();
    if message.is_empty() {
        return Ok(render_error("Feedback cannot be empty.".to_string(), ""));
    }

    // Name and email come from the session, never from the form.
    match service.record_feedback(&session.name, &session.email, message) {
        Ok(()) => {
            let csrf_token = state.csrf_tokens.rotate(&session_id);
            Ok(render_page(
                &state,
                "feedback.html",
                context! {
                    success => "Thank you for your feedback!",
                    name => session.name.as_str(),
                    email => session.email.as_str(),
                    csrf_token,
                },
            ))
        }
        Err(err) => Ok(render_error(user_error_text(&err), message)),
    }
}

pub(super) async fn report_bug_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (session_id, _session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
    Ok(render_page(&state, "report_bug.html", context! { csrf_token }))
}

pub(super) async fn handle_report_bug(
    req: HttpRequest,
    form: web::Form<BugReportForm>,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let (session_id, session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    let render_error = |error: String, page_url: &str, description: &str| {
        let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
        render_page(
            &state,
            "report_bug.html",
            context! { error, page_url, description, csrf_token },
        )
    };

    if !state.csrf_tokens.validate(&session_id, &form.csrf_token) {
        return Ok(render_error(
            CSRF_ERROR_TEXT.to_string(),
            form.page_url.trim(),
            form.description.trim(),
        ));
    }

    let page_url = form.page_url.trim();
    let description = form.description.trim();
    if let Err(message) = validate_page_url_field(page_url) {
        return Ok(render_error(message, page_url, description));
    }
    if description.is_empty() {
        return Ok(render_error(
            "Please describe the bug.".to_string(),
            page_url,
            "",
        ));
    }

    let recorded_url = if page_url.is_empty() {
        None
    } else {
        Some(page_url.to_string())
    };
    match service.record_bug_report(session.user_id, recorded_url, description) {
        Ok(()) => {
            let csrf_token = state.csrf_tokens.rotate(&session_id);
            Ok(render_page(
                &state,
                "report_bug.html",
                context! {
                    success => "Bug report submitted. Thank you!",
                    csrf_token,
                },
            ))
        }
        Err(err) => Ok(render_error(user_error_text(&err), page_url, description)),
    }
}
