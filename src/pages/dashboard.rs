// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;

use super::helpers::{render_page, require_session};

pub(super) async fn dashboard_page(
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
        "dashboard.html",
        context! {
            name => session.name,
            email => session.email,
            company_display => session.company.display_name(),
            role => session.role,
            csrf_token,
        },
    ))
}
