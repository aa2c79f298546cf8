// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use actix_web::{web, HttpResponse, Result};
use minijinja::context;

use super::helpers::{company_options, render_page};

pub(super) async fn welcome_page(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(render_page(
        &state,
        "welcome.html",
        context! { companies => company_options() },
    ))
}
