// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::EmployeeService;
use crate::companies::{normalize_role, Company};
use crate::security::{
    validate_and_sanitize_user_name, validate_email_field, validate_new_password,
};
use actix_web::{web, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;

use super::helpers::{redirect_to, render_page, user_error_text};

#[derive(Deserialize)]
pub(super) struct RegisterQuery {
    #[serde(default)]
    company: String,
    #[serde(default)]
    role: String,
}

#[derive(Deserialize)]
pub(super) struct RegisterForm {
    #[serde(default)]
    company: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// The welcome page forwards company and role as query parameters; anything
/// missing or malformed goes back to the picker.
pub(super) async fn register_form(
    query: web::Query<RegisterQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let company = match Company::from_key(&query.company) {
        Some(company) => company,
        None => return Ok(redirect_to("/")),
    };
    let role = match normalize_role(&query.role) {
        Ok(role) => role,
        Err(_) => return Ok(redirect_to("/")),
    };

    Ok(render_page(
        &state,
        "register.html",
        context! {
            company_key => company.key(),
            company_display => company.display_name(),
            role => role,
        },
    ))
}

pub(super) async fn handle_register(
    form: web::Form<RegisterForm>,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let company = match Company::from_key(&form.company) {
        Some(company) => company,
        None => return Ok(redirect_to("/")),
    };
    let role = match normalize_role(&form.role) {
        Ok(role) => role,
        Err(_) => return Ok(redirect_to("/")),
    };

    let render_error = |error: String, name: &str, email: &str| {
        render_page(
            &state,
            "register.html",
            context! {
                error,
                company_key => company.key(),
                company_display => company.display_name(),
                role => role.as_str(),
                name,
                email,
            },
        )
    };

    let name = match validate_and_sanitize_user_name(&form.name) {
        Ok(name) => name,
        Err(message) => return Ok(render_error(message, form.name.trim(), form.email.trim())),
    };
    if let Err(message) = validate_email_field(&form.email) {
        return Ok(render_error(message, &name, form.email.trim()));
    }
    if !company.matches_email(&form.email) {
        let message = format!(
            "Please register with your {} email address ({}).",
            company.display_name(),
            company.email_domains().join(" or ")
        );
        return Ok(render_error(message, &name, form.email.trim()));
    }
    if let Err(message) = validate_new_password(&form.password) {
        return Ok(render_error(message, &name, form.email.trim()));
    }

    match service.register(&name, form.email.trim(), &form.password, company, &role) {
        Ok(_) => Ok(render_page(
            &state,
            "register.html",
            context! {
                success => "Registration successful! You can now log in.",
                company_key => company.key(),
                company_display => company.display_name(),
                role => role.as_str(),
            },
        )),
        Err(err) => Ok(render_error(user_error_text(&err), &name, form.email.trim())),
    }
}
