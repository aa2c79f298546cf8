// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test, web, App};
use pulsedesk::app_state::AppState;
use pulsedesk::auth::{EmployeeService, FileEmployeeStore};
use pulsedesk::config::{AppConfig, Argon2Params};
use pulsedesk::pages;
use pulsedesk::sessions::SESSION_COOKIE_NAME;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_EMAIL: &str = "jane.doe@accenture.com";
pub const TEST_NAME: &str = "Jane Doe";
pub const TEST_PASSWORD: &str = "initial-password";
pub const TEST_COMPANY_KEY: &str = "Company A";
pub const TEST_ROLE: &str = "Developer";

/// A tempdir-backed portal instance. Dropping the harness removes the store
/// file and any uploaded photos with it.
pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: AppConfig,
    pub state: web::Data<AppState>,
    pub service: web::Data<EmployeeService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let store = FileEmployeeStore::new(AppConfig::data_file(temp_dir.path())).expect("store");
        let service =
            EmployeeService::new(Arc::new(store), config.password.clone()).expect("service");
        let state = AppState::new(&config, AppConfig::upload_dir(temp_dir.path()));
        Self {
            temp_dir,
            config,
            state: web::Data::new(state),
            service: web::Data::new(service),
        }
    }
}

/// Low-cost Argon2 parameters; the hashing semantics stay the same.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.password = Argon2Params {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    };
    config
}

pub fn build_test_app(
    harness: &TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(harness.state.clone())
        .app_data(harness.service.clone())
        .configure(pages::configure_pages)
}

pub async fn register_employee<S>(app: &S, name: &str, email: &str, password: &str)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([
            ("company", TEST_COMPANY_KEY),
            ("role", TEST_ROLE),
            ("name", name),
            ("email", email),
            ("password", password),
        ])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "register failed: {}", resp.status());
    let body = body_text(resp).await;
    assert!(
        body.contains("Registration successful"),
        "unexpected register body: {}",
        body
    );
}

/// Log in and return the session cookie from the redirect response.
pub async fn login<S>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("email", email), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
    session_cookie_from(&resp).expect("session cookie")
}

pub fn session_cookie_from(resp: &ServiceResponse<BoxBody>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.into_owned())
}

pub async fn body_text(resp: ServiceResponse<BoxBody>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

/// Pull the hidden csrf_token value out of a rendered form.
pub fn extract_csrf_token(body: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = body.find(marker).expect("csrf field") + marker.len();
    let remainder = &body[start..];
    let end = remainder.find('"').expect("csrf value end");
    remainder[..end].to_string()
}

/// Fetch a page under the session and return its CSRF token.
pub async fn csrf_token_for<S>(app: &S, cookie: &Cookie<'static>, uri: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "{} returned {}", uri, resp.status());
    let body = body_text(resp).await;
    extract_csrf_token(&body)
}
