// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pulsedesk::config::AppConfig;

use common::{
    body_text, build_test_app, csrf_token_for, login, register_employee, TestHarness,
    TEST_EMAIL, TEST_NAME, TEST_PASSWORD,
};

/// The store file as text, or empty when no save has happened yet.
fn stored_data(harness: &TestHarness) -> String {
    std::fs::read_to_string(AppConfig::data_file(harness.temp_dir.path())).unwrap_or_default()
}

#[actix_web::test]
async fn feedback_without_a_valid_token_records_nothing() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;

    for forged in ["", "forged-token-value"] {
        let req = test::TestRequest::post()
            .uri("/feedback")
            .cookie(cookie.clone())
            .set_form([("csrf_token", forged), ("feedback", "smuggled entry")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("Invalid request. Please refresh and try again."));
    }

    assert!(!stored_data(&harness).contains("smuggled entry"));
}

#[actix_web::test]
async fn a_used_token_stops_validating() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;
    let token = csrf_token_for(&app, &cookie, "/feedback").await;

    let req = test::TestRequest::post()
        .uri("/feedback")
        .cookie(cookie.clone())
        .set_form([("csrf_token", token.as_str()), ("feedback", "first entry")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("Thank you for your feedback!"));
    assert!(stored_data(&harness).contains("first entry"));

    // The successful submission rotated the token; replaying the old one
    // changes nothing.
    let req = test::TestRequest::post()
        .uri("/feedback")
        .cookie(cookie)
        .set_form([("csrf_token", token.as_str()), ("feedback", "replayed entry")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("Invalid request. Please refresh and try again."));
    assert!(!stored_data(&harness).contains("replayed entry"));
}

#[actix_web::test]
async fn tokens_are_bound_to_their_session() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    register_employee(&app, "John Roe", "john.roe@accenture.com", TEST_PASSWORD).await;

    let jane = login(&app, TEST_EMAIL, TEST_PASSWORD).await;
    let john = login(&app, "john.roe@accenture.com", TEST_PASSWORD).await;
    let janes_token = csrf_token_for(&app, &jane, "/feedback").await;

    let req = test::TestRequest::post()
        .uri("/feedback")
        .cookie(john)
        .set_form([
            ("csrf_token", janes_token.as_str()),
            ("feedback", "cross-session entry"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("Invalid request. Please refresh and try again."));
    assert!(!stored_data(&harness).contains("cross-session entry"));
}

#[actix_web::test]
async fn change_password_with_a_forged_token_leaves_the_hash_alone() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;

    let req = test::TestRequest::post()
        .uri("/change-password")
        .cookie(cookie)
        .set_form([
            ("csrf_token", "forged-token-value"),
            ("current_password", TEST_PASSWORD),
            ("new_password", "attacker-chosen-pass"),
            ("confirm_password", "attacker-chosen-pass"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("Invalid request. Please refresh and try again."));

    // The original password still works.
    login(&app, TEST_EMAIL, TEST_PASSWORD).await;
}

#[actix_web::test]
async fn bug_report_requires_a_valid_url_and_description() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;

    let token = csrf_token_for(&app, &cookie, "/report-bug").await;
    let req = test::TestRequest::post()
        .uri("/report-bug")
        .cookie(cookie.clone())
        .set_form([
            ("csrf_token", token.as_str()),
            ("page_url", "ftp://not-http.example.com"),
            ("description", "Broken layout"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("not valid"));
    assert!(!stored_data(&harness).contains("Broken layout"));

    // Valid submission with an empty optional URL goes through.
    let token = csrf_token_for(&app, &cookie, "/report-bug").await;
    let req = test::TestRequest::post()
        .uri("/report-bug")
        .cookie(cookie)
        .set_form([
            ("csrf_token", token.as_str()),
            ("page_url", ""),
            ("description", "Broken layout"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("Bug report submitted"));
    let data = stored_data(&harness);
    assert!(data.contains("Broken layout"));
    assert!(data.contains("New"));
}

#[actix_web::test]
async fn delete_account_removes_the_employee_and_dependents() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;

    let token = csrf_token_for(&app, &cookie, "/feedback").await;
    let req = test::TestRequest::post()
        .uri("/feedback")
        .cookie(cookie.clone())
        .set_form([("csrf_token", token.as_str()), ("feedback", "keep in mind")])
        .to_request();
    test::call_service(&app, req).await;

    let token = csrf_token_for(&app, &cookie, "/delete-account").await;
    let req = test::TestRequest::post()
        .uri("/delete-account")
        .cookie(cookie.clone())
        .set_form([("csrf_token", token.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let data = stored_data(&harness);
    assert!(!data.contains(TEST_EMAIL));
    assert!(!data.contains("keep in mind"));

    // The session died with the account.
    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
