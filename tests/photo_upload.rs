// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use pulsedesk::pages::CSRF_HEADER_NAME;
use serde_json::Value;

use common::{
    body_text, build_test_app, login, register_employee, test_config, TestHarness, TEST_EMAIL,
    TEST_NAME, TEST_PASSWORD,
};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn png_body(extra: usize) -> Vec<u8> {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend(std::iter::repeat(0u8).take(extra));
    bytes
}

/// The profile page embeds its token in the upload script rather than a
/// hidden field.
async fn profile_csrf_token<S>(app: &S, cookie: &Cookie<'static>) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    let marker = r#"const csrfToken = ""#;
    let start = body.find(marker).expect("csrf token script") + marker.len();
    let remainder = &body[start..];
    let end = remainder.find('"').expect("csrf token end");
    remainder[..end].to_string()
}

#[actix_web::test]
async fn upload_requires_the_header_token() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;

    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .cookie(cookie)
        .set_payload(png_body(64))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn upload_requires_a_session() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;

    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .set_payload(png_body(64))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_valid_png_lands_on_disk_and_on_the_profile() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;
    let token = profile_csrf_token(&app, &cookie).await;

    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .cookie(cookie.clone())
        .insert_header((CSRF_HEADER_NAME, token))
        .set_payload(png_body(256))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).expect("json");
    assert_eq!(body["success"], true);
    let photo_path = body["photo_path"].as_str().expect("photo path");
    assert!(photo_path.ends_with(".png"));

    let on_disk = harness.temp_dir.path().join(photo_path);
    let stored = std::fs::read(on_disk).expect("stored photo");
    assert!(stored.starts_with(&PNG_MAGIC));
    assert_eq!(stored.len(), 8 + 256);

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let profile = body_text(resp).await;
    assert!(profile.contains(photo_path));
}

#[actix_web::test]
async fn a_second_upload_removes_the_previous_photo() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;

    let token = profile_csrf_token(&app, &cookie).await;
    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .cookie(cookie.clone())
        .insert_header((CSRF_HEADER_NAME, token))
        .set_payload(png_body(64))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).expect("json");
    let first_path = body["photo_path"].as_str().expect("photo path").to_string();
    let first_on_disk = harness.temp_dir.path().join(&first_path);
    assert!(first_on_disk.exists());

    // The token rotates after a successful upload, so fetch a fresh one.
    let token = profile_csrf_token(&app, &cookie).await;
    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .cookie(cookie.clone())
        .insert_header((CSRF_HEADER_NAME, token))
        .set_payload(png_body(128))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).expect("json");
    let second_path = body["photo_path"].as_str().expect("photo path").to_string();
    assert_ne!(first_path, second_path);

    assert!(!first_on_disk.exists());
    assert!(harness.temp_dir.path().join(&second_path).exists());

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let profile = body_text(resp).await;
    assert!(profile.contains(&second_path));
    assert!(!profile.contains(&first_path));
}

#[actix_web::test]
async fn non_image_payloads_are_rejected_by_magic_bytes() {
    let harness = TestHarness::new();
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;
    let token = profile_csrf_token(&app, &cookie).await;

    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .cookie(cookie)
        .insert_header((CSRF_HEADER_NAME, token))
        .insert_header(("Content-Type", "image/png"))
        .set_payload(&b"<svg xmlns='http://www.w3.org/2000/svg'></svg>"[..])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[actix_web::test]
async fn oversized_photos_are_rejected() {
    let mut config = test_config();
    config.upload.max_photo_bytes = 512;
    let harness = TestHarness::with_config(config);
    let app = test::init_service(build_test_app(&harness)).await;
    register_employee(&app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD).await;
    let cookie = login(&app, TEST_EMAIL, TEST_PASSWORD).await;
    let token = profile_csrf_token(&app, &cookie).await;

    let req = test::TestRequest::post()
        .uri("/profile/photo")
        .cookie(cookie)
        .insert_header((CSRF_HEADER_NAME, token))
        .set_payload(png_body(1024))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
