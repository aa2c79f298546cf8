// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::app_state::AppState;
use crate::auth::EmployeeService;
use crate::config::UPLOAD_DIR_NAME;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde_json::json;
use uuid::Uuid;

use super::helpers::{
    presented_session_id, render_page, require_session, user_error_text, CSRF_ERROR_TEXT,
};

pub const CSRF_HEADER_NAME: &str = "X-CSRF-Token";

pub(super) async fn profile_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let (session_id, session) = match require_session(&req, &state).await {
        Ok(resolved) => resolved,
        Err(response) => return Ok(response),
    };

    // The page still renders without the photo if the store is unreadable.
    let photo_path = match service.find_by_id(session.user_id) {
        Ok(Some(employee)) => employee.photo_path,
        Ok(None) => None,
        Err(err) => {
            log::error!("Failed to load employee {}: {}", session.user_id, err);
            None
        }
    };

    let csrf_token = state.csrf_tokens.get_or_issue(&session_id);
    let csrf_token_json = json!(csrf_token).to_string();
    Ok(render_page(
        &state,
        "profile.html",
        context! {
            name => session.name,
            company_display => session.company.display_name(),
            role => session.role,
            photo_path,
            csrf_token_json,
        },
    ))
}

/// Raw-body photo upload driven by the profile page's fetch() call. The
/// token travels in a header because there is no form body to carry it.
pub(super) async fn handle_photo_upload(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
    service: web::Data<EmployeeService>,
) -> Result<HttpResponse> {
    let session_id = match presented_session_id(&req) {
        Some(session_id) => session_id,
        None => return Ok(unauthorized_response()),
    };
    let session = match state.sessions.read(&session_id).await {
        Ok(Some(session)) => session,
        _ => return Ok(unauthorized_response()),
    };

    let submitted = req
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !state.csrf_tokens.validate(&session_id, submitted) {
        return Ok(HttpResponse::Forbidden().json(json!({
            "success": false,
            "message": CSRF_ERROR_TEXT,
        })));
    }

    if body.len() > state.max_photo_bytes {
        return Ok(HttpResponse::PayloadTooLarge().json(json!({
            "success": false,
            "message": "The photo exceeds the maximum allowed size.",
        })));
    }

    // The declared Content-Type is ignored; the leading bytes decide.
    let extension = match sniff_image_extension(&body) {
        Some(extension) => extension,
        None => {
            return Ok(HttpResponse::UnsupportedMediaType().json(json!({
                "success": false,
                "message": "Only JPG, PNG or GIF images are allowed.",
            })));
        }
    };

    let filename = format!("user_{}_{}.{}", session.user_id, Uuid::new_v4(), extension);
    if let Err(err) = write_photo(&state, &filename, &body) {
        log::error!("Failed to store profile photo: {}", err);
        return Ok(HttpResponse::InternalServerError().json(json!({
            "success": false,
            "message": "Failed to store the photo. Please try again later.",
        })));
    }

    let stored_path = format!("{}/{}", UPLOAD_DIR_NAME, filename);
    match service.set_photo_path(session.user_id, &stored_path) {
        Ok(Some(previous)) => remove_superseded_photo(&state, &previous),
        Ok(None) => {}
        Err(err) => {
            return Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": user_error_text(&err),
            })));
        }
    }

    state.csrf_tokens.rotate(&session_id);
    log::info!("Employee {} uploaded a profile photo", session.user_id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "photo_path": stored_path,
    })))
}

fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "success": false,
        "message": "Authentication required.",
    }))
}

/// Map leading magic bytes to a file extension; anything unrecognized is
/// rejected.
fn sniff_image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("gif");
    }
    None
}

/// Drop the file a fresh upload replaced. Only the file name is trusted;
/// the stored path is resolved against the upload directory.
fn remove_superseded_photo(state: &AppState, stored_path: &str) {
    let file_name = match std::path::Path::new(stored_path).file_name() {
        Some(name) => name,
        None => return,
    };
    let path = state.upload_dir.join(file_name);
    if let Err(err) = std::fs::remove_file(&path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove superseded photo {}: {}", path.display(), err);
        }
    }
}

/// Temp-file write then rename, same discipline as the data store; a
/// half-written photo never lands under the final name.
fn write_photo(state: &AppState, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(&state.upload_dir)?;
    let temp_path = state.upload_dir.join(format!("{}.tmp", filename));
    let final_path = state.upload_dir.join(filename);
    std::fs::write(&temp_path, bytes)?;
    std::fs::rename(&temp_path, &final_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_recognizes_supported_formats() {
        assert_eq!(sniff_image_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpg"));
        assert_eq!(
            sniff_image_extension(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Some("png")
        );
        assert_eq!(sniff_image_extension(b"GIF89a...."), Some("gif"));
        assert_eq!(sniff_image_extension(b"GIF87a...."), Some("gif"));
    }

    #[test]
    fn sniff_rejects_everything_else() {
        assert_eq!(sniff_image_extension(b""), None);
        assert_eq!(sniff_image_extension(b"<svg xmlns="), None);
        assert_eq!(sniff_image_extension(b"%PDF-1.4"), None);
        assert_eq!(sniff_image_extension(&[0xFF, 0xD8]), None);
    }
}
