// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::security::constant_time_eq;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const CSRF_TOKEN_EXPIRY_SECONDS: u64 = 3600;

/// One anti-forgery token per live session, issued lazily and rotated after
/// every successful state-changing form submission. A token consumed by
/// rotation never validates again, which bounds the replay window to one
/// use.
#[derive(Clone)]
pub struct CsrfTokenStore {
    sender: mpsc::Sender<CsrfCommand>,
}

#[derive(Clone, Debug)]
struct CsrfTokenData {
    token: String,
    created_at: Instant,
}

enum CsrfCommand {
    GetOrIssue {
        session_id: String,
        reply: mpsc::Sender<String>,
    },
    Validate {
        session_id: String,
        submitted: String,
        reply: mpsc::Sender<bool>,
    },
    Rotate {
        session_id: String,
        reply: mpsc::Sender<String>,
    },
    Clear {
        session_id: String,
    },
}

impl CsrfTokenStore {
    pub fn new() -> Self {
        CsrfTokenStore {
            sender: start_csrf_worker(),
        }
    }

    /// Returns the session's current token, issuing one on first need.
    pub fn get_or_issue(&self, session_id: &str) -> String {
        self.request(
            |reply| CsrfCommand::GetOrIssue {
                session_id: session_id.to_string(),
                reply,
            },
            String::new(),
        )
    }

    /// Constant-time check of a submitted token against the session's live
    /// token. Missing, empty, or already-rotated tokens are simply false.
    pub fn validate(&self, session_id: &str, submitted: &str) -> bool {
        if session_id.is_empty() || submitted.is_empty() {
            return false;
        }
        self.request(
            |reply| CsrfCommand::Validate {
                session_id: session_id.to_string(),
                submitted: submitted.to_string(),
                reply,
            },
            false,
        )
    }

    /// Replace the session's token after a successful state-changing
    /// submission; the prior token stops validating immediately.
    pub fn rotate(&self, session_id: &str) -> String {
        self.request(
            |reply| CsrfCommand::Rotate {
                session_id: session_id.to_string(),
                reply,
            },
            String::new(),
        )
    }

    /// Drop all token state for a session on logout or account deletion.
    pub fn clear(&self, session_id: &str) {
        let command = CsrfCommand::Clear {
            session_id: session_id.to_string(),
        };
        if self.sender.send(command).is_err() {
            log::error!("CsrfTokenStore channel closed");
        }
    }

    fn request<T>(&self, build: impl FnOnce(mpsc::Sender<T>) -> CsrfCommand, fallback: T) -> T {
        let (reply, receive) = mpsc::channel();
        if self.sender.send(build(reply)).is_err() {
            log::error!("CsrfTokenStore channel closed");
            return fallback;
        }
        receive.recv().unwrap_or(fallback)
    }
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

fn start_csrf_worker() -> mpsc::Sender<CsrfCommand> {
    let (sender, receiver) = mpsc::channel();
    let thread = thread::Builder::new().name("csrf-token-store".to_string());
    if let Err(err) = thread.spawn(move || run_csrf_worker(receiver)) {
        log::error!("CsrfTokenStore worker failed to start: {}", err);
    }
    sender
}

fn run_csrf_worker(receiver: mpsc::Receiver<CsrfCommand>) {
    let mut tokens: HashMap<String, CsrfTokenData> = HashMap::new();
    while let Ok(command) = receiver.recv() {
        let now = Instant::now();
        cleanup_expired_tokens(&mut tokens, now);
        match command {
            CsrfCommand::GetOrIssue { session_id, reply } => {
                let token = tokens
                    .entry(session_id)
                    .or_insert_with(|| CsrfTokenData {
                        token: generate_token_value(),
                        created_at: now,
                    })
                    .token
                    .clone();
                let _ = reply.send(token);
            }
            CsrfCommand::Validate {
                session_id,
                submitted,
                reply,
            } => {
                let is_valid = tokens
                    .get(&session_id)
                    .map(|data| constant_time_eq(data.token.as_bytes(), submitted.as_bytes()))
                    .unwrap_or(false);
                if !is_valid {
                    log::warn!("CSRF token mismatch for session");
                }
                let _ = reply.send(is_valid);
            }
            CsrfCommand::Rotate { session_id, reply } => {
                let data = CsrfTokenData {
                    token: generate_token_value(),
                    created_at: now,
                };
                let token = data.token.clone();
                tokens.insert(session_id, data);
                let _ = reply.send(token);
            }
            CsrfCommand::Clear { session_id } => {
                tokens.remove(&session_id);
            }
        }
    }
}

fn cleanup_expired_tokens(tokens: &mut HashMap<String, CsrfTokenData>, now: Instant) {
    tokens.retain(|_, data| {
        now.duration_since(data.created_at) < Duration::from_secs(CSRF_TOKEN_EXPIRY_SECONDS)
    });
}

// 32 bytes of entropy, transport-safe encoding.
fn generate_token_value() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
