// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::companies::Company;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use tokio::sync::{mpsc, oneshot};

const RESET_TOKEN_CHANNEL_DEPTH: usize = 64;
pub const RESET_TOKEN_TTL_SECONDS: u64 = 600;

/// Verified identity carried between reset stage 1 and stage 2. Held only
/// server-side; the client sees the opaque token string.
#[derive(Debug, Clone)]
pub struct PendingReset {
    pub user_id: u64,
    pub email: String,
    pub company: Company,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub enum ResetTokenError {
    Unavailable,
}

impl ResetTokenError {
    pub fn message(&self) -> &'static str {
        match self {
            ResetTokenError::Unavailable => "Password reset token store unavailable",
        }
    }
}

#[derive(Clone)]
pub struct ResetTokenStore {
    sender: mpsc::Sender<ResetTokenCommand>,
}

impl ResetTokenStore {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(RESET_TOKEN_CHANNEL_DEPTH);
        tokio::spawn(async move {
            let mut state = ResetTokenState::new();
            state.run(receiver).await;
        });
        Self { sender }
    }

    pub async fn issue(
        &self,
        user_id: u64,
        email: &str,
        company: Company,
        ttl: Duration,
    ) -> Result<String, ResetTokenError> {
        let (reply, receive) = oneshot::channel();
        let command = ResetTokenCommand::Issue {
            user_id,
            email: email.to_string(),
            company,
            ttl,
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return Err(ResetTokenError::Unavailable);
        }
        receive.await.unwrap_or(Err(ResetTokenError::Unavailable))
    }

    /// Look up a token without consuming it. Stage 2 validation failures
    /// re-display the form with the same token still live.
    pub async fn get(&self, token: &str) -> Result<Option<PendingReset>, ResetTokenError> {
        let (reply, receive) = oneshot::channel();
        let command = ResetTokenCommand::Get {
            token: token.to_string(),
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return Err(ResetTokenError::Unavailable);
        }
        receive.await.unwrap_or(Err(ResetTokenError::Unavailable))
    }

    /// One-time consumption after a successful reset.
    pub async fn invalidate(&self, token: &str) -> Result<(), ResetTokenError> {
        let command = ResetTokenCommand::Invalidate {
            token: token.to_string(),
        };
        if self.sender.send(command).await.is_err() {
            return Err(ResetTokenError::Unavailable);
        }
        Ok(())
    }
}

impl Default for ResetTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

enum ResetTokenCommand {
    Issue {
        user_id: u64,
        email: String,
        company: Company,
        ttl: Duration,
        reply: oneshot::Sender<Result<String, ResetTokenError>>,
    },
    Get {
        token: String,
        reply: oneshot::Sender<Result<Option<PendingReset>, ResetTokenError>>,
    },
    Invalidate {
        token: String,
    },
}

struct ResetTokenState {
    tokens: HashMap<String, PendingReset>,
}

impl ResetTokenState {
    fn new() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    async fn run(&mut self, mut receiver: mpsc::Receiver<ResetTokenCommand>) {
        while let Some(command) = receiver.recv().await {
            self.cleanup_expired();
            match command {
                ResetTokenCommand::Issue {
                    user_id,
                    email,
                    company,
                    ttl,
                    reply,
                } => {
                    let token = generate_reset_token();
                    self.tokens.insert(
                        token.clone(),
                        PendingReset {
                            user_id,
                            email,
                            company,
                            expires_at: Instant::now() + ttl,
                        },
                    );
                    let _ = reply.send(Ok(token));
                }
                ResetTokenCommand::Get { token, reply } => {
                    let pending = self.tokens.get(&token).cloned();
                    let _ = reply.send(Ok(pending));
                }
                ResetTokenCommand::Invalidate { token } => {
                    self.tokens.remove(&token);
                }
            }
        }
    }

    fn cleanup_expired(&mut self) {
        let now = Instant::now();
        self.tokens.retain(|_, pending| pending.expires_at > now);
    }
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 18];
    OsRng.fill_bytes(&mut bytes);
    format!("prt_{}", URL_SAFE_NO_PAD.encode(bytes))
}
