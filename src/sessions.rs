// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::companies::Company;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

pub const SESSION_COOKIE_NAME: &str = "pdsk_session";
const SESSION_CHANNEL_DEPTH: usize = 64;
const MAX_SESSIONS: usize = 10000;

/// Attributes denormalized into the session at login so authenticated pages
/// render without hitting the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub company: Company,
    pub role: String,
}

#[derive(Debug)]
pub enum SessionError {
    Unavailable,
}

impl SessionError {
    pub fn message(&self) -> &'static str {
        match self {
            SessionError::Unavailable => "Session store unavailable",
        }
    }
}

/// Process-wide session state keyed by opaque identifier. All access goes
/// through one task that owns the map, so per-key reads and writes are
/// naturally atomic.
#[derive(Clone)]
pub struct SessionStore {
    sender: mpsc::Sender<SessionCommand>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_DEPTH);
        tokio::spawn(async move {
            let mut state = SessionState::new();
            state.run(receiver).await;
        });
        Self { sender, ttl }
    }

    /// Issue a fresh session for just-authenticated attributes. Callers
    /// destroy any previously presented identifier first; a login never
    /// continues an identifier the client arrived with.
    pub async fn create(&self, data: SessionData) -> Result<String, SessionError> {
        let (reply, receive) = oneshot::channel();
        let command = SessionCommand::Create {
            data,
            ttl: self.ttl,
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return Err(SessionError::Unavailable);
        }
        receive.await.unwrap_or(Err(SessionError::Unavailable))
    }

    /// Read the session behind an identifier, refreshing its idle expiry.
    pub async fn read(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        let (reply, receive) = oneshot::channel();
        let command = SessionCommand::Read {
            session_id: session_id.to_string(),
            ttl: self.ttl,
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return Err(SessionError::Unavailable);
        }
        receive.await.unwrap_or(Err(SessionError::Unavailable))
    }

    pub async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        let command = SessionCommand::Destroy {
            session_id: session_id.to_string(),
        };
        if self.sender.send(command).await.is_err() {
            return Err(SessionError::Unavailable);
        }
        Ok(())
    }
}

enum SessionCommand {
    Create {
        data: SessionData,
        ttl: Duration,
        reply: oneshot::Sender<Result<String, SessionError>>,
    },
    Read {
        session_id: String,
        ttl: Duration,
        reply: oneshot::Sender<Result<Option<SessionData>, SessionError>>,
    },
    Destroy {
        session_id: String,
    },
}

struct SessionRecord {
    data: SessionData,
    expires_at: Instant,
}

struct SessionState {
    sessions: HashMap<String, SessionRecord>,
    session_order: VecDeque<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            session_order: VecDeque::new(),
        }
    }

    async fn run(&mut self, mut receiver: mpsc::Receiver<SessionCommand>) {
        while let Some(command) = receiver.recv().await {
            let now = Instant::now();
            self.cleanup_expired(now);
            match command {
                SessionCommand::Create { data, ttl, reply } => {
                    let _ = reply.send(Ok(self.create_session(data, ttl, now)));
                }
                SessionCommand::Read {
                    session_id,
                    ttl,
                    reply,
                } => {
                    let _ = reply.send(Ok(self.read_session(&session_id, ttl, now)));
                }
                SessionCommand::Destroy { session_id } => {
                    self.destroy_session(&session_id);
                }
            }
        }
    }

    fn create_session(&mut self, data: SessionData, ttl: Duration, now: Instant) -> String {
        let session_id = generate_session_id();
        self.sessions.insert(
            session_id.clone(),
            SessionRecord {
                data,
                expires_at: now + ttl,
            },
        );
        self.session_order.push_back(session_id.clone());
        self.prune_overflow();
        session_id
    }

    fn read_session(
        &mut self,
        session_id: &str,
        ttl: Duration,
        now: Instant,
    ) -> Option<SessionData> {
        let record = self.sessions.get_mut(session_id)?;
        if record.expires_at <= now {
            self.destroy_session(session_id);
            return None;
        }
        record.expires_at = now + ttl;
        Some(record.data.clone())
    }

    fn destroy_session(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
        self.session_order.retain(|id| id != session_id);
    }

    fn cleanup_expired(&mut self, now: Instant) {
        self.sessions.retain(|_, record| record.expires_at > now);
        let sessions = &self.sessions;
        self.session_order.retain(|id| sessions.contains_key(id));
    }

    fn prune_overflow(&mut self) {
        while self.sessions.len() > MAX_SESSIONS {
            if let Some(oldest) = self.session_order.pop_front() {
                self.sessions.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 24];
    OsRng.fill_bytes(&mut bytes);
    format!("psn_{}", URL_SAFE_NO_PAD.encode(bytes))
}
