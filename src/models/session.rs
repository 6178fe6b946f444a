// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Authenticated session and display theme.
//!
//! Both are explicit values owned by the application and handed to the
//! views that need them. The session is restored once at startup from the
//! persisted token and torn down on logout.

use crate::io::storage::{LocalStorage, DARK_MODE_KEY, TOKEN_KEY};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("No token received from server")]
    MissingToken,
    #[error("invalid token: {0}")]
    Malformed(String),
}

/// User profile as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in user together with the token that authenticates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Build a session from a raw token by reading its `user` claim.
    pub fn from_token(token: &str) -> Result<Self, SessionError> {
        Ok(Self {
            user: decode_token(token)?,
            token: token.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct TokenClaims {
    user: SessionUser,
}

/// Decode the payload of a JWT-shaped token and return its `user` claim.
///
/// The signature is not checked; the backend verifies tokens.
pub fn decode_token(token: &str) -> Result<SessionUser, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(SessionError::Malformed(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| SessionError::Malformed(e.to_string()))?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload).map_err(|e| SessionError::Malformed(e.to_string()))?;
    Ok(claims.user)
}

/// Read the persisted token once. A malformed token is dropped from storage.
pub fn restore_session(storage: &mut LocalStorage) -> Option<Session> {
    let token = storage.get(TOKEN_KEY)?.to_string();
    match Session::from_token(&token) {
        Ok(session) => {
            log::info!("Restored session for user {}", session.user_id());
            Some(session)
        }
        Err(e) => {
            log::warn!("Discarding stored token: {}", e);
            if let Err(e) = storage.remove(TOKEN_KEY) {
                log::error!("Failed to clear stored token: {:#}", e);
            }
            None
        }
    }
}

/// Persist a freshly issued session.
pub fn persist_session(storage: &mut LocalStorage, session: &Session) {
    if let Err(e) = storage.set(TOKEN_KEY, session.token.clone()) {
        log::error!("Failed to persist session token: {:#}", e);
    }
}

/// Forget the persisted token.
pub fn clear_session(storage: &mut LocalStorage) {
    if let Err(e) = storage.remove(TOKEN_KEY) {
        log::error!("Failed to clear session token: {:#}", e);
    }
}

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn load(storage: &LocalStorage) -> Self {
        match storage.get(DARK_MODE_KEY) {
            Some("true") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn save(self, storage: &mut LocalStorage) {
        if let Err(e) = storage.set(DARK_MODE_KEY, self.is_dark().to_string()) {
            log::error!("Failed to persist theme: {:#}", e);
        }
    }
}
