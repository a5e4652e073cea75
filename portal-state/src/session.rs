//! The signed-in session: bearer token plus the user decoded from it.
//!
//! Tokens are decoded but not verified here; the backend verifies every
//! request. Permission lookups always read the session as it is now, so a
//! new login is reflected immediately.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jiff::Timestamp;
use payloads::{ClientError, Permission, RoleId, UserClaims};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Token is not a JWT (expected three dot-separated segments)")]
    MalformedToken,
    #[error("Token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Token payload is not a valid user: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Decode the payload segment of a JWT into user claims.
pub fn decode_claims(token: &str) -> Result<UserClaims, SessionError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => {
            payload
        }
        _ => return Err(SessionError::MalformedToken),
    };
    // Some issuers pad the segments even though JWTs should not be padded.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    token: Option<String>,
    user: Option<UserClaims>,
}

impl AuthSession {
    /// Start a session from a freshly issued token.
    pub fn from_token(token: &str) -> Result<Self, SessionError> {
        let mut session = Self::default();
        session.set_user(token)?;
        Ok(session)
    }

    /// Replace the session with the one described by `token`. A token that
    /// cannot be decoded leaves the current session untouched.
    pub fn set_user(&mut self, token: &str) -> Result<(), SessionError> {
        let user = decode_claims(token)?;
        tracing::debug!(user_id = %user.id, role = %user.role_id, "Session started");
        self.token = Some(token.to_string());
        self.user = Some(user);
        Ok(())
    }

    pub fn reset(&mut self) {
        if self.token.is_some() {
            tracing::debug!("Session cleared");
        }
        self.token = None;
        self.user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserClaims> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<RoleId> {
        self.user.as_ref().map(|u| u.role_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// The user, if there is a token and their role is `expected`.
    pub fn gate(&self, expected: RoleId) -> Option<&UserClaims> {
        self.token.as_ref()?;
        self.user.as_ref().filter(|u| u.role_id == expected)
    }

    pub fn read_permission(&self, name: &str) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| is_allowed(&u.read_permissions, name))
    }

    pub fn write_permission(&self, name: &str) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| is_allowed(&u.write_permissions, name))
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.user
            .as_ref()
            .and_then(|u| u.exp)
            .is_some_and(|exp| exp <= now.as_second())
    }

    /// Apply the global reaction to a failed request: a 401 ends the
    /// session no matter which feature made the call. Returns true if the
    /// session was reset.
    pub fn observe_error(&mut self, error: &ClientError) -> bool {
        if error.is_unauthorized() && self.token.is_some() {
            tracing::warn!("Backend rejected the session token, logging out");
            self.reset();
            return true;
        }
        false
    }
}

fn is_allowed(permissions: &[Permission], name: &str) -> bool {
    permissions.iter().any(|p| p.name == name && p.allowed)
}
