use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::store::TokenStore;
use super::token::{decode_claims, Claims};

/// Key used in both persistence slots
pub const TOKEN_KEY: &str = "token";

/// Session handle shared between the API client and the application.
pub type SharedSession = Arc<RwLock<Session>>;

/// Single source of truth for the admin bearer token.
///
/// Authentication state is derived from the token's `exp` claim on every
/// check; nothing else is stored.
pub struct Session {
    durable: Box<dyn TokenStore>,
    ephemeral: Box<dyn TokenStore>,
    token: Option<String>,
}

impl Session {
    pub fn new(durable: impl TokenStore + 'static, ephemeral: impl TokenStore + 'static) -> Self {
        Self {
            durable: Box::new(durable),
            ephemeral: Box::new(ephemeral),
            token: None,
        }
    }

    /// Wrap into a handle that can be shared with an `ApiClient`.
    pub fn shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    /// Restore the token from storage. The durable slot wins over the
    /// ephemeral one. Returns whether a token was found.
    pub fn load(&mut self) -> Result<bool> {
        self.token = match self.durable.get(TOKEN_KEY)? {
            Some(token) => Some(token),
            None => self.ephemeral.get(TOKEN_KEY)?,
        };
        debug!(has_token = self.token.is_some(), "Session loaded");
        Ok(self.token.is_some())
    }

    /// Store a new token. `remember` selects the durable slot; the other
    /// slot is cleared so a stale token cannot be picked up on reload.
    pub fn set_token(&mut self, token: impl Into<String>, remember: bool) -> Result<()> {
        let token = token.into();
        let (target, other) = if remember {
            (&self.durable, &self.ephemeral)
        } else {
            (&self.ephemeral, &self.durable)
        };
        target.set(TOKEN_KEY, &token)?;
        // The new token is persisted, so it is current even if cleanup fails
        self.token = Some(token);
        other.remove(TOKEN_KEY)?;
        debug!(remember, "Session token stored");
        Ok(())
    }

    /// Remove the token from both slots. Safe to call repeatedly.
    pub fn clear_token(&mut self) -> Result<()> {
        self.token = None;
        self.durable.remove(TOKEN_KEY)?;
        self.ephemeral.remove(TOKEN_KEY)?;
        debug!("Session token cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Decoded claims of the current token, if it has any.
    pub fn claims(&self) -> Option<Claims> {
        self.token.as_deref().and_then(decode_claims)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims().and_then(|c| c.expires_at())
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    /// Whether the token is present, decodable and unexpired at `now`.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.claims().map(|c| c.is_valid_at(now)).unwrap_or(false)
    }

    /// The token to attach to outgoing requests, if it is still valid.
    pub fn bearer(&self) -> Option<&str> {
        if self.is_authenticated() {
            self.token()
        } else {
            None
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &self.token.is_some())
            .finish()
    }
}
