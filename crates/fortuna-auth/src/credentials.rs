//! Expiry-aware persistence for the auth token and user record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use fortuna_client::UserRecord;

use crate::storage::CredentialStorage;

/// Storage key for the token record.
pub const TOKEN_KEY: &str = "fortuna-auth-token";

/// Storage key for the user record.
pub const USER_KEY: &str = "fortuna-auth-user";

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// A persisted authentication token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialToken {
    /// Access token.
    pub token: String,

    /// Refresh token, if the server issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiry in epoch milliseconds.
    pub expires_at: u64,

    /// When the token was issued (RFC 3339).
    #[serde(default)]
    pub created_at: String,
}

impl CredentialToken {
    /// Check if the token is past its expiry.
    pub fn is_expired(&self) -> bool {
        now_millis() > self.expires_at
    }
}

/// Store for exactly two records: the auth token and the user it was
/// issued to.
///
/// Reads are expiry-aware: a token observed to be expired or
/// unparseable is deleted together with the user record, because the
/// user record's lifetime is tied to the token it arrived with. All
/// failures degrade to "no session" rather than an error.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    storage: Arc<dyn CredentialStorage>,
}

impl CredentialStore {
    /// Create a store over the given storage backend.
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self { storage }
    }

    /// Create a store over fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::storage::MemoryStorage::new()))
    }

    /// Persist a token record, overwriting any existing one.
    pub fn set_token(&self, token: &CredentialToken) {
        match serde_json::to_string(token) {
            Ok(json) => {
                self.storage.write(TOKEN_KEY, &json);
                info!(expires_at = token.expires_at, "auth token persisted");
            }
            Err(e) => warn!(error = %e, "token serialization failed, dropping write"),
        }
    }

    /// Persist a user record, overwriting any existing one.
    pub fn set_user(&self, user: &UserRecord) {
        match serde_json::to_string(user) {
            Ok(json) => {
                self.storage.write(USER_KEY, &json);
                info!(user_id = %user.id, "user record persisted");
            }
            Err(e) => warn!(error = %e, "user serialization failed, dropping write"),
        }
    }

    /// Read the stored token.
    ///
    /// A missing, unparseable, or expired record clears BOTH the token
    /// and the user record and returns `None`.
    pub fn token(&self) -> Option<CredentialToken> {
        let raw = self.storage.read(TOKEN_KEY)?;

        let token: CredentialToken = match serde_json::from_str(&raw) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "stored token unreadable, clearing session");
                self.clear();
                return None;
            }
        };

        if token.is_expired() {
            debug!(expires_at = token.expires_at, "stored token expired, clearing session");
            self.clear();
            return None;
        }

        Some(token)
    }

    /// Read the stored user record.
    ///
    /// An unparseable record is treated as absent; the token record is
    /// left untouched.
    pub fn user(&self) -> Option<UserRecord> {
        let raw = self.storage.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user record unreadable, treating as absent");
                None
            }
        }
    }

    /// Read the stored refresh token, ignoring access-token expiry.
    ///
    /// The refresh credential exists to outlive the access token, so
    /// this read does not apply the expiry cascade.
    pub fn stored_refresh_token(&self) -> Option<String> {
        let raw = self.storage.read(TOKEN_KEY)?;
        let token: CredentialToken = serde_json::from_str(&raw).ok()?;
        token.refresh_token
    }

    /// Remove both the token and the user record.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
    }

    /// Check whether a live token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
