//! Authentication session bootstrap and lifecycle.

use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use fortuna_cache::{CacheConfig, CachedFetch, FetchOptions, TtlCache};
use fortuna_client::{FortunaClient, UserRecord, VerifyResponse};

use crate::credentials::{CredentialStore, CredentialToken, now_millis};
use crate::error::Result;

/// Resource path for the authenticated user's profile.
const PROFILE_RESOURCE: &str = "profile/me";

/// Default redirect target when authentication is required but absent.
const DEFAULT_LOGIN_REDIRECT: &str = "/auth/login";

/// Configuration for an [`AuthSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether an absent identity should redirect to login.
    pub require_auth: bool,

    /// Path to redirect to when authentication is required but absent.
    pub login_redirect: String,

    /// TTL for request-scoped profile caching after the initial
    /// force-refresh.
    pub profile_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            require_auth: false,
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_string(),
            profile_ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require authentication for this session.
    pub fn with_require_auth(mut self, required: bool) -> Self {
        self.require_auth = required;
        self
    }

    /// Set the login redirect path.
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.login_redirect = path.into();
        self
    }

    /// Set the profile cache TTL.
    pub fn with_profile_ttl(mut self, ttl: Duration) -> Self {
        self.profile_ttl = ttl;
        self
    }
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet bootstrapped.
    Init,
    /// A remote refresh is in flight.
    Loading,
    /// A user identity is established.
    Authenticated,
    /// No identity is established.
    Unauthenticated,
    /// The last remote refresh failed.
    Error,
}

/// Observable session state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// The established user identity, if any.
    pub user: Option<UserRecord>,
    /// Whether a remote refresh is in flight.
    pub is_loading: bool,
    /// User-visible message from the last failed refresh.
    pub error: Option<String>,
}

/// Outcome of a bootstrap or refresh.
///
/// Navigation is returned as data, not performed: the rendering shell
/// decides how to execute a redirect.
#[derive(Debug, Clone, PartialEq)]
pub enum Bootstrap {
    /// Identity established.
    Authenticated(UserRecord),
    /// No identity, and none was required.
    Anonymous,
    /// No identity where one was required; navigate to this path.
    RedirectTo(String),
}

#[derive(Debug)]
struct SessionState {
    phase: Phase,
    user: Option<UserRecord>,
    error: Option<String>,
}

/// Client-side authentication session.
///
/// Bootstraps identity two ways: [`hydrate`](AuthSession::hydrate)
/// reads persisted credentials synchronously for immediate UI state,
/// and [`initialize`](AuthSession::initialize) follows up with an eager
/// remote refresh that bypasses the profile cache, because a fresh page
/// load must not trust stale local state. Later profile reads during
/// the same session are served through the request-scoped cache.
pub struct AuthSession {
    client: FortunaClient,
    store: CredentialStore,
    profile: CachedFetch<FortunaClient>,
    config: SessionConfig,
    state: RwLock<SessionState>,
}

impl AuthSession {
    /// Create a session over a client and credential store.
    pub fn new(client: FortunaClient, store: CredentialStore, config: SessionConfig) -> Self {
        let cache = TtlCache::new(CacheConfig::new().with_default_ttl(config.profile_ttl));
        let profile = CachedFetch::new(client.clone(), cache);
        Self {
            client,
            store,
            profile,
            config,
            state: RwLock::new(SessionState {
                phase: Phase::Init,
                user: None,
                error: None,
            }),
        }
    }

    /// Get the current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.read().phase
    }

    /// Get an observable state snapshot.
    pub fn state(&self) -> AuthState {
        let state = self.state.read();
        AuthState {
            user: state.user.clone(),
            is_loading: state.phase == Phase::Loading,
            error: state.error.clone(),
        }
    }

    /// Access the credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Bootstrap synchronously from persisted credentials.
    ///
    /// Marks the session authenticated only when both the token and the
    /// user record are present and live. No network call is made.
    pub fn hydrate(&self) -> bool {
        match (self.store.token(), self.store.user()) {
            (Some(token), Some(user)) => {
                debug!(user_id = %user.id, "session hydrated from stored credentials");
                self.client.set_auth_token(Some(token.token));
                let mut state = self.state.write();
                state.phase = Phase::Authenticated;
                state.user = Some(user);
                state.error = None;
                true
            }
            _ => {
                let mut state = self.state.write();
                state.phase = Phase::Unauthenticated;
                state.user = None;
                false
            }
        }
    }

    /// Bootstrap fully: hydrate, then force-refresh the profile.
    pub async fn initialize(&self) -> Bootstrap {
        self.hydrate();
        self.refresh().await
    }

    /// Force-refresh the profile from the remote API.
    ///
    /// Always bypasses the profile cache; the fresh response repopulates
    /// it for subsequent cached reads.
    pub async fn refresh(&self) -> Bootstrap {
        {
            let mut state = self.state.write();
            state.phase = Phase::Loading;
            state.error = None;
        }

        match self.load_profile(true).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "remote profile refresh confirmed identity");
                let mut state = self.state.write();
                state.phase = Phase::Authenticated;
                state.user = Some(user.clone());
                Bootstrap::Authenticated(user)
            }
            Ok(None) => {
                debug!("remote profile refresh found no identity");
                let mut state = self.state.write();
                state.phase = Phase::Unauthenticated;
                state.user = None;
                drop(state);
                self.unauthenticated_outcome()
            }
            Err(e) => {
                warn!(error = %e, "remote profile refresh failed");
                let mut state = self.state.write();
                state.phase = Phase::Error;
                state.user = None;
                state.error = Some(e.to_string());
                drop(state);
                self.unauthenticated_outcome()
            }
        }
    }

    /// Get the current user, served from the request-scoped cache.
    ///
    /// Returns `None` without a network call when the session is not
    /// authenticated.
    pub async fn current_user(&self) -> Result<Option<UserRecord>> {
        if self.phase() != Phase::Authenticated {
            return Ok(None);
        }
        Ok(self.load_profile(false).await?)
    }

    /// Send a verification code to an email address or phone number.
    pub async fn request_code(&self, identifier: &str) -> Result<()> {
        self.client.auth().send_code(identifier).await?;
        Ok(())
    }

    /// Verify a code and establish the session.
    ///
    /// On success the token pair and user record are persisted and the
    /// in-memory state becomes authenticated. Failures propagate to the
    /// caller.
    pub async fn login(&self, identifier: &str, code: &str) -> Result<VerifyResponse> {
        let response = self.client.auth().verify_code(identifier, code).await?;
        self.establish(&response).await;
        Ok(response)
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Returns `Ok(None)` without a network call when no refresh token
    /// is stored.
    pub async fn refresh_session(&self) -> Result<Option<VerifyResponse>> {
        let Some(refresh_token) = self.store.stored_refresh_token() else {
            return Ok(None);
        };

        let response = self.client.auth().refresh_token(&refresh_token).await?;
        self.establish(&response).await;
        Ok(Some(response))
    }

    /// Clear the session: credentials, bearer token, and state.
    ///
    /// Synchronous; no network call is made. Cached profile data is
    /// unreachable afterwards because the session is no longer
    /// authenticated.
    pub fn logout(&self) {
        self.store.clear();
        self.client.set_auth_token(None);
        let mut state = self.state.write();
        state.phase = Phase::Unauthenticated;
        state.user = None;
        state.error = None;
        info!("session logged out");
    }

    /// Persist a verify/refresh response and mark the session
    /// authenticated.
    async fn establish(&self, response: &VerifyResponse) {
        let token = CredentialToken {
            token: response.token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at: now_millis() + response.expires_in.saturating_mul(1000),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.store.set_token(&token);
        self.store.set_user(&response.user);
        self.client.set_auth_token(Some(response.token.clone()));

        // A previous identity may still be cached.
        self.profile.cache().clear().await;

        let mut state = self.state.write();
        state.phase = Phase::Authenticated;
        state.user = Some(response.user.clone());
        state.error = None;
    }

    /// Load the profile, treating auth-shaped rejections as absent.
    async fn load_profile(
        &self,
        force: bool,
    ) -> fortuna_cache::Result<Option<UserRecord>> {
        let options = FetchOptions::get();
        let result: fortuna_cache::Result<Option<UserRecord>> = if force {
            self.profile.force_fetch(PROFILE_RESOURCE, &options).await
        } else {
            self.profile.fetch(PROFILE_RESOURCE, &options).await
        };

        match result {
            Ok(user) => Ok(user),
            // Absent identity is a policy outcome, not an error.
            Err(fortuna_cache::Error::Status {
                status: 401 | 404, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn unauthenticated_outcome(&self) -> Bootstrap {
        if self.config.require_auth {
            Bootstrap::RedirectTo(self.config.login_redirect.clone())
        } else {
            Bootstrap::Anonymous
        }
    }
}
