//! Credential persistence and authentication session bootstrap.
//!
//! This crate owns the client-side identity state:
//! - [`CredentialStore`] persists one token record and one user record
//!   through a pluggable [`CredentialStorage`] backend, with
//!   expiry-aware reads that cascade an invalid token into clearing the
//!   paired user record
//! - [`AuthSession`] bootstraps identity two ways: a synchronous local
//!   hydrate for immediate UI state, and an eager remote force-refresh
//!   that never trusts stale local state on a fresh page load
//!
//! Storage failures never surface to callers: a broken or absent
//! backend degrades every credential operation to "no session".

mod credentials;
mod error;
mod session;
mod storage;

pub use credentials::{CredentialStore, CredentialToken, TOKEN_KEY, USER_KEY};
pub use error::{Error, Result};
pub use session::{AuthSession, AuthState, Bootstrap, Phase, SessionConfig};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage};
