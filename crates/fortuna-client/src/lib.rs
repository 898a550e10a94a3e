//! HTTP client SDK for the Fortuna service API.
//!
//! This crate provides a typed client for the remote endpoints the
//! Fortuna front end consumes: verification-code auth, profile loads,
//! order creation, and payment-session requests.
//!
//! # Example
//!
//! ```no_run
//! use fortuna_client::{FortunaClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = FortunaClient::builder()
//!     .base_url("https://api.example.com")
//!     .build()?;
//!
//! client.auth().send_code("user@example.com").await?;
//! let verified = client.auth().verify_code("user@example.com", "123456").await?;
//! client.set_auth_token(Some(verified.token.clone()));
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: send verification code, verify code, refresh token
//! - **Orders**: create a subscription order
//! - **Payments**: request a payment session for an order
//! - **Profile**: loaded through the [`fortuna_cache::Fetcher`]
//!   implementation so reads can go through the caching layer

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, FortunaClient};
pub use error::{Error, Result};
pub use types::*;
