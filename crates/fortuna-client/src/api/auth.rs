//! Auth API.

use crate::client::FortunaClient;
use crate::error::Result;
use crate::types::{RefreshTokenRequest, SendCodeRequest, VerifyCodeRequest, VerifyResponse};

/// Auth API client.
pub struct AuthApi {
    client: FortunaClient,
}

impl AuthApi {
    pub(crate) fn new(client: FortunaClient) -> Self {
        Self { client }
    }

    /// Send a verification code to an email address or phone number.
    pub async fn send_code(&self, email_or_phone: &str) -> Result<()> {
        let request = SendCodeRequest {
            email_or_phone: email_or_phone.to_string(),
        };
        self.client.post_empty("auth/send-code", &request).await
    }

    /// Verify a code, exchanging it for a token pair and user record.
    pub async fn verify_code(&self, email_or_phone: &str, code: &str) -> Result<VerifyResponse> {
        let request = VerifyCodeRequest {
            email_or_phone: email_or_phone.to_string(),
            code: code.to_string(),
        };
        self.client.post("auth/verify-code", &request).await
    }

    /// Exchange a refresh token for a fresh token pair.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<VerifyResponse> {
        let request = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.client.post("auth/refresh", &request).await
    }
}
