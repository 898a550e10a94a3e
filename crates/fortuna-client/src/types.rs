//! Request and response types for the Fortuna API.
//!
//! These types mirror the server's API contract. Wire names are
//! camelCase.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// A user profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User ID.
    pub id: String,
    /// Email address, if registered with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number, if registered with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Request to send a verification code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeRequest {
    /// Email address or phone number to deliver the code to.
    pub email_or_phone: String,
}

/// Request to verify a code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    /// The identifier the code was sent to.
    pub email_or_phone: String,
    /// The code the user entered.
    pub code: String,
}

/// Request to exchange a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The refresh token issued alongside the access token.
    pub refresh_token: String,
}

/// Response from code verification and token refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Access token.
    pub token: String,
    /// Refresh token for renewing the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, relative to issuance.
    pub expires_in: u64,
    /// The authenticated user.
    pub user: UserRecord,
    /// Whether the account still needs further verification.
    #[serde(default)]
    pub requires_verification: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a subscription order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Subscription selection for the buyer.
    pub buyer_subscription: BuyerSubscription,
}

/// Subscription plan selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSubscription {
    /// Product identifier of the selected plan.
    pub product_id: String,
}

/// A created order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID, used to request the payment session.
    pub id: String,
    /// Order status, if the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Request for a payment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// The order to pay for.
    pub order_id: String,
}

/// A payment session pointing at the external payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    /// URL of the external payment page to navigate to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Data-or-error envelope used by the order and payment endpoints.
///
/// These endpoints report business failures in the body of a success
/// response rather than through the HTTP status.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Payload on success.
    #[serde(default)]
    pub data: Option<T>,
    /// Error payload on failure.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error payload inside an [`ApiEnvelope`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable failure message.
    pub message: String,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope into its payload.
    ///
    /// An error payload wins over data; an envelope with neither is a
    /// missing-field error.
    pub fn into_data(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(Error::Api {
                status: 200,
                message: err.message,
            });
        }
        self.data.ok_or(Error::MissingField("data"))
    }
}
