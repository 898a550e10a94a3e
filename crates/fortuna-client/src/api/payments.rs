//! Payments API.

use crate::client::FortunaClient;
use crate::error::Result;
use crate::types::{ApiEnvelope, PaymentRequest, PaymentSession};

/// Payments API client.
pub struct PaymentsApi {
    client: FortunaClient,
}

impl PaymentsApi {
    pub(crate) fn new(client: FortunaClient) -> Self {
        Self { client }
    }

    /// Request a payment session for a created order.
    ///
    /// Business failures arrive inside the envelope, not as an HTTP
    /// error status.
    pub async fn request(&self, order_id: &str) -> Result<ApiEnvelope<PaymentSession>> {
        let request = PaymentRequest {
            order_id: order_id.to_string(),
        };
        self.client.post("payments/request", &request).await
    }
}
