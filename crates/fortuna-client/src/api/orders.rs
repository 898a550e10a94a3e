//! Orders API.

use crate::client::FortunaClient;
use crate::error::Result;
use crate::types::{ApiEnvelope, BuyerSubscription, CreateOrderRequest, Order};

/// Orders API client.
pub struct OrdersApi {
    client: FortunaClient,
}

impl OrdersApi {
    pub(crate) fn new(client: FortunaClient) -> Self {
        Self { client }
    }

    /// Create a subscription order for a product.
    ///
    /// Business failures arrive inside the envelope, not as an HTTP
    /// error status.
    pub async fn create(&self, product_id: &str) -> Result<ApiEnvelope<Order>> {
        let request = CreateOrderRequest {
            buyer_subscription: BuyerSubscription {
                product_id: product_id.to_string(),
            },
        };
        self.client.post("orders", &request).await
    }
}
