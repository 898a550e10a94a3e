//! The two-step payment workflow state machine.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use fortuna_client::FortunaClient;

use crate::navigator::Navigator;

/// Generic message when the server reports a failure without one.
const GENERIC_FAILURE: &str = "payment could not be started";

/// Subscription plan selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Billed monthly.
    Monthly,
    /// Billed yearly.
    Yearly,
}

/// Configuration mapping plans to product identifiers.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Product ID for the monthly plan.
    pub monthly_product_id: String,

    /// Product ID for the yearly plan.
    pub yearly_product_id: String,
}

impl PaymentConfig {
    /// Create a config with explicit product IDs.
    pub fn new(monthly: impl Into<String>, yearly: impl Into<String>) -> Self {
        Self {
            monthly_product_id: monthly.into(),
            yearly_product_id: yearly.into(),
        }
    }

    /// The product ID for a plan.
    pub fn product_id(&self, plan: Plan) -> &str {
        match plan {
            Plan::Monthly => &self.monthly_product_id,
            Plan::Yearly => &self.yearly_product_id,
        }
    }
}

/// Observable state of the payment workflow.
///
/// At most one of `is_processing` and `success` is true; `error` is
/// non-null only when both are false.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentState {
    /// A workflow run is in flight.
    pub is_processing: bool,

    /// User-visible message from the last failed run.
    pub error: Option<String>,

    /// The last run completed and navigation was issued.
    pub success: bool,
}

/// Outcome of one workflow run.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Both calls succeeded and the navigator was handed this URL.
    Redirected(String),
    /// The workflow stopped; the message is also in
    /// [`PaymentState::error`].
    Failed(String),
}

/// Error for calls that never enter the workflow.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// A run is already in flight; the new call was rejected without
    /// touching its state.
    #[error("a payment is already in progress")]
    InFlight,
}

/// Orchestrates the two-step checkout: create order, request payment
/// session, redirect.
///
/// Within one run the order call strictly precedes the payment call.
/// Overlapping runs are serialized: a second
/// [`initiate_payment`](PaymentOrchestrator::initiate_payment) while
/// one is processing is rejected with [`PaymentError::InFlight`].
pub struct PaymentOrchestrator<N> {
    client: FortunaClient,
    navigator: N,
    config: PaymentConfig,
    state: Mutex<PaymentState>,
}

impl<N: Navigator> PaymentOrchestrator<N> {
    /// Create an orchestrator over a client and navigator.
    pub fn new(client: FortunaClient, navigator: N, config: PaymentConfig) -> Self {
        Self {
            client,
            navigator,
            config,
            state: Mutex::new(PaymentState::default()),
        }
    }

    /// Get a state snapshot.
    pub fn state(&self) -> PaymentState {
        self.state.lock().clone()
    }

    /// Clear only the error field.
    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    /// Return to the idle shape, whatever the prior state.
    pub fn reset(&self) {
        *self.state.lock() = PaymentState::default();
    }

    /// Run the checkout workflow for a plan.
    ///
    /// On success the navigator is invoked with the payment URL before
    /// this returns; the redirect is terminal and no further state
    /// transition is expected to be observed. All API and transport
    /// failures land in [`PaymentState::error`] and the
    /// [`PaymentOutcome::Failed`] message rather than an `Err`.
    pub async fn initiate_payment(&self, plan: Plan) -> Result<PaymentOutcome, PaymentError> {
        {
            let mut state = self.state.lock();
            if state.is_processing {
                warn!("rejecting overlapping payment initiation");
                return Err(PaymentError::InFlight);
            }
            *state = PaymentState {
                is_processing: true,
                error: None,
                success: false,
            };
        }

        match self.run_workflow(plan).await {
            Ok(url) => {
                info!(url = %url, "payment session ready, redirecting");
                *self.state.lock() = PaymentState {
                    is_processing: false,
                    error: None,
                    success: true,
                };
                self.navigator.navigate(&url);
                Ok(PaymentOutcome::Redirected(url))
            }
            Err(message) => {
                warn!(message = %message, "payment workflow failed");
                *self.state.lock() = PaymentState {
                    is_processing: false,
                    error: Some(message.clone()),
                    success: false,
                };
                Ok(PaymentOutcome::Failed(message))
            }
        }
    }

    /// The two sequential calls; any failure becomes the user-facing
    /// message.
    async fn run_workflow(&self, plan: Plan) -> Result<String, String> {
        let product_id = self.config.product_id(plan);
        debug!(product_id = %product_id, "creating order");

        let envelope = self
            .client
            .orders()
            .create(product_id)
            .await
            .map_err(|e| e.to_string())?;
        if let Some(err) = envelope.error {
            return Err(err.message);
        }
        let order = envelope.data.ok_or_else(|| GENERIC_FAILURE.to_string())?;

        debug!(order_id = %order.id, "requesting payment session");
        let envelope = self
            .client
            .payments()
            .request(&order.id)
            .await
            .map_err(|e| e.to_string())?;
        if let Some(err) = envelope.error {
            return Err(err.message);
        }

        envelope
            .data
            .and_then(|session| session.request_url)
            .ok_or_else(|| GENERIC_FAILURE.to_string())
    }
}
