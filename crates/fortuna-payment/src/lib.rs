//! Checkout orchestration for Fortuna subscriptions.
//!
//! Drives the two-step payment workflow: create an order for the
//! selected plan, request a payment session for it, then hand the
//! session URL to a [`Navigator`] for the terminal redirect out of the
//! application. Every failure along the way is normalized into the
//! observable [`PaymentState`]; nothing escapes as an unhandled error.

mod navigator;
mod orchestrator;

pub use navigator::{Navigator, RecordingNavigator};
pub use orchestrator::{
    PaymentConfig, PaymentError, PaymentOrchestrator, PaymentOutcome, PaymentState, Plan,
};
