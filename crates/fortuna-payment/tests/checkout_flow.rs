//! Checkout workflow tests against a mock API.

use std::sync::Arc;
use std::time::Duration;

use fortuna_client::FortunaClient;
use fortuna_payment::{
    PaymentConfig, PaymentError, PaymentOrchestrator, PaymentOutcome, PaymentState, Plan,
    RecordingNavigator,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator_for(server: &MockServer) -> PaymentOrchestrator<Arc<RecordingNavigator>> {
    let client = FortunaClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    PaymentOrchestrator::new(
        client,
        Arc::new(RecordingNavigator::new()),
        PaymentConfig::new("plan-monthly", "plan-yearly"),
    )
}

#[tokio::test]
async fn test_full_success_redirects_to_payment_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json(serde_json::json!({
            "buyerSubscription": {"productId": "plan-yearly"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"id": "o1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/payments/request"))
        .and(body_json(serde_json::json!({"orderId": "o1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"requestUrl": "https://pay/x"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FortunaClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    let nav = Arc::new(RecordingNavigator::new());
    let orchestrator = PaymentOrchestrator::new(
        client,
        nav.clone(),
        PaymentConfig::new("plan-monthly", "plan-yearly"),
    );

    let outcome = orchestrator.initiate_payment(Plan::Yearly).await.unwrap();

    assert_eq!(outcome, PaymentOutcome::Redirected("https://pay/x".to_string()));
    assert_eq!(
        orchestrator.state(),
        PaymentState {
            is_processing: false,
            error: None,
            success: true,
        }
    );
    assert_eq!(nav.recorded(), vec!["https://pay/x"]);
}

#[tokio::test]
async fn test_order_failure_short_circuits_payment_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"message": "card declined"}
        })))
        .mount(&server)
        .await;

    // The payment endpoint must never be reached.
    Mock::given(method("POST"))
        .and(path("/api/payments/request"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let outcome = orchestrator.initiate_payment(Plan::Monthly).await.unwrap();

    assert_eq!(outcome, PaymentOutcome::Failed("card declined".to_string()));
    assert_eq!(
        orchestrator.state(),
        PaymentState {
            is_processing: false,
            error: Some("card declined".to_string()),
            success: false,
        }
    );
}

#[tokio::test]
async fn test_order_without_data_fails_generically() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/payments/request"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let outcome = orchestrator.initiate_payment(Plan::Monthly).await.unwrap();

    assert!(matches!(outcome, PaymentOutcome::Failed(_)));
    assert!(orchestrator.state().error.is_some());
}

#[tokio::test]
async fn test_missing_request_url_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"id": "o1"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/payments/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {}
        })))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let outcome = orchestrator.initiate_payment(Plan::Monthly).await.unwrap();

    assert!(matches!(outcome, PaymentOutcome::Failed(_)));
    let state = orchestrator.state();
    assert!(!state.success);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_transport_failure_is_normalized_into_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let outcome = orchestrator.initiate_payment(Plan::Monthly).await.unwrap();

    let PaymentOutcome::Failed(message) = outcome else {
        panic!("expected failure outcome");
    };
    assert!(message.contains("500"));
    assert_eq!(orchestrator.state().error, Some(message));
}

#[tokio::test]
async fn test_reset_returns_idle_from_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"message": "card declined"}
        })))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    orchestrator.initiate_payment(Plan::Monthly).await.unwrap();
    assert!(orchestrator.state().error.is_some());

    orchestrator.reset();
    assert_eq!(orchestrator.state(), PaymentState::default());
}

#[tokio::test]
async fn test_overlapping_initiation_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"id": "o1"}}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/payments/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"requestUrl": "https://pay/x"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Arc::new(orchestrator_for(&server));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.initiate_payment(Plan::Yearly).await })
    };

    // Let the first call reach the delayed order endpoint.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = orchestrator.initiate_payment(Plan::Yearly).await;
    assert!(matches!(second, Err(PaymentError::InFlight)));

    // The rejected call left the running one untouched.
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome, PaymentOutcome::Redirected("https://pay/x".to_string()));
    assert!(orchestrator.state().success);
}
