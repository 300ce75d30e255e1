//! Integration tests for the payment confirmation path.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data applied
//! - The storefront server running (cargo run -p marigold-storefront)
//! - `RAZORPAY_KEY_SECRET` matching the server's configuration
//!
//! Run with: cargo test -p marigold-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use marigold_integration_tests::{
    client, login, product_id_by_slug, put_cart, sign_payment, submit_checkout, unique_email,
    unique_provider_order_ref,
};

/// Set up a logged-in session with a one-line cart and a submitted checkout.
/// Returns (client, provider order ref, order number).
async fn checkout_fixture(test: &str) -> (reqwest::Client, String, String) {
    let client = client();
    login(&client, &unique_email(test)).await;

    let product_id = product_id_by_slug(&client, "ceramic-mug").await;
    put_cart(
        &client,
        json!([{ "product_id": product_id, "quantity": 2, "variant": null }]),
    )
    .await;

    let provider_order_ref = unique_provider_order_ref();
    let order = submit_checkout(&client, &provider_order_ref).await;
    let order_number = order["orderNumber"]
        .as_str()
        .expect("checkout returns orderNumber")
        .to_string();

    (client, provider_order_ref, order_number)
}

async fn verify_payment(
    client: &reqwest::Client,
    provider_order_ref: &str,
    provider_payment_ref: &str,
    signature: &str,
) -> reqwest::Response {
    let base_url = marigold_integration_tests::storefront_base_url();
    client
        .post(format!("{base_url}/payments/verify"))
        .json(&json!({
            "providerOrderRef": provider_order_ref,
            "providerPaymentRef": provider_payment_ref,
            "providedSignature": signature,
        }))
        .send()
        .await
        .expect("Failed to call /payments/verify")
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_confirmation_is_idempotent() {
    let (client, order_ref, order_number) = checkout_fixture("idempotent").await;
    let signature = sign_payment(&order_ref, "pay_123");

    // First call wins the transition.
    let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["alreadyProcessed"], json!(false));
    assert_eq!(body["orderNumber"], json!(order_number.clone()));

    // The duplicate succeeds too, flagged as already processed.
    let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["alreadyProcessed"], json!(true));
    assert_eq!(body["orderNumber"], json!(order_number));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_confirmation_clears_cart_and_checkout_cache() {
    let (client, order_ref, _) = checkout_fixture("side-effects").await;
    let base_url = marigold_integration_tests::storefront_base_url();

    // Warm the per-user caches before confirming.
    for path in ["/checkout/summary", "/cart"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to warm cache");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let signature = sign_payment(&order_ref, "pay_123");
    let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Cart is empty and the cached views reflect it immediately: the
    // confirmation invalidated the user's cart/checkout keys.
    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(0), "cart should be cleared: {cart}");

    let summary: Value = client
        .get(format!("{base_url}/checkout/summary"))
        .send()
        .await
        .expect("Failed to fetch summary")
        .json()
        .await
        .expect("Failed to parse summary");
    assert_eq!(
        summary["lines"].as_array().map(Vec::len),
        Some(0),
        "checkout summary should be recomputed empty: {summary}"
    );
}

// ============================================================================
// Exactly-once under concurrency
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_concurrent_confirmations_have_one_winner() {
    let (client, order_ref, _) = checkout_fixture("concurrent").await;
    let signature = sign_payment(&order_ref, "pay_123");

    const CALLS: usize = 8;

    let mut handles = Vec::with_capacity(CALLS);
    for _ in 0..CALLS {
        let client = client.clone();
        let order_ref = order_ref.clone();
        let signature = signature.clone();
        handles.push(tokio::spawn(async move {
            let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = resp.json().await.expect("Failed to parse response");
            body["alreadyProcessed"]
                .as_bool()
                .expect("response has alreadyProcessed")
        }));
    }

    let mut winners = 0;
    for handle in handles {
        let already_processed = handle.await.expect("task panicked");
        if !already_processed {
            winners += 1;
        }
    }

    assert_eq!(winners, 1, "exactly one call must win the transition");
}

// ============================================================================
// Signature rejection
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_invalid_signature_changes_nothing() {
    let (client, order_ref, order_number) = checkout_fixture("bad-signature").await;
    let base_url = marigold_integration_tests::storefront_base_url();

    // Tamper with one character of a valid signature.
    let mut signature = sign_payment(&order_ref, "pay_123");
    let last = signature.pop().expect("signature is non-empty");
    signature.push(if last == '0' { '1' } else { '0' });

    // Retry a few times; no attempt may change state.
    for _ in 0..3 {
        let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let order: Value = client
        .get(format!("{base_url}/orders/{order_number}"))
        .send()
        .await
        .expect("Failed to fetch order")
        .json()
        .await
        .expect("Failed to parse order");
    assert_eq!(order["payment_status"], json!("pending"));
    assert_eq!(order["order_status"], json!("pending"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_missing_fields_rejected() {
    let (client, order_ref, _) = checkout_fixture("missing-fields").await;

    let resp = verify_payment(&client, &order_ref, "pay_123", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = verify_payment(&client, &order_ref, "", "sig").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_unknown_order_is_not_found() {
    let client = client();
    login(&client, &unique_email("unknown-order")).await;

    let order_ref = unique_provider_order_ref();
    let signature = sign_payment(&order_ref, "pay_123");

    let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Failure path
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_mark_failed_cancels_pending_order() {
    let (client, order_ref, order_number) = checkout_fixture("mark-failed").await;
    let base_url = marigold_integration_tests::storefront_base_url();

    let resp = client
        .post(format!("{base_url}/payments/failed"))
        .json(&json!({ "providerOrderRef": order_ref }))
        .send()
        .await
        .expect("Failed to call /payments/failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let order: Value = client
        .get(format!("{base_url}/orders/{order_number}"))
        .send()
        .await
        .expect("Failed to fetch order")
        .json()
        .await
        .expect("Failed to parse order");
    assert_eq!(order["payment_status"], json!("failed"));
    assert_eq!(order["order_status"], json!("cancelled"));

    // A completed order cannot be failed afterwards; and a failed order
    // cannot be confirmed.
    let signature = sign_payment(&order_ref, "pay_123");
    let resp = verify_payment(&client, &order_ref, "pay_123", &signature).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
