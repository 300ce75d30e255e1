//! Integration tests for Marigold.
//!
//! # Running Tests
//!
//! These tests require a running storefront with a migrated, seeded
//! database:
//!
//! ```bash
//! cargo run -p marigold-cli -- migrate
//! cargo run -p marigold-cli -- seed
//! cargo run -p marigold-storefront &
//!
//! cargo test -p marigold-integration-tests -- --ignored
//! ```
//!
//! The tests sign payment confirmations themselves, so `RAZORPAY_KEY_SECRET`
//! must match the running server's configuration.

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::{Value, json};
use sha2::Sha256;
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client with a cookie store (sessions ride on cookies).
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email per test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.test", Uuid::new_v4().simple())
}

/// Establish a session; returns the user ID.
///
/// # Panics
///
/// Panics when the login request fails.
pub async fn login(client: &Client, email: &str) -> i64 {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to log in");

    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse login response");
    body["userId"].as_i64().expect("login response has userId")
}

/// Replace the session user's cart with the given items.
///
/// # Panics
///
/// Panics when the cart update fails.
pub async fn put_cart(client: &Client, items: Value) {
    let base_url = storefront_base_url();
    let resp = client
        .put(format!("{base_url}/cart"))
        .json(&json!({ "items": items }))
        .send()
        .await
        .expect("Failed to update cart");

    assert!(
        resp.status().is_success(),
        "cart update failed: {}",
        resp.status()
    );
}

/// Submit checkout for the session user; returns the response body.
///
/// # Panics
///
/// Panics when the checkout submission fails.
pub async fn submit_checkout(client: &Client, provider_order_ref: &str) -> Value {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({ "providerOrderRef": provider_order_ref }))
        .send()
        .await
        .expect("Failed to submit checkout");

    assert!(
        resp.status().is_success(),
        "checkout failed: {}",
        resp.status()
    );

    resp.json().await.expect("Failed to parse checkout response")
}

/// Look up a seeded product's ID by slug.
///
/// # Panics
///
/// Panics when the product cannot be fetched.
pub async fn product_id_by_slug(client: &Client, slug: &str) -> i64 {
    let base_url = storefront_base_url();
    let resp = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to fetch product");

    assert!(resp.status().is_success(), "product {slug} not found");

    let body: Value = resp.json().await.expect("Failed to parse product");
    body["id"].as_i64().expect("product has id")
}

/// Sign a payment confirmation the way the provider would.
///
/// Reads `RAZORPAY_KEY_SECRET`, which must match the server's secret.
///
/// # Panics
///
/// Panics when `RAZORPAY_KEY_SECRET` is not set.
#[must_use]
pub fn sign_payment(provider_order_ref: &str, provider_payment_ref: &str) -> String {
    let secret =
        std::env::var("RAZORPAY_KEY_SECRET").expect("RAZORPAY_KEY_SECRET must be set for tests");

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("valid key length");
    mac.update(format!("{provider_order_ref}|{provider_payment_ref}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A fresh provider order reference for one checkout.
#[must_use]
pub fn unique_provider_order_ref() -> String {
    format!("order_{}", Uuid::new_v4().simple())
}
