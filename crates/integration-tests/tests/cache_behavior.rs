//! Integration tests for response caching and invalidation.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data applied
//! - The storefront server running (cargo run -p marigold-storefront)
//!
//! Run with: cargo test -p marigold-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use marigold_integration_tests::{
    client, login, product_id_by_slug, put_cart, storefront_base_url, unique_email,
};

// ============================================================================
// Freshness headers
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_catalog_reads_carry_cache_control() {
    let client = client();
    let base_url = storefront_base_url();

    for path in ["/", "/products", "/products/ceramic-mug", "/collections"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to fetch");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");

        let cache_control = resp
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        assert!(
            cache_control.contains("max-age="),
            "{path} missing max-age: {cache_control}"
        );
        assert!(
            cache_control.contains("stale-while-revalidate="),
            "{path} missing stale-while-revalidate: {cache_control}"
        );
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_product_listing_miss_then_hit() {
    let client = client();
    let base_url = storefront_base_url();

    let x_cache = |resp: &reqwest::Response| {
        resp.headers()
            .get("x-cache")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    // Whatever the first response says, the repeat within TTL must be a hit.
    let first = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to fetch products");
    assert_eq!(first.status(), StatusCode::OK);
    let _ = x_cache(&first);

    let second = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to fetch products");
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(x_cache(&second), "hit");
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_missing_product_is_not_cached_as_ok() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products/no-such-product"))
        .send()
        .await
        .expect("Failed to fetch");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Invalidation precision
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_cart_update_invalidates_own_summary_only() {
    let base_url = storefront_base_url();

    // Two independent sessions.
    let alice = client();
    login(&alice, &unique_email("alice")).await;
    let bob = client();
    login(&bob, &unique_email("bob")).await;

    let mug = product_id_by_slug(&alice, "ceramic-mug").await;
    let tote = product_id_by_slug(&alice, "canvas-tote").await;

    put_cart(&alice, json!([{ "product_id": mug, "quantity": 1, "variant": null }])).await;
    put_cart(&bob, json!([{ "product_id": tote, "quantity": 3, "variant": null }])).await;

    // Warm both summaries.
    let summary = |client: &reqwest::Client| {
        let url = format!("{base_url}/checkout/summary");
        let client = client.clone();
        async move {
            let resp = client.get(url).send().await.expect("Failed to fetch summary");
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json::<Value>().await.expect("Failed to parse summary")
        }
    };

    let alice_before = summary(&alice).await;
    let bob_before = summary(&bob).await;
    assert_eq!(alice_before["lines"][0]["quantity"], json!(1));
    assert_eq!(bob_before["lines"][0]["quantity"], json!(3));

    // Alice mutates her cart; only her summary may change.
    put_cart(&alice, json!([{ "product_id": mug, "quantity": 5, "variant": null }])).await;

    let alice_after = summary(&alice).await;
    let bob_after = summary(&bob).await;
    assert_eq!(
        alice_after["lines"][0]["quantity"],
        json!(5),
        "alice's summary must reflect her update immediately"
    );
    assert_eq!(
        bob_after, bob_before,
        "bob's cached summary must be untouched"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_cart_view_tracks_updates() {
    let base_url = storefront_base_url();

    let client = client();
    login(&client, &unique_email("cart-view")).await;

    let mug = product_id_by_slug(&client, "ceramic-mug").await;
    put_cart(&client, json!([{ "product_id": mug, "quantity": 2, "variant": null }])).await;

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(2));

    // The PUT response already reflects the new state, and the cached GET
    // must too (the mutation invalidated the cart key).
    put_cart(&client, json!([{ "product_id": mug, "quantity": 7, "variant": null }])).await;

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(7));
}
