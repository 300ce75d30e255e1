//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Homepage aggregate (cached, short TTL)
//! GET  /health                  - Health check
//!
//! # Catalog (cached, Cache-Control on success)
//! GET  /products                - Product listing
//! GET  /products/{slug}         - Product detail
//! GET  /collections             - Collection listing
//! GET  /collections/{slug}      - Collection detail with products
//!
//! # Cart
//! GET  /cart                    - Cart view (cached per user)
//! PUT  /cart                    - Replace cart items (invalidates cart/checkout keys)
//!
//! # Checkout
//! GET  /checkout/summary        - Checkout summary (cached per user)
//! POST /checkout                - Submit checkout (creates pending order)
//!
//! # Orders
//! GET  /orders                  - Order history (cached per user)
//! GET  /orders/{number}         - Order detail
//!
//! # Payments
//! POST /payments/verify         - Confirm a payment (idempotent)
//! POST /payments/failed         - Mark a pending payment as failed
//!
//! # Auth
//! POST /auth/login              - Establish a session
//! POST /auth/logout             - End the session
//!
//! # Internal
//! POST /internal/cache/purge    - Drop both cache tiers (token-guarded)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod collections;
pub mod home;
pub mod internal;
pub mod orders;
pub mod payments;
pub mod products;

use axum::{
    Json, Router,
    http::{HeaderName, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use crate::cache::{CacheStatus, FreshnessPolicy};
use crate::state::AppState;

/// JSON response carrying the policy's `Cache-Control` freshness metadata
/// and an `x-cache` hit/miss tag.
pub(crate) fn cached_json<T: Serialize>(
    policy: FreshnessPolicy,
    status: CacheStatus,
    value: T,
) -> impl IntoResponse {
    (
        [
            (header::CACHE_CONTROL, policy.header_value()),
            (
                HeaderName::from_static("x-cache"),
                status.header_value().to_string(),
            ),
        ],
        Json(value),
    )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{slug}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/", get(cart::show).put(cart::update))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::submit))
        .route("/summary", get(checkout::summary))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{number}", get(orders::show))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(payments::verify))
        .route("/failed", post(payments::failed))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the internal routes router.
pub fn internal_routes() -> Router<AppState> {
    Router::new().route("/cache/purge", post(internal::purge_cache))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Homepage
        .route("/", get(home::home))
        // Catalog routes
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Order routes
        .nest("/orders", order_routes())
        // Payment routes
        .nest("/payments", payment_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Internal routes
        .nest("/internal", internal_routes())
}
