//! Product route handlers.
//!
//! All reads go through the response cache and attach `Cache-Control`
//! freshness metadata on success.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::cache::{FreshnessPolicy, keys};
use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

use super::cached_json;

/// Page size for the product listing.
const PRODUCT_PAGE_SIZE: i64 = 50;

/// List products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::LISTING;
    let key = keys::product_list();

    let (products, status) = state
        .cache()
        .read_through(&key, policy, || async {
            CatalogRepository::new(state.pool())
                .list_products(PRODUCT_PAGE_SIZE)
                .await
                .map_err(AppError::from)
        })
        .await?;

    Ok(cached_json(policy, status, products).into_response())
}

/// Show a single product by slug.
#[instrument(skip(state), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::ENTITY;
    let key = keys::product(&slug);

    let (product, status): (Product, _) = state
        .cache()
        .read_through(&key, policy, || async {
            CatalogRepository::new(state.pool())
                .get_product_by_slug(&slug)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound(format!("product: {slug}")))
        })
        .await?;

    Ok(cached_json(policy, status, product).into_response())
}
