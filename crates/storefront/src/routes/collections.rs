//! Collection route handlers.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cache::{FreshnessPolicy, keys};
use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::models::{Collection, Product};
use crate::state::AppState;

use super::cached_json;

/// A collection together with its products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDetail {
    pub collection: Collection,
    pub products: Vec<Product>,
}

/// List collections.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::LISTING;
    let key = keys::collection_list();

    let (collections, status) = state
        .cache()
        .read_through(&key, policy, || async {
            CatalogRepository::new(state.pool())
                .list_collections()
                .await
                .map_err(AppError::from)
        })
        .await?;

    Ok(cached_json(policy, status, collections).into_response())
}

/// Show a collection and its products.
#[instrument(skip(state), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::ENTITY;
    let key = keys::collection(&slug);

    let (detail, status): (CollectionDetail, _) = state
        .cache()
        .read_through(&key, policy, || async {
            let catalog = CatalogRepository::new(state.pool());

            let collection = catalog
                .get_collection_by_slug(&slug)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound(format!("collection: {slug}")))?;

            let products = catalog
                .products_in_collection(collection.id)
                .await
                .map_err(AppError::from)?;

            Ok::<_, AppError>(CollectionDetail {
                collection,
                products,
            })
        })
        .await?;

    Ok(cached_json(policy, status, detail).into_response())
}
