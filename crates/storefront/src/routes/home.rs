//! Homepage route handler.
//!
//! The homepage aggregate is the hottest read in the system and the reason
//! the short-TTL freshness class exists: the featured sample is randomized,
//! so the cached payload rotates every TTL window instead of every request.

use axum::{
    extract::State,
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

/// Number of products sampled for the featured rail.
const FEATURED_SAMPLE_SIZE: i64 = 8;

/// Homepage aggregate payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePayload {
    pub featured: Vec<Product>,
    pub trending_collections: Vec<Collection>,
}

/// Homepage aggregate: randomized featured products plus trending
/// collections.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::LISTING;
    let key = keys::home();

    let (payload, status): (HomePayload, _) = state
        .cache()
        .read_through(&key, policy, || async {
            let catalog = CatalogRepository::new(state.pool());

            let featured = catalog
                .sample_products(FEATURED_SAMPLE_SIZE)
                .await
                .map_err(AppError::from)?;

            let trending_ids = catalog
                .trending_collection_ids()
                .await
                .map_err(AppError::from)?;
            let trending_collections = catalog
                .get_collections_by_ids(&trending_ids)
                .await
                .map_err(AppError::from)?;

            Ok::<_, AppError>(HomePayload {
                featured,
                trending_collections,
            })
        })
        .await?;

    Ok(cached_json(policy, status, payload).into_response())
}
