//! Pet shop listing handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use pup_market_core::ShopId;

use crate::catalog::{ShopDetail, ShopView};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List every pet shop.
pub async fn index(State(state): State<AppState>) -> Result<Json<Arc<Vec<ShopView>>>> {
    Ok(Json(state.catalog().shops().await?))
}

/// Show a single pet shop with the puppies it lists.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ShopId>,
) -> Result<Json<ShopDetail>> {
    state
        .catalog()
        .shop(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Pet shop not found".to_string()))
}
