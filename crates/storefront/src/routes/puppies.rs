//! Puppy listing handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use pup_market_core::PuppyId;

use crate::catalog::PuppyView;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List every available puppy with its shop attached.
pub async fn index(State(state): State<AppState>) -> Result<Json<Arc<Vec<PuppyView>>>> {
    Ok(Json(state.catalog().puppies().await?))
}

/// Show a single puppy.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<PuppyId>,
) -> Result<Json<PuppyView>> {
    state
        .catalog()
        .puppy(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Puppy not found".to_string()))
}
