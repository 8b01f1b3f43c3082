//! Spoilage API Handlers

use axum::{Json, extract::State};
use shared::models::{Spoilage, SpoilageCreate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::inventory::spoilage;
use crate::utils::AppResult;
use crate::utils::validation::{ValidJson, ValidPath};

/// GET /api/spoilage - 报损记录 (最新在前)
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Spoilage>>> {
    Ok(Json(spoilage::list(&state.pool, user.restaurant_id()?).await?))
}

/// GET /api/spoilage/{id} - 获取报损记录
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Spoilage>> {
    Ok(Json(spoilage::get(&state.pool, user.restaurant_id()?, id).await?))
}

/// POST /api/spoilage - 报损 (库存不足返回 400)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<SpoilageCreate>,
) -> AppResult<Json<Spoilage>> {
    let record = spoilage::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(
        spoilage_id = record.id,
        item_id = record.item_id,
        quantity = record.spoiled_quantity,
        loss = record.total_loss_value,
        "Spoilage recorded"
    );
    Ok(Json(record))
}

/// DELETE /api/spoilage/{id} - 删除报损记录 (恢复库存)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    spoilage::delete(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(true))
}
