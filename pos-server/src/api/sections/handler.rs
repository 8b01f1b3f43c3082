//! Section API Handlers

use axum::{Json, extract::State};
use shared::models::{Section, SectionCreate, SectionUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{require, section};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, ValidJson, ValidPath, validate_required_text,
};

/// GET /api/sections - 获取所有区域
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Section>>> {
    let sections = section::find_all(&state.pool, user.restaurant_id()?).await?;
    Ok(Json(sections))
}

/// GET /api/sections/{id} - 获取单个区域
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Section>> {
    let found = section::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Section", id)?))
}

/// POST /api/sections - 创建区域
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<SectionCreate>,
) -> AppResult<Json<Section>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    for charge in &payload.charges {
        validate_required_text(&charge.name, "charge name", MAX_NAME_LEN)?;
    }

    let created = section::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(section_id = created.id, name = %created.name, "Section created");
    Ok(Json(created))
}

/// PUT /api/sections/{id} - 更新区域 (名称 / 附加费)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<SectionUpdate>,
) -> AppResult<Json<Section>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let updated = section::update(&state.pool, user.restaurant_id()?, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/sections/{id} - 删除区域
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = section::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(section_id = id, "Section deleted");
    Ok(Json(deleted))
}
