//! Waiter group API Handlers

use axum::{Json, extract::State};
use shared::models::{Group, GroupCreate, GroupUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{group, require};
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, ValidJson, ValidPath, validate_required_text};

/// GET /api/groups - 获取所有分组
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Group>>> {
    Ok(Json(group::find_all(&state.pool, user.restaurant_id()?).await?))
}

/// GET /api/groups/{id} - 获取单个分组
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Group>> {
    let found = group::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Group", id)?))
}

/// POST /api/groups - 创建分组 (桌台须属于同一区域)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<GroupCreate>,
) -> AppResult<Json<Group>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let created = group::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(group_id = created.id, tables = created.table_ids.len(), "Group created");
    Ok(Json(created))
}

/// PUT /api/groups/{id} - 更新分组
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<GroupUpdate>,
) -> AppResult<Json<Group>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    Ok(Json(group::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/groups/{id} - 删除分组
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = group::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(group_id = id, "Group deleted");
    Ok(Json(deleted))
}
