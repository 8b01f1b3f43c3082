//! Tag API Handlers
//!
//! Names are unique per restaurant after trim + lowercase.

use axum::{Json, extract::State};
use shared::models::{Tag, TagCreate, TagUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{require, tag};
use crate::utils::validation::{MAX_NAME_LEN, ValidJson, ValidPath, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/tags - 获取所有标签
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Tag>>> {
    Ok(Json(tag::find_all(&state.pool, user.restaurant_id()?).await?))
}

/// GET /api/tags/{id} - 获取单个标签
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Tag>> {
    let found = tag::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Tag", id)?))
}

/// POST /api/tags - 创建标签 (已存在返回 409)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<TagCreate>,
) -> AppResult<Json<Tag>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let restaurant_id = user.restaurant_id()?;

    if tag::find_by_name(&state.pool, restaurant_id, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(format!(
            "Tag '{}' already exists",
            payload.name.trim()
        )));
    }

    let created = tag::find_or_create(&state.pool, restaurant_id, &payload.name).await?;
    tracing::info!(tag_id = created.id, name = %created.normalized_name, "Tag created");
    Ok(Json(created))
}

/// POST /api/tags/find-or-create - 按名称查找, 不存在则创建
pub async fn find_or_create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<TagCreate>,
) -> AppResult<Json<Tag>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    Ok(Json(
        tag::find_or_create(&state.pool, user.restaurant_id()?, &payload.name).await?,
    ))
}

/// PUT /api/tags/{id} - 重命名标签
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<TagUpdate>,
) -> AppResult<Json<Tag>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    Ok(Json(tag::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/tags/{id} - 删除标签 (同时从菜品上移除)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = tag::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(tag_id = id, "Tag deleted");
    Ok(Json(deleted))
}
