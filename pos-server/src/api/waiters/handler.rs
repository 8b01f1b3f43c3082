//! Waiter API Handlers

use axum::{Json, extract::State};
use shared::models::{Waiter, WaiterCreate, WaiterUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{require, waiter};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, ValidJson, ValidPath, validate_required_text,
};

/// GET /api/waiters - 获取所有服务员
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Waiter>>> {
    Ok(Json(waiter::find_all(&state.pool, user.restaurant_id()?).await?))
}

/// GET /api/waiters/{id} - 获取单个服务员
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Waiter>> {
    let found = waiter::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Waiter", id)?))
}

/// POST /api/waiters - 创建服务员 (电话号码租户内唯一)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<WaiterCreate>,
) -> AppResult<Json<Waiter>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone_number, "phoneNumber", MAX_SHORT_TEXT_LEN)?;

    let created = waiter::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(waiter_id = created.id, "Waiter created");
    Ok(Json(created))
}

/// PUT /api/waiters/{id} - 更新服务员
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<WaiterUpdate>,
) -> AppResult<Json<Waiter>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone_number {
        validate_required_text(phone, "phoneNumber", MAX_SHORT_TEXT_LEN)?;
    }

    Ok(Json(waiter::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/waiters/{id} - 删除服务员
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = waiter::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(waiter_id = id, "Waiter deleted");
    Ok(Json(deleted))
}
