//! Category API Handlers
//!
//! Renaming a category rewrites `category_name` on its items; deleting
//! one removes its items.

use axum::{Json, extract::State};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category, require};
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, ValidJson, ValidPath, validate_required_text};

/// GET /api/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(category::find_all(&state.pool, user.restaurant_id()?).await?))
}

/// GET /api/categories/{id} - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Category>> {
    let found = category::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Category", id)?))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<CategoryCreate>,
) -> AppResult<Json<Category>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let created = category::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(category_id = created.id, name = %created.name, "Category created");
    Ok(Json(created))
}

/// PUT /api/categories/{id} - 重命名分类
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    Ok(Json(category::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/categories/{id} - 删除分类 (连带删除其菜品)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = category::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(deleted))
}
