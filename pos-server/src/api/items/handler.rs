//! Item API Handlers
//!
//! Stock fields (`quantity`, `avgPrice`, `totalPurchaseValue`) are only
//! booked at creation; afterwards they move through IVM orders and
//! spoilage.

use axum::{Json, extract::State};
use shared::models::{Item, ItemCreate, ItemQuery, ItemUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{item, require};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, ValidJson, ValidPath, ValidQuery, validate_amount, validate_required_text,
};

fn validate_tags(tags: &[String]) -> AppResult<()> {
    for name in tags {
        validate_required_text(name, "tag", MAX_NAME_LEN)?;
    }
    Ok(())
}

/// GET /api/items - 获取菜品 (可按 categoryId / search / tag 过滤)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<ItemQuery>,
) -> AppResult<Json<Vec<Item>>> {
    Ok(Json(item::find_all(&state.pool, user.restaurant_id()?, &query).await?))
}

/// GET /api/items/{id} - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Item>> {
    let found = item::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Item", id)?))
}

/// POST /api/items - 创建菜品 (可带期初库存)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<ItemCreate>,
) -> AppResult<Json<Item>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_amount(payload.price, "price")?;
    if let Some(quantity) = payload.quantity {
        validate_amount(quantity, "quantity")?;
    }
    validate_tags(&payload.tags)?;

    let created = item::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(
        item_id = created.id,
        name = %created.name,
        quantity = created.quantity,
        "Item created"
    );
    Ok(Json(created))
}

/// PUT /api/items/{id} - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<ItemUpdate>,
) -> AppResult<Json<Item>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_amount(price, "price")?;
    }
    if let Some(tags) = &payload.tags {
        validate_tags(tags)?;
    }

    Ok(Json(item::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/items/{id} - 删除菜品
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = item::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(item_id = id, "Item deleted");
    Ok(Json(deleted))
}
