//! Dining table API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::{
    ClearOrdersRequest, DiningTable, DiningTableCreate, DiningTableUpdate, Order, PlaceOrderRequest,
    TableOrderView,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{dining_table, require};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, ValidJson, ValidPath, ValidQuery, validate_required_text,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableListQuery {
    pub section_id: Option<i64>,
}

/// GET /api/tables - 获取桌台 (可按 sectionId 过滤)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<TableListQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = dining_table::find_all(&state.pool, user.restaurant_id()?, query.section_id).await?;
    Ok(Json(tables))
}

/// GET /api/tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<DiningTable>> {
    let found = dining_table::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Table", id)?))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let created = dining_table::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(
        table_id = created.id,
        table_number = created.table_number,
        section_id = created.section_id,
        "Table created"
    );
    Ok(Json(created))
}

/// PUT /api/tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    Ok(Json(dining_table::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/tables/{id} - 删除桌台 (连带删除其订单)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(dining_table::delete(&state.pool, user.restaurant_id()?, id).await?))
}

// ========== Table orders ==========

/// POST /api/tables/{id}/orders - 下单 (替换当前待结订单的菜品)
pub async fn place_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<PlaceOrderRequest>,
) -> AppResult<Json<TableOrderView>> {
    let view = state
        .orders
        .place_order(user.restaurant_id()?, id, payload)
        .await?;
    Ok(Json(view))
}

/// GET /api/tables/{id}/orders - 当前待结订单
pub async fn get_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .get_table_order(user.restaurant_id()?, id)
        .await?;
    Ok(Json(order))
}

/// DELETE /api/tables/{id}/orders - 结账清台 (需 paymentMethod)
pub async fn clear_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<ClearOrdersRequest>,
) -> AppResult<Json<TableOrderView>> {
    let view = state
        .orders
        .clear_orders(user.restaurant_id()?, id, payload)
        .await?;
    Ok(Json(view))
}
