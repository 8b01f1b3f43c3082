//! Order API Handlers

use axum::{Json, body::Bytes, extract::State};
use shared::models::{CancelItemRequest, DeleteOrderRequest, Order, OrderDeleted, OrderPage, TableOrderView};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::manager::OrderListQuery;
use crate::utils::AppResult;
use crate::utils::validation::{ValidJson, ValidPath, ValidQuery, optional_json};

/// GET /api/orders - 订单列表 (timeRange / search / page / limit)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<OrderListQuery>,
) -> AppResult<Json<OrderPage>> {
    Ok(Json(state.orders.list_orders(user.restaurant_id()?, query).await?))
}

/// GET /api/orders/{id} - 获取订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order(user.restaurant_id()?, id).await?))
}

/// DELETE /api/orders/{id} - 删除订单 (body 可选: `{ "reason": "..." }`)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    body: Bytes,
) -> AppResult<Json<OrderDeleted>> {
    let request: DeleteOrderRequest = optional_json(&body)?;
    let deleted = state
        .orders
        .delete_order(user.restaurant_id()?, id, request.reason)
        .await?;
    Ok(Json(deleted))
}

/// PUT /api/orders/{id}/items/{index}/cancel - 退菜
pub async fn cancel_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath((id, index)): ValidPath<(i64, usize)>,
    ValidJson(payload): ValidJson<CancelItemRequest>,
) -> AppResult<Json<TableOrderView>> {
    let view = state
        .orders
        .cancel_item(user.restaurant_id()?, id, index, &payload.reason)
        .await?;
    Ok(Json(view))
}
