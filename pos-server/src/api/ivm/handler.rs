//! IVM order API Handlers

use axum::{Json, extract::State};
use shared::models::{IvmOrder, IvmOrderCreate, IvmOrderQuery, IvmOrderUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::inventory::ivm;
use crate::utils::AppResult;
use crate::utils::validation::{ValidJson, ValidPath, ValidQuery};

/// GET /api/ivm/orders - 单据列表 (可按 orderType 过滤)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<IvmOrderQuery>,
) -> AppResult<Json<Vec<IvmOrder>>> {
    Ok(Json(ivm::list(&state.pool, user.restaurant_id()?, &query).await?))
}

/// GET /api/ivm/orders/{id} - 获取单据
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<IvmOrder>> {
    Ok(Json(ivm::get(&state.pool, user.restaurant_id()?, id).await?))
}

/// POST /api/ivm/orders - 创建单据 (采购入库 / 销售或出库扣减)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<IvmOrderCreate>,
) -> AppResult<Json<IvmOrder>> {
    let restaurant_id = user.restaurant_id()?;
    let created = ivm::create(&state.pool, restaurant_id, payload).await?;
    tracing::info!(
        ivm_order_id = created.id,
        order_type = created.kind.type_name(),
        lines = created.items.len(),
        total = created.total_amount,
        "IVM order created"
    );
    Ok(Json(created))
}

/// PUT /api/ivm/orders/{id} - 更新单据 (先冲回旧库存, 再记入新库存)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<IvmOrderUpdate>,
) -> AppResult<Json<IvmOrder>> {
    Ok(Json(ivm::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/ivm/orders/{id} - 删除单据 (冲回库存)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    ivm::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(ivm_order_id = id, "IVM order deleted");
    Ok(Json(true))
}
