//! Restaurant (tenant) API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/restaurants | POST | 创建餐厅并绑定当前用户 |
//! | /api/restaurants/current | GET | 当前用户所属餐厅 |
//! | /api/restaurants/current | PUT | 更新餐厅资料 |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::SETTINGS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/current", get(handler::current));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/current", axum::routing::put(handler::update))
        .layer(middleware::from_fn(require_permission(SETTINGS_MANAGE)));

    read_routes.merge(manage_routes)
}
