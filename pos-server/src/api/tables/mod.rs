//! Dining table API 模块
//!
//! 桌台 CRUD 以及桌台订单 (下单 / 查看 / 结账清台)。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::{ORDERS_MANAGE, TABLES_MANAGE};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/orders", get(handler::get_orders));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_permission(TABLES_MANAGE)));

    let order_routes = Router::new()
        .route(
            "/{id}/orders",
            post(handler::place_order).delete(handler::clear_orders),
        )
        .layer(middleware::from_fn(require_permission(ORDERS_MANAGE)));

    read_routes.merge(manage_routes).merge(order_routes)
}
