//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::ORDERS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .route("/{id}/items/{index}/cancel", put(handler::cancel_item))
        .layer(middleware::from_fn(require_permission(ORDERS_MANAGE)));

    read_routes.merge(manage_routes)
}
