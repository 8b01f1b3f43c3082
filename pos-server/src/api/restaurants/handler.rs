//! Restaurant API Handlers

use axum::{Json, extract::State};
use shared::models::{Restaurant, RestaurantCreate, RestaurantCreated, RestaurantUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{require, restaurant, user as user_repo};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, ValidJson, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// POST /api/restaurants - 创建餐厅
///
/// The caller becomes the owner; the response carries a token bound to
/// the new restaurant.
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    ValidJson(payload): ValidJson<RestaurantCreate>,
) -> AppResult<Json<RestaurantCreated>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_SHORT_TEXT_LEN)?;

    let owner = user_repo::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current_user.id)))?;
    if let Some(existing) = owner.restaurant_id {
        return Err(AppError::conflict(format!(
            "User already belongs to restaurant {existing}"
        )));
    }

    // Restaurant row and owner linkage commit together
    let mut tx = state.pool.begin().await?;
    let created = restaurant::create(&mut *tx, owner.id, &payload).await?;
    user_repo::set_restaurant(&mut *tx, owner.id, created.id).await?;
    tx.commit().await?;

    let token = state
        .get_jwt_service()
        .generate_token(owner.id, Some(created.id), owner.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(restaurant_id = created.id, owner_id = owner.id, "Restaurant created");
    Ok(Json(RestaurantCreated {
        restaurant: created,
        token,
    }))
}

/// GET /api/restaurants/current - 当前餐厅
pub async fn current(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Restaurant>> {
    let id = user.restaurant_id()?;
    let found = restaurant::find_by_id(&state.pool, id).await?;
    Ok(Json(require(found, "Restaurant", id)?))
}

/// PUT /api/restaurants/current - 更新餐厅资料
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<RestaurantUpdate>,
) -> AppResult<Json<Restaurant>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.location, "location", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_SHORT_TEXT_LEN)?;

    let updated = restaurant::update(&state.pool, user.restaurant_id()?, payload).await?;
    Ok(Json(updated))
}
