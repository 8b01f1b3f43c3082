//! Vendor API Handlers

use axum::{Json, extract::State};
use shared::models::{Vendor, VendorCreate, VendorUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{require, vendor};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, ValidJson, ValidPath,
    validate_optional_text, validate_required_text,
};

fn validate_contact(
    phone_number: &Option<String>,
    email: &Option<String>,
    address: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(phone_number, "phoneNumber", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(address, "address", MAX_ADDRESS_LEN)?;
    Ok(())
}

/// GET /api/vendors - 获取所有供应商
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Vendor>>> {
    Ok(Json(vendor::find_all(&state.pool, user.restaurant_id()?).await?))
}

/// GET /api/vendors/{id} - 获取单个供应商
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Vendor>> {
    let found = vendor::find_by_id(&state.pool, user.restaurant_id()?, id).await?;
    Ok(Json(require(found, "Vendor", id)?))
}

/// POST /api/vendors - 创建供应商
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<VendorCreate>,
) -> AppResult<Json<Vendor>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_contact(&payload.phone_number, &payload.email, &payload.address)?;

    let created = vendor::create(&state.pool, user.restaurant_id()?, payload).await?;
    tracing::info!(vendor_id = created.id, name = %created.name, "Vendor created");
    Ok(Json(created))
}

/// PUT /api/vendors/{id} - 更新供应商
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<VendorUpdate>,
) -> AppResult<Json<Vendor>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_contact(&payload.phone_number, &payload.email, &payload.address)?;

    Ok(Json(vendor::update(&state.pool, user.restaurant_id()?, id, payload).await?))
}

/// DELETE /api/vendors/{id} - 删除供应商
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<bool>> {
    let deleted = vendor::delete(&state.pool, user.restaurant_id()?, id).await?;
    tracing::info!(vendor_id = id, "Vendor deleted");
    Ok(Json(deleted))
}
