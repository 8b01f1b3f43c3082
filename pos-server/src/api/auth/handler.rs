//! Authentication Handlers
//!
//! Registration, login and the current-user lookup.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::{LoginResponse, User, UserResponse, UserRole};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::validation::ValidJson;
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 300;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    state
        .get_jwt_service()
        .generate_token(user.id, user.restaurant_id, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))
}

/// POST /api/auth/register - 注册 (餐厅创建者, admin 角色)
pub async fn register(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    let hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let user = user::create(&state.pool, &req.name, &req.email, &hash, UserRole::Admin).await?;
    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login - 登录
///
/// Unknown email and wrong password produce the same response.
pub async fn login(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    let found = user::find_by_email(&state.pool, &req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match found {
        Some(u) => {
            let valid = verify_password(&req.password, &u.password_hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
            if !valid {
                security_log!("WARN", "login_failed", reason = "invalid_credentials", user_id = u.id);
                return Err(AppError::invalid_token("Invalid email or password"));
            }
            u
        }
        None => {
            security_log!("WARN", "login_failed", reason = "user_not_found");
            return Err(AppError::invalid_token("Invalid email or password"));
        }
    };

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = user.id, restaurant_id = ?user.restaurant_id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me - 当前用户
pub async fn me(State(state): State<ServerState>, current_user: CurrentUser) -> AppResult<Json<UserResponse>> {
    let user = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current_user.id)))?;
    Ok(Json(user.into()))
}
