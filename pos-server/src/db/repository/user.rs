//! User Repository

use shared::models::{User, UserRole};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};

const SELECT: &str =
    "SELECT id, name, email, password_hash, role, restaurant_id, created_at FROM app_user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT} WHERE email = ? LIMIT 1"))
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Create a user; emails are stored lowercased and must be unique
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> RepoResult<User> {
    if find_by_email(pool, email).await?.is_some() {
        return Err(RepoError::Duplicate(format!("Email '{}' already registered", email)));
    }
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO app_user (id, name, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, name, email, password_hash, role, restaurant_id, created_at",
    )
    .bind(snowflake_id())
    .bind(name.trim())
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(role)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Link a user to a restaurant (inside the restaurant-creation transaction)
pub async fn set_restaurant(
    conn: &mut SqliteConnection,
    user_id: i64,
    restaurant_id: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE app_user SET restaurant_id = ? WHERE id = ?")
        .bind(restaurant_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
