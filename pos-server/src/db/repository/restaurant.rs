//! Restaurant Repository

use chrono::{Datelike, NaiveDate};
use shared::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoResult, require};

const SELECT: &str = "SELECT id, name, location, contact, owner_id, bill_year, bill_month, bill_day, daily_order_counter, created_at, updated_at FROM restaurant";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

/// Insert a restaurant owned by `owner_id` (runs inside the caller's transaction)
pub async fn create(
    conn: &mut SqliteConnection,
    owner_id: i64,
    data: &RestaurantCreate,
) -> RepoResult<Restaurant> {
    let id = snowflake_id();
    let now = now_millis();
    let restaurant = sqlx::query_as::<_, Restaurant>(
        "INSERT INTO restaurant (id, name, location, contact, owner_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         RETURNING id, name, location, contact, owner_id, bill_year, bill_month, bill_day, daily_order_counter, created_at, updated_at",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.location)
    .bind(&data.contact)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(restaurant)
}

pub async fn update(pool: &SqlitePool, id: i64, data: RestaurantUpdate) -> RepoResult<Restaurant> {
    sqlx::query(
        "UPDATE restaurant SET name = COALESCE(?1, name), location = COALESCE(?2, location), \
         contact = COALESCE(?3, contact), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.location)
    .bind(data.contact)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, id).await?, "Restaurant", id)
}

/// Advance the daily bill counter for `date` and return the new value
///
/// Single statement: the counter restarts at 1 whenever the stored date
/// differs from `date`, so concurrent callers never observe the same value.
pub async fn next_bill_counter(pool: &SqlitePool, id: i64, date: NaiveDate) -> RepoResult<i64> {
    let counter: Option<i64> = sqlx::query_scalar(
        "UPDATE restaurant SET \
            daily_order_counter = CASE \
                WHEN bill_year = ?1 AND bill_month = ?2 AND bill_day = ?3 THEN daily_order_counter + 1 \
                ELSE 1 END, \
            bill_year = ?1, bill_month = ?2, bill_day = ?3 \
         WHERE id = ?4 RETURNING daily_order_counter",
    )
    .bind(date.year())
    .bind(date.month() as i32)
    .bind(date.day() as i32)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    require(counter, "Restaurant", id)
}
