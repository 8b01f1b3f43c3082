//! Spoilage Repository

use shared::models::Spoilage;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use super::RepoResult;

const SELECT: &str = "SELECT id, restaurant_id, item_id, item_name, spoiled_quantity, reason, notes, \
    vendor_id, price, total_loss_value, created_at FROM spoilage";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Spoilage>> {
    let records = sqlx::query_as::<_, Spoilage>(&format!(
        "{SELECT} WHERE restaurant_id = ? ORDER BY created_at DESC"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Spoilage>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let record = sqlx::query_as::<_, Spoilage>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;
    Ok(record)
}

pub async fn insert(conn: &mut SqliteConnection, record: &Spoilage) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO spoilage (id, restaurant_id, item_id, item_name, spoiled_quantity, reason, notes, \
         vendor_id, price, total_loss_value, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id)
    .bind(record.restaurant_id)
    .bind(record.item_id)
    .bind(&record.item_name)
    .bind(record.spoiled_quantity)
    .bind(record.reason)
    .bind(&record.notes)
    .bind(record.vendor_id)
    .bind(record.price)
    .bind(record.total_loss_value)
    .bind(record.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, restaurant_id: i64, id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM spoilage WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(conn)
        .await?;
    Ok(())
}
