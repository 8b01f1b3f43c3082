//! Category Repository

use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, require};

const SELECT: &str = "SELECT id, restaurant_id, name, created_at, updated_at FROM category";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Category>> {
    let categories =
        sqlx::query_as::<_, Category>(&format!("{SELECT} WHERE restaurant_id = ? ORDER BY name"))
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?;
    Ok(categories)
}

pub async fn find_by_id<'e, E>(
    executor: E,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<Category>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let category =
        sqlx::query_as::<_, Category>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(executor)
            .await?;
    Ok(category)
}

async fn find_by_name(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "{SELECT} WHERE restaurant_id = ? AND name = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: CategoryCreate,
) -> RepoResult<Category> {
    if find_by_name(pool, restaurant_id, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Category '{}' already exists",
            data.name.trim()
        )));
    }
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO category (id, restaurant_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Category", id)
}

/// Rename a category; the denormalized `item.category_name` follows in the same transaction
pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: CategoryUpdate,
) -> RepoResult<Category> {
    let existing = require(find_by_id(pool, restaurant_id, id).await?, "Category", id)?;
    let Some(name) = data.name.as_deref().map(str::trim) else {
        return Ok(existing);
    };
    if let Some(other) = find_by_name(pool, restaurant_id, name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Category '{}' already exists", name)));
    }

    let now = now_millis();
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE category SET name = ?, updated_at = ? WHERE id = ? AND restaurant_id = ?")
        .bind(name)
        .bind(now)
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "UPDATE item SET category_name = ?, updated_at = ? WHERE category_id = ? AND restaurant_id = ?",
    )
    .bind(name)
    .bind(now)
    .bind(id)
    .bind(restaurant_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    require(find_by_id(pool, restaurant_id, id).await?, "Category", id)
}

/// Delete a category together with its items
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    require(find_by_id(pool, restaurant_id, id).await?, "Category", id)?;

    let mut tx = pool.begin().await?;
    let items = sqlx::query("DELETE FROM item WHERE category_id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM category WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(category_id = id, items_deleted = items.rows_affected(), "Category deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};

    #[tokio::test]
    async fn test_duplicate_category() {
        let pool = testing::pool().await;
        create(&pool, RESTAURANT, CategoryCreate { name: "Drinks".into() })
            .await
            .unwrap();
        let dup = create(&pool, RESTAURANT, CategoryCreate { name: "Drinks".into() }).await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_update_other_tenant_not_found() {
        let pool = testing::pool().await;
        let c = create(&pool, RESTAURANT, CategoryCreate { name: "Drinks".into() })
            .await
            .unwrap();
        let result = update(
            &pool,
            OTHER_RESTAURANT,
            c.id,
            CategoryUpdate {
                name: Some("Mine".into()),
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }
}
