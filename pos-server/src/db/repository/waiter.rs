//! Waiter Repository

use shared::models::{Waiter, WaiterCreate, WaiterUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, require};

const SELECT: &str =
    "SELECT id, restaurant_id, name, phone_number, created_at, updated_at FROM waiter";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Waiter>> {
    let waiters =
        sqlx::query_as::<_, Waiter>(&format!("{SELECT} WHERE restaurant_id = ? ORDER BY name"))
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?;
    Ok(waiters)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Waiter>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let waiter =
        sqlx::query_as::<_, Waiter>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(executor)
            .await?;
    Ok(waiter)
}

pub async fn find_by_phone(
    pool: &SqlitePool,
    restaurant_id: i64,
    phone_number: &str,
) -> RepoResult<Option<Waiter>> {
    let waiter = sqlx::query_as::<_, Waiter>(&format!(
        "{SELECT} WHERE restaurant_id = ? AND phone_number = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(phone_number.trim())
    .fetch_optional(pool)
    .await?;
    Ok(waiter)
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: WaiterCreate) -> RepoResult<Waiter> {
    if find_by_phone(pool, restaurant_id, &data.phone_number).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Waiter with phone number '{}' already exists",
            data.phone_number.trim()
        )));
    }
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO waiter (id, restaurant_id, name, phone_number, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.phone_number.trim())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Waiter", id)
}

pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: WaiterUpdate,
) -> RepoResult<Waiter> {
    require(find_by_id(pool, restaurant_id, id).await?, "Waiter", id)?;
    if let Some(phone) = &data.phone_number
        && let Some(other) = find_by_phone(pool, restaurant_id, phone).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Waiter with phone number '{}' already exists",
            phone.trim()
        )));
    }
    sqlx::query(
        "UPDATE waiter SET name = COALESCE(?1, name), phone_number = COALESCE(?2, phone_number), \
         updated_at = ?3 WHERE id = ?4 AND restaurant_id = ?5",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.phone_number.as_deref().map(str::trim))
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Waiter", id)
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM waiter WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Waiter {id} not found")));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};

    fn payload(name: &str, phone: &str) -> WaiterCreate {
        WaiterCreate {
            name: name.into(),
            phone_number: phone.into(),
        }
    }

    #[tokio::test]
    async fn test_phone_unique_per_restaurant() {
        let pool = testing::pool().await;
        create(&pool, RESTAURANT, payload("Anil", "9800000001")).await.unwrap();
        assert!(matches!(
            create(&pool, RESTAURANT, payload("Other", "9800000001")).await,
            Err(RepoError::Duplicate(_))
        ));
        assert!(create(&pool, OTHER_RESTAURANT, payload("Anil", "9800000001")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_to_taken_phone_conflicts() {
        let pool = testing::pool().await;
        create(&pool, RESTAURANT, payload("Anil", "1")).await.unwrap();
        let b = create(&pool, RESTAURANT, payload("Bina", "2")).await.unwrap();
        let result = update(
            &pool,
            RESTAURANT,
            b.id,
            WaiterUpdate {
                phone_number: Some("1".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_delete_other_tenant_not_found() {
        let pool = testing::pool().await;
        let w = create(&pool, RESTAURANT, payload("Anil", "1")).await.unwrap();
        assert!(matches!(
            delete(&pool, OTHER_RESTAURANT, w.id).await,
            Err(RepoError::NotFound(_))
        ));
        assert!(delete(&pool, RESTAURANT, w.id).await.unwrap());
    }
}
