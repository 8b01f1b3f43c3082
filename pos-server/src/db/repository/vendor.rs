//! Vendor Repository

use shared::models::{Vendor, VendorCreate, VendorUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, require};

const SELECT: &str = "SELECT id, restaurant_id, name, phone_number, email, address, created_at, updated_at FROM vendor";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Vendor>> {
    let vendors =
        sqlx::query_as::<_, Vendor>(&format!("{SELECT} WHERE restaurant_id = ? ORDER BY name"))
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?;
    Ok(vendors)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Vendor>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let vendor =
        sqlx::query_as::<_, Vendor>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(executor)
            .await?;
    Ok(vendor)
}

async fn find_by_name(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
) -> RepoResult<Option<Vendor>> {
    let vendor = sqlx::query_as::<_, Vendor>(&format!(
        "{SELECT} WHERE restaurant_id = ? AND name = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;
    Ok(vendor)
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: VendorCreate) -> RepoResult<Vendor> {
    if find_by_name(pool, restaurant_id, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Vendor '{}' already exists",
            data.name.trim()
        )));
    }
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO vendor (id, restaurant_id, name, phone_number, email, address, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.phone_number)
    .bind(data.email)
    .bind(data.address)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Vendor", id)
}

pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: VendorUpdate,
) -> RepoResult<Vendor> {
    require(find_by_id(pool, restaurant_id, id).await?, "Vendor", id)?;
    if let Some(name) = &data.name
        && let Some(other) = find_by_name(pool, restaurant_id, name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Vendor '{}' already exists", name.trim())));
    }
    sqlx::query(
        "UPDATE vendor SET name = COALESCE(?1, name), phone_number = COALESCE(?2, phone_number), \
         email = COALESCE(?3, email), address = COALESCE(?4, address), updated_at = ?5 \
         WHERE id = ?6 AND restaurant_id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.phone_number)
    .bind(data.email)
    .bind(data.address)
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Vendor", id)
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM vendor WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Vendor {id} not found")));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, RESTAURANT};

    #[tokio::test]
    async fn test_vendor_crud() {
        let pool = testing::pool().await;
        let vendor = create(
            &pool,
            RESTAURANT,
            VendorCreate {
                name: "Fresh Farms".into(),
                phone_number: Some("555".into()),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();

        let updated = update(
            &pool,
            RESTAURANT,
            vendor.id,
            VendorUpdate {
                email: Some("orders@farms.test".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Fresh Farms");
        assert_eq!(updated.phone_number.as_deref(), Some("555"));
        assert_eq!(updated.email.as_deref(), Some("orders@farms.test"));

        let dup = create(
            &pool,
            RESTAURANT,
            VendorCreate {
                name: "Fresh Farms".into(),
                phone_number: None,
                email: None,
                address: None,
            },
        )
        .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));

        assert!(delete(&pool, RESTAURANT, vendor.id).await.unwrap());
        assert!(find_by_id(&pool, RESTAURANT, vendor.id).await.unwrap().is_none());
    }
}
