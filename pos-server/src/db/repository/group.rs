//! Group Repository (waiter assignment over tables of one section)

use shared::models::{Group, GroupCreate, GroupUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, dining_table, require, section, waiter};

const SELECT: &str =
    "SELECT id, restaurant_id, name, section_id, waiter_id, table_ids, created_at, updated_at FROM table_group";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Group>> {
    let groups = sqlx::query_as::<_, Group>(&format!("{SELECT} WHERE restaurant_id = ? ORDER BY name"))
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(groups)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Group>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let group = sqlx::query_as::<_, Group>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;
    Ok(group)
}

async fn find_by_name(pool: &SqlitePool, restaurant_id: i64, name: &str) -> RepoResult<Option<Group>> {
    let group = sqlx::query_as::<_, Group>(&format!("{SELECT} WHERE restaurant_id = ? AND name = ? LIMIT 1"))
        .bind(restaurant_id)
        .bind(name.trim())
        .fetch_optional(pool)
        .await?;
    Ok(group)
}

/// Waiter must exist; every table must exist and sit in `section_id`
async fn validate_members(
    pool: &SqlitePool,
    restaurant_id: i64,
    section_id: i64,
    waiter_id: Option<i64>,
    table_ids: &[i64],
) -> RepoResult<Vec<i64>> {
    if let Some(waiter_id) = waiter_id {
        require(waiter::find_by_id(pool, restaurant_id, waiter_id).await?, "Waiter", waiter_id)?;
    }
    let mut unique = Vec::with_capacity(table_ids.len());
    for &table_id in table_ids {
        if unique.contains(&table_id) {
            continue;
        }
        let table = require(
            dining_table::find_by_id(pool, restaurant_id, table_id).await?,
            "Table",
            table_id,
        )?;
        if table.section_id != section_id {
            return Err(RepoError::Validation(format!(
                "Table {} does not belong to section {section_id}",
                table.table_number
            )));
        }
        unique.push(table_id);
    }
    Ok(unique)
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: GroupCreate) -> RepoResult<Group> {
    require(
        section::find_by_id(pool, restaurant_id, data.section_id).await?,
        "Section",
        data.section_id,
    )?;
    let table_ids =
        validate_members(pool, restaurant_id, data.section_id, data.waiter_id, &data.table_ids).await?;
    if find_by_name(pool, restaurant_id, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!("Group '{}' already exists", data.name.trim())));
    }

    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO table_group (id, restaurant_id, name, section_id, waiter_id, table_ids, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.section_id)
    .bind(data.waiter_id)
    .bind(Json(&table_ids))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Group", id)
}

pub async fn update(pool: &SqlitePool, restaurant_id: i64, id: i64, data: GroupUpdate) -> RepoResult<Group> {
    let existing = require(find_by_id(pool, restaurant_id, id).await?, "Group", id)?;

    if let Some(name) = &data.name
        && let Some(other) = find_by_name(pool, restaurant_id, name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Group '{}' already exists", name.trim())));
    }
    let waiter_id = data.waiter_id.or(existing.waiter_id);
    let table_ids = validate_members(
        pool,
        restaurant_id,
        existing.section_id,
        data.waiter_id,
        data.table_ids.as_deref().unwrap_or(&existing.table_ids),
    )
    .await?;

    sqlx::query(
        "UPDATE table_group SET name = ?, waiter_id = ?, table_ids = ?, updated_at = ? WHERE id = ? AND restaurant_id = ?",
    )
    .bind(data.name.as_deref().map(str::trim).unwrap_or(&existing.name))
    .bind(waiter_id)
    .bind(Json(&table_ids))
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Group", id)
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM table_group WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Group {id} not found")));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, RESTAURANT};
    use shared::models::{DiningTableCreate, SectionCreate, WaiterCreate};

    async fn seed_section(pool: &SqlitePool, name: &str) -> i64 {
        section::create(
            pool,
            RESTAURANT,
            SectionCreate {
                name: name.into(),
                charges: vec![],
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn seed_table(pool: &SqlitePool, number: i64, section_id: i64) -> i64 {
        dining_table::create(
            pool,
            RESTAURANT,
            DiningTableCreate {
                name: format!("T{number}"),
                table_number: number,
                section_id,
                seats: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_validates_membership() {
        let pool = testing::pool().await;
        let patio = seed_section(&pool, "Patio").await;
        let hall = seed_section(&pool, "Hall").await;
        let t1 = seed_table(&pool, 1, patio).await;
        let t2 = seed_table(&pool, 2, hall).await;
        let waiter = waiter::create(
            &pool,
            RESTAURANT,
            WaiterCreate {
                name: "Asha".into(),
                phone_number: "555".into(),
            },
        )
        .await
        .unwrap();

        let group = create(
            &pool,
            RESTAURANT,
            GroupCreate {
                name: "Front".into(),
                section_id: patio,
                waiter_id: Some(waiter.id),
                table_ids: vec![t1, t1],
            },
        )
        .await
        .unwrap();
        assert_eq!(group.table_ids, vec![t1]);

        let wrong_section = create(
            &pool,
            RESTAURANT,
            GroupCreate {
                name: "Mixed".into(),
                section_id: patio,
                waiter_id: None,
                table_ids: vec![t1, t2],
            },
        )
        .await;
        assert!(matches!(wrong_section, Err(RepoError::Validation(_))));

        let unknown_waiter = create(
            &pool,
            RESTAURANT,
            GroupCreate {
                name: "Ghost".into(),
                section_id: patio,
                waiter_id: Some(404),
                table_ids: vec![],
            },
        )
        .await;
        assert!(matches!(unknown_waiter, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_table_delete_leaves_group() {
        let pool = testing::pool().await;
        let patio = seed_section(&pool, "Patio").await;
        let t1 = seed_table(&pool, 1, patio).await;
        let t2 = seed_table(&pool, 2, patio).await;
        let group = create(
            &pool,
            RESTAURANT,
            GroupCreate {
                name: "Front".into(),
                section_id: patio,
                waiter_id: None,
                table_ids: vec![t1, t2],
            },
        )
        .await
        .unwrap();

        dining_table::delete(&pool, RESTAURANT, t1).await.unwrap();

        let group = find_by_id(&pool, RESTAURANT, group.id).await.unwrap().unwrap();
        assert_eq!(group.table_ids, vec![t2]);
    }
}
