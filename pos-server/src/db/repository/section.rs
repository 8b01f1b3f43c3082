//! Section Repository

use shared::models::{Section, SectionCharge, SectionCreate, SectionUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, require};

const SELECT: &str =
    "SELECT id, restaurant_id, name, charges, created_at, updated_at FROM section";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Section>> {
    let sections =
        sqlx::query_as::<_, Section>(&format!("{SELECT} WHERE restaurant_id = ? ORDER BY name"))
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?;
    Ok(sections)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Section>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let section =
        sqlx::query_as::<_, Section>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(executor)
            .await?;
    Ok(section)
}

pub async fn find_by_name(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
) -> RepoResult<Option<Section>> {
    let section = sqlx::query_as::<_, Section>(&format!(
        "{SELECT} WHERE restaurant_id = ? AND name = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;
    Ok(section)
}

fn validate_charges(charges: &[SectionCharge]) -> RepoResult<()> {
    for charge in charges {
        if charge.name.trim().is_empty() {
            return Err(RepoError::Validation("Charge name must not be empty".into()));
        }
        if !charge.value.is_finite() || charge.value < 0.0 {
            return Err(RepoError::Validation(format!(
                "Charge '{}' value must be non-negative",
                charge.name
            )));
        }
    }
    Ok(())
}

pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: SectionCreate,
) -> RepoResult<Section> {
    validate_charges(&data.charges)?;
    if find_by_name(pool, restaurant_id, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Section '{}' already exists",
            data.name.trim()
        )));
    }
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO section (id, restaurant_id, name, charges, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(Json(&data.charges))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Section", id)
}

pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: SectionUpdate,
) -> RepoResult<Section> {
    let existing = require(find_by_id(pool, restaurant_id, id).await?, "Section", id)?;
    if let Some(charges) = &data.charges {
        validate_charges(charges)?;
    }
    if let Some(name) = &data.name
        && let Some(other) = find_by_name(pool, restaurant_id, name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Section '{}' already exists", name.trim())));
    }

    let name = data.name.as_deref().map(str::trim).unwrap_or(&existing.name);
    let charges = data.charges.as_ref().unwrap_or(&existing.charges);
    sqlx::query(
        "UPDATE section SET name = ?, charges = ?, updated_at = ? WHERE id = ? AND restaurant_id = ?",
    )
    .bind(name)
    .bind(Json(charges))
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Section", id)
}

/// Delete a section; rejected while tables still reference it
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    require(find_by_id(pool, restaurant_id, id).await?, "Section", id)?;

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM dining_table WHERE section_id = ? AND restaurant_id = ?",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_one(pool)
    .await?;
    if count > 0 {
        return Err(RepoError::Validation(
            "Cannot delete section with tables".into(),
        ));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM table_group WHERE section_id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM section WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}
