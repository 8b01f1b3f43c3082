//! Tag Repository
//!
//! Tags are unique per restaurant by normalized name (trim + lowercase).

use shared::models::{Tag, TagUpdate};
use shared::util::{normalize_name, now_millis, snowflake_id};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, require};

const SELECT: &str = "SELECT id, restaurant_id, name, normalized_name, created_at FROM tag";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(&format!(
        "{SELECT} WHERE restaurant_id = ? ORDER BY normalized_name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(tags)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Tag>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let tag = sqlx::query_as::<_, Tag>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;
    Ok(tag)
}

pub async fn find_by_name(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
) -> RepoResult<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(&format!(
        "{SELECT} WHERE restaurant_id = ? AND normalized_name = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(normalize_name(name))
    .fetch_optional(pool)
    .await?;
    Ok(tag)
}

/// Return the tag with this normalized name, creating it if absent
///
/// Concurrent callers converge on one row: the insert is a no-op on
/// conflict and the follow-up select reads whichever row won.
pub async fn find_or_create(pool: &SqlitePool, restaurant_id: i64, name: &str) -> RepoResult<Tag> {
    let display = name.trim();
    if display.is_empty() {
        return Err(RepoError::Validation("Tag name must not be empty".into()));
    }
    let normalized = normalize_name(display);

    sqlx::query(
        "INSERT INTO tag (id, restaurant_id, name, normalized_name, created_at) VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT (restaurant_id, normalized_name) DO NOTHING",
    )
    .bind(snowflake_id())
    .bind(restaurant_id)
    .bind(display)
    .bind(&normalized)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_name(pool, restaurant_id, &normalized)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Tag '{display}' vanished after insert")))
}

/// Resolve tag names to ids, creating missing tags; duplicates collapse
pub async fn resolve_names(
    pool: &SqlitePool,
    restaurant_id: i64,
    names: &[String],
) -> RepoResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let tag = find_or_create(pool, restaurant_id, name).await?;
        if !ids.contains(&tag.id) {
            ids.push(tag.id);
        }
    }
    Ok(ids)
}

pub async fn update(pool: &SqlitePool, restaurant_id: i64, id: i64, data: TagUpdate) -> RepoResult<Tag> {
    let existing = require(find_by_id(pool, restaurant_id, id).await?, "Tag", id)?;
    let Some(name) = data.name.as_deref().map(str::trim) else {
        return Ok(existing);
    };
    if name.is_empty() {
        return Err(RepoError::Validation("Tag name must not be empty".into()));
    }
    if let Some(other) = find_by_name(pool, restaurant_id, name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Tag '{}' already exists", name)));
    }
    sqlx::query("UPDATE tag SET name = ?, normalized_name = ? WHERE id = ? AND restaurant_id = ?")
        .bind(name)
        .bind(normalize_name(name))
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Tag", id)
}

/// Delete a tag and detach it from every item
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    require(find_by_id(pool, restaurant_id, id).await?, "Tag", id)?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE item SET tags = (SELECT json_group_array(value) FROM json_each(item.tags) WHERE value != ?1) \
         WHERE restaurant_id = ?2 AND EXISTS (SELECT 1 FROM json_each(item.tags) WHERE value = ?1)",
    )
    .bind(id)
    .bind(restaurant_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM tag WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};

    #[tokio::test]
    async fn test_find_or_create_is_idempotent_on_normalized_name() {
        let pool = testing::pool().await;
        let a = find_or_create(&pool, RESTAURANT, "Spicy").await.unwrap();
        let b = find_or_create(&pool, RESTAURANT, "  spicy ").await.unwrap();
        let c = find_or_create(&pool, RESTAURANT, "SPICY").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, c.id);
        assert_eq!(a.name, "Spicy");
        assert_eq!(a.normalized_name, "spicy");
        assert_eq!(find_all(&pool, RESTAURANT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tags_are_per_restaurant() {
        let pool = testing::pool().await;
        let a = find_or_create(&pool, RESTAURANT, "Vegan").await.unwrap();
        let b = find_or_create(&pool, OTHER_RESTAURANT, "Vegan").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_resolve_names_dedups() {
        let pool = testing::pool().await;
        let ids = resolve_names(
            &pool,
            RESTAURANT,
            &["Hot".to_string(), "hot".to_string(), "Cold".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let pool = testing::pool().await;
        assert!(matches!(
            find_or_create(&pool, RESTAURANT, "   ").await,
            Err(RepoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_to_existing_conflicts() {
        let pool = testing::pool().await;
        find_or_create(&pool, RESTAURANT, "Hot").await.unwrap();
        let cold = find_or_create(&pool, RESTAURANT, "Cold").await.unwrap();
        let result = update(
            &pool,
            RESTAURANT,
            cold.id,
            TagUpdate {
                name: Some("HOT".into()),
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }
}
