//! Item Repository
//!
//! Menu/stock lines. Stock fields are written by the inventory ledger;
//! this module only sets them on creation.

use shared::models::{Item, ItemCreate, ItemQuery, ItemUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use super::{RepoError, RepoResult, category, require, tag};
use crate::utils::money::{to_decimal, to_f64};

const COLUMNS: &str = "id, restaurant_id, name, price, avg_price, quantity, total_purchase_value, category_id, category_name, tags, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64, query: &ItemQuery) -> RepoResult<Vec<Item>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM item WHERE restaurant_id = "));
    qb.push_bind(restaurant_id);

    if let Some(category_id) = query.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND name LIKE ")
            .push_bind(format!("%{}%", search))
            .push(" COLLATE NOCASE");
    }
    if let Some(tag_name) = query.tag.as_deref().filter(|s| !s.trim().is_empty()) {
        // Unknown tag: no item can carry it
        let Some(tag) = tag::find_by_name(pool, restaurant_id, tag_name).await? else {
            return Ok(Vec::new());
        };
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(item.tags) WHERE value = ")
            .push_bind(tag.id)
            .push(")");
    }
    qb.push(" ORDER BY category_name, name");

    let items = qb.build_query_as::<Item>().fetch_all(pool).await?;
    Ok(items)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Item>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {COLUMNS} FROM item WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(executor)
    .await?;
    Ok(item)
}

async fn find_by_name(pool: &SqlitePool, restaurant_id: i64, name: &str) -> RepoResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {COLUMNS} FROM item WHERE restaurant_id = ? AND name = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Create an item; an opening quantity is booked at `price`
pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: ItemCreate) -> RepoResult<Item> {
    if !data.price.is_finite() || data.price < 0.0 {
        return Err(RepoError::Validation("price must be non-negative".into()));
    }
    let quantity = data.quantity.unwrap_or(0.0);
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(RepoError::Validation("quantity must be non-negative".into()));
    }
    let category = require(
        category::find_by_id(pool, restaurant_id, data.category_id).await?,
        "Category",
        data.category_id,
    )?;
    if find_by_name(pool, restaurant_id, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!("Item '{}' already exists", data.name.trim())));
    }
    let tags = tag::resolve_names(pool, restaurant_id, &data.tags).await?;

    let total_purchase_value = to_f64(to_decimal(data.price) * to_decimal(quantity));
    let avg_price = if quantity > 0.0 { data.price } else { 0.0 };

    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO item (id, restaurant_id, name, price, avg_price, quantity, total_purchase_value, \
         category_id, category_name, tags, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.price)
    .bind(avg_price)
    .bind(quantity)
    .bind(total_purchase_value)
    .bind(category.id)
    .bind(&category.name)
    .bind(Json(&tags))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Item", id)
}

pub async fn update(pool: &SqlitePool, restaurant_id: i64, id: i64, data: ItemUpdate) -> RepoResult<Item> {
    let existing = require(find_by_id(pool, restaurant_id, id).await?, "Item", id)?;

    if let Some(price) = data.price
        && (!price.is_finite() || price < 0.0)
    {
        return Err(RepoError::Validation("price must be non-negative".into()));
    }
    if let Some(name) = &data.name
        && let Some(other) = find_by_name(pool, restaurant_id, name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Item '{}' already exists", name.trim())));
    }
    let (category_id, category_name) = match data.category_id {
        Some(category_id) if category_id != existing.category_id => {
            let category = require(
                category::find_by_id(pool, restaurant_id, category_id).await?,
                "Category",
                category_id,
            )?;
            (category.id, category.name)
        }
        _ => (existing.category_id, existing.category_name.clone()),
    };
    let tags = match &data.tags {
        Some(names) => tag::resolve_names(pool, restaurant_id, names).await?,
        None => existing.tags.clone(),
    };

    sqlx::query(
        "UPDATE item SET name = ?, price = ?, category_id = ?, category_name = ?, tags = ?, updated_at = ? \
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(data.name.as_deref().map(str::trim).unwrap_or(&existing.name))
    .bind(data.price.unwrap_or(existing.price))
    .bind(category_id)
    .bind(category_name)
    .bind(Json(&tags))
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Item", id)
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM item WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Item {id} not found")));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};
    use shared::models::{CategoryCreate, CategoryUpdate};

    async fn seed_category(pool: &SqlitePool, name: &str) -> i64 {
        category::create(pool, RESTAURANT, CategoryCreate { name: name.into() })
            .await
            .unwrap()
            .id
    }

    fn payload(name: &str, category_id: i64) -> ItemCreate {
        ItemCreate {
            name: name.into(),
            price: 20.0,
            category_id,
            quantity: Some(5.0),
            tags: vec!["Cold".into()],
        }
    }

    #[tokio::test]
    async fn test_create_books_opening_stock() {
        let pool = testing::pool().await;
        let cat = seed_category(&pool, "Drinks").await;
        let item = create(&pool, RESTAURANT, payload("Coke", cat)).await.unwrap();
        assert_eq!(item.category_name, "Drinks");
        assert_eq!(item.quantity, 5.0);
        assert_eq!(item.total_purchase_value, 100.0);
        assert_eq!(item.avg_price, 20.0);
        assert_eq!(item.tags.len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_own_category() {
        let pool = testing::pool().await;
        let cat = seed_category(&pool, "Drinks").await;
        let result = create(&pool, OTHER_RESTAURANT, payload("Coke", cat)).await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_rename_updates_items() {
        let pool = testing::pool().await;
        let cat = seed_category(&pool, "Drinks").await;
        let item = create(&pool, RESTAURANT, payload("Coke", cat)).await.unwrap();

        category::update(
            &pool,
            RESTAURANT,
            cat,
            CategoryUpdate {
                name: Some("Beverages".into()),
            },
        )
        .await
        .unwrap();

        let item = find_by_id(&pool, RESTAURANT, item.id).await.unwrap().unwrap();
        assert_eq!(item.category_name, "Beverages");
    }

    #[tokio::test]
    async fn test_category_delete_cascades_items() {
        let pool = testing::pool().await;
        let cat = seed_category(&pool, "Drinks").await;
        let other = seed_category(&pool, "Food").await;
        let coke = create(&pool, RESTAURANT, payload("Coke", cat)).await.unwrap();
        let naan = create(&pool, RESTAURANT, payload("Naan", other)).await.unwrap();

        category::delete(&pool, RESTAURANT, cat).await.unwrap();

        assert!(find_by_id(&pool, RESTAURANT, coke.id).await.unwrap().is_none());
        assert!(find_by_id(&pool, RESTAURANT, naan.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_filters() {
        let pool = testing::pool().await;
        let drinks = seed_category(&pool, "Drinks").await;
        let food = seed_category(&pool, "Food").await;
        create(&pool, RESTAURANT, payload("Coke", drinks)).await.unwrap();
        let mut naan = payload("Garlic Naan", food);
        naan.tags = vec!["Hot".into()];
        create(&pool, RESTAURANT, naan).await.unwrap();

        let by_cat = find_all(
            &pool,
            RESTAURANT,
            &ItemQuery {
                category_id: Some(food),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_cat.len(), 1);
        assert_eq!(by_cat[0].name, "Garlic Naan");

        let by_search = find_all(
            &pool,
            RESTAURANT,
            &ItemQuery {
                search: Some("naan".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_search.len(), 1);

        let by_tag = find_all(
            &pool,
            RESTAURANT,
            &ItemQuery {
                tag: Some("COLD".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].name, "Coke");

        let unknown_tag = find_all(
            &pool,
            RESTAURANT,
            &ItemQuery {
                tag: Some("nope".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(unknown_tag.is_empty());
    }

    #[tokio::test]
    async fn test_tag_delete_detaches_from_items() {
        let pool = testing::pool().await;
        let cat = seed_category(&pool, "Drinks").await;
        let item = create(&pool, RESTAURANT, payload("Coke", cat)).await.unwrap();
        let cold = tag::find_by_name(&pool, RESTAURANT, "cold").await.unwrap().unwrap();

        tag::delete(&pool, RESTAURANT, cold.id).await.unwrap();

        let item = find_by_id(&pool, RESTAURANT, item.id).await.unwrap().unwrap();
        assert!(item.tags.is_empty());
    }
}
