//! Stock ledger
//!
//! Each function is one guarded `UPDATE ... RETURNING` on the item row,
//! run on the caller's transaction. `avg_price` is derived in `Decimal`
//! from the returned totals and left alone while quantity is not positive.

use shared::util::now_millis;
use sqlx::SqliteConnection;

use crate::db::repository::{RepoError, RepoResult, item, require};
use crate::utils::money::{to_decimal, to_f64};

async fn refresh_avg_price(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    item_id: i64,
    quantity: f64,
    total_purchase_value: f64,
) -> RepoResult<()> {
    if quantity <= 0.0 {
        return Ok(());
    }
    let avg_price = to_f64(to_decimal(total_purchase_value) / to_decimal(quantity));
    sqlx::query("UPDATE item SET avg_price = ? WHERE id = ? AND restaurant_id = ?")
        .bind(avg_price)
        .bind(item_id)
        .bind(restaurant_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Receive `quantity` units bought at `price`; `price` becomes the item price
pub async fn apply_purchase(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    item_id: i64,
    quantity: f64,
    price: f64,
) -> RepoResult<()> {
    let value = to_f64(to_decimal(price) * to_decimal(quantity));
    let row: Option<(f64, f64)> = sqlx::query_as(
        "UPDATE item SET quantity = quantity + ?, total_purchase_value = ROUND(total_purchase_value + ?, 2), \
         price = ?, updated_at = ? WHERE id = ? AND restaurant_id = ? \
         RETURNING quantity, total_purchase_value",
    )
    .bind(quantity)
    .bind(value)
    .bind(price)
    .bind(now_millis())
    .bind(item_id)
    .bind(restaurant_id)
    .fetch_optional(&mut *conn)
    .await?;
    let (quantity, total_purchase_value) = require(row, "Item", item_id)?;
    refresh_avg_price(conn, restaurant_id, item_id, quantity, total_purchase_value).await
}

/// Undo a purchase; a missing item is skipped
///
/// The purchase value leaves `total_purchase_value`, floored at zero.
pub async fn revert_purchase(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    item_id: i64,
    quantity: f64,
    price: f64,
) -> RepoResult<bool> {
    let value = to_f64(to_decimal(price) * to_decimal(quantity));
    let row: Option<(f64, f64)> = sqlx::query_as(
        "UPDATE item SET quantity = quantity - ?, \
         total_purchase_value = MAX(0, ROUND(total_purchase_value - ?, 2)), updated_at = ? \
         WHERE id = ? AND restaurant_id = ? RETURNING quantity, total_purchase_value",
    )
    .bind(quantity)
    .bind(value)
    .bind(now_millis())
    .bind(item_id)
    .bind(restaurant_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some((quantity, total_purchase_value)) = row else {
        return Ok(false);
    };
    refresh_avg_price(conn, restaurant_id, item_id, quantity, total_purchase_value).await?;
    Ok(true)
}

/// Add `delta` (may be negative) to the quantity; `false` when the item is gone
pub async fn adjust_quantity(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    item_id: i64,
    delta: f64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE item SET quantity = quantity + ?, updated_at = ? WHERE id = ? AND restaurant_id = ?",
    )
    .bind(delta)
    .bind(now_millis())
    .bind(item_id)
    .bind(restaurant_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Sale / stockout: decrement without a floor
pub async fn apply_consumption(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    item_id: i64,
    quantity: f64,
) -> RepoResult<()> {
    if !adjust_quantity(conn, restaurant_id, item_id, -quantity).await? {
        return Err(RepoError::NotFound(format!("Item {item_id} not found")));
    }
    Ok(())
}

/// Spoilage: decrement only when enough stock is on hand
pub async fn spoil(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    item_id: i64,
    quantity: f64,
) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE item SET quantity = quantity - ?1, updated_at = ?2 \
         WHERE id = ?3 AND restaurant_id = ?4 AND quantity >= ?1",
    )
    .bind(quantity)
    .bind(now_millis())
    .bind(item_id)
    .bind(restaurant_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(());
    }

    match item::find_by_id(&mut *conn, restaurant_id, item_id).await? {
        Some(found) => Err(RepoError::InsufficientStock(format!(
            "'{}' has {} in stock, cannot spoil {}",
            found.name, found.quantity, quantity
        ))),
        None => Err(RepoError::NotFound(format!("Item {item_id} not found"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};
    use crate::db::repository::category;
    use shared::models::{CategoryCreate, Item, ItemCreate};
    use sqlx::SqlitePool;

    async fn seed_item(pool: &SqlitePool, quantity: f64, price: f64) -> Item {
        let cat = category::create(pool, RESTAURANT, CategoryCreate { name: "Dry".into() })
            .await
            .unwrap();
        item::create(
            pool,
            RESTAURANT,
            ItemCreate {
                name: "Rice".into(),
                price,
                category_id: cat.id,
                quantity: Some(quantity),
                tags: vec![],
            },
        )
        .await
        .unwrap()
    }

    async fn reload(pool: &SqlitePool, id: i64) -> Item {
        item::find_by_id(pool, RESTAURANT, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_purchase_updates_weighted_average() {
        let pool = testing::pool().await;
        let rice = seed_item(&pool, 5.0, 10.0).await;
        assert_eq!(rice.total_purchase_value, 50.0);

        let mut conn = pool.acquire().await.unwrap();
        apply_purchase(&mut conn, RESTAURANT, rice.id, 10.0, 20.0).await.unwrap();
        drop(conn);

        let rice = reload(&pool, rice.id).await;
        assert_eq!(rice.quantity, 15.0);
        assert_eq!(rice.total_purchase_value, 250.0);
        assert_eq!(rice.avg_price, 16.67);
        assert_eq!(rice.price, 20.0);
    }

    #[tokio::test]
    async fn test_revert_purchase_restores_stock() {
        let pool = testing::pool().await;
        let rice = seed_item(&pool, 5.0, 10.0).await;

        let mut conn = pool.acquire().await.unwrap();
        apply_purchase(&mut conn, RESTAURANT, rice.id, 10.0, 20.0).await.unwrap();
        assert!(revert_purchase(&mut conn, RESTAURANT, rice.id, 10.0, 20.0).await.unwrap());
        drop(conn);

        let rice = reload(&pool, rice.id).await;
        assert_eq!(rice.quantity, 5.0);
        assert_eq!(rice.total_purchase_value, 50.0);
        assert_eq!(rice.avg_price, 10.0);
    }

    #[tokio::test]
    async fn test_avg_price_kept_when_stock_runs_out() {
        let pool = testing::pool().await;
        let rice = seed_item(&pool, 5.0, 10.0).await;

        let mut conn = pool.acquire().await.unwrap();
        apply_consumption(&mut conn, RESTAURANT, rice.id, 5.0).await.unwrap();
        apply_purchase(&mut conn, RESTAURANT, rice.id, 0.0, 12.0).await.unwrap();
        drop(conn);

        let rice = reload(&pool, rice.id).await;
        assert_eq!(rice.quantity, 0.0);
        assert_eq!(rice.avg_price, 10.0);
    }

    #[tokio::test]
    async fn test_consumption_has_no_floor() {
        let pool = testing::pool().await;
        let rice = seed_item(&pool, 2.0, 10.0).await;

        let mut conn = pool.acquire().await.unwrap();
        apply_consumption(&mut conn, RESTAURANT, rice.id, 3.0).await.unwrap();
        drop(conn);

        assert_eq!(reload(&pool, rice.id).await.quantity, -1.0);
    }

    #[tokio::test]
    async fn test_spoil_is_guarded() {
        let pool = testing::pool().await;
        let rice = seed_item(&pool, 2.0, 10.0).await;

        let mut conn = pool.acquire().await.unwrap();
        let too_much = spoil(&mut conn, RESTAURANT, rice.id, 3.0).await;
        assert!(matches!(too_much, Err(RepoError::InsufficientStock(_))));

        let other = spoil(&mut conn, OTHER_RESTAURANT, rice.id, 1.0).await;
        assert!(matches!(other, Err(RepoError::NotFound(_))));

        spoil(&mut conn, RESTAURANT, rice.id, 2.0).await.unwrap();
        drop(conn);

        assert_eq!(reload(&pool, rice.id).await.quantity, 0.0);
    }
}
