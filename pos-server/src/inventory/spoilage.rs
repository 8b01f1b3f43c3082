//! Spoilage records
//!
//! Creating a record takes the quantity out of stock (refused when not
//! enough is on hand); deleting it puts the quantity back.

use shared::models::{Spoilage, SpoilageCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::ledger;
use crate::db::repository::{RepoError, RepoResult, item, require, spoilage, vendor};
use crate::utils::money::line_total;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_QUANTITY};

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: SpoilageCreate) -> RepoResult<Spoilage> {
    let quantity = data.spoiled_quantity;
    if !quantity.is_finite() || quantity <= 0.0 || quantity > MAX_QUANTITY {
        return Err(RepoError::Validation(format!(
            "spoiledQuantity must be between 0 and {MAX_QUANTITY}, got {quantity}"
        )));
    }
    if let Some(notes) = &data.notes
        && notes.len() > MAX_NOTE_LEN
    {
        return Err(RepoError::Validation(format!("notes is too long (max {MAX_NOTE_LEN})")));
    }
    let stock = require(
        item::find_by_id(pool, restaurant_id, data.item_id).await?,
        "Item",
        data.item_id,
    )?;
    if let Some(vendor_id) = data.vendor_id {
        require(vendor::find_by_id(pool, restaurant_id, vendor_id).await?, "Vendor", vendor_id)?;
    }

    let record = Spoilage {
        id: snowflake_id(),
        restaurant_id,
        item_id: stock.id,
        item_name: stock.name,
        spoiled_quantity: quantity,
        reason: data.reason,
        notes: data.notes,
        vendor_id: data.vendor_id,
        price: stock.price,
        total_loss_value: line_total(stock.price, quantity),
        created_at: now_millis(),
    };

    let mut tx = pool.begin().await?;
    ledger::spoil(&mut *tx, restaurant_id, record.item_id, quantity).await?;
    spoilage::insert(&mut *tx, &record).await?;
    tx.commit().await?;

    tracing::info!(
        restaurant_id,
        spoilage_id = record.id,
        item_id = record.item_id,
        quantity,
        loss = record.total_loss_value,
        "Spoilage recorded"
    );
    Ok(record)
}

pub async fn list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Spoilage>> {
    spoilage::find_all(pool, restaurant_id).await
}

pub async fn get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<Spoilage> {
    require(spoilage::find_by_id(pool, restaurant_id, id).await?, "Spoilage", id)
}

/// Delete a record and return its quantity to stock
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    let record = get(pool, restaurant_id, id).await?;

    let mut tx = pool.begin().await?;
    let restored =
        ledger::adjust_quantity(&mut *tx, restaurant_id, record.item_id, record.spoiled_quantity).await?;
    spoilage::delete(&mut *tx, restaurant_id, id).await?;
    tx.commit().await?;

    if !restored {
        tracing::warn!(spoilage_id = id, item_id = record.item_id, "Spoiled item no longer exists");
    }
    tracing::info!(restaurant_id, spoilage_id = id, "Spoilage deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};
    use crate::db::repository::category;
    use shared::models::{CategoryCreate, Item, ItemCreate, SpoilageReason};

    async fn seed_item(pool: &SqlitePool) -> Item {
        let cat = category::create(pool, RESTAURANT, CategoryCreate { name: "Dairy".into() })
            .await
            .unwrap();
        item::create(
            pool,
            RESTAURANT,
            ItemCreate {
                name: "Milk".into(),
                price: 3.33,
                category_id: cat.id,
                quantity: Some(10.0),
                tags: vec![],
            },
        )
        .await
        .unwrap()
    }

    fn payload(item_id: i64, quantity: f64) -> SpoilageCreate {
        SpoilageCreate {
            item_id,
            spoiled_quantity: quantity,
            reason: SpoilageReason::Expired,
            notes: None,
            vendor_id: None,
        }
    }

    async fn quantity(pool: &SqlitePool, id: i64) -> f64 {
        item::find_by_id(pool, RESTAURANT, id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_round_trip_restores_quantity() {
        let pool = testing::pool().await;
        let milk = seed_item(&pool).await;

        let record = create(&pool, RESTAURANT, payload(milk.id, 3.0)).await.unwrap();
        assert_eq!(record.item_name, "Milk");
        assert_eq!(record.price, 3.33);
        assert_eq!(record.total_loss_value, 9.99);
        assert_eq!(quantity(&pool, milk.id).await, 7.0);

        delete(&pool, RESTAURANT, record.id).await.unwrap();
        assert_eq!(quantity(&pool, milk.id).await, 10.0);
        assert!(matches!(get(&pool, RESTAURANT, record.id).await, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_no_record() {
        let pool = testing::pool().await;
        let milk = seed_item(&pool).await;

        let result = create(&pool, RESTAURANT, payload(milk.id, 11.0)).await;
        assert!(matches!(result, Err(RepoError::InsufficientStock(_))));
        assert!(list(&pool, RESTAURANT).await.unwrap().is_empty());
        assert_eq!(quantity(&pool, milk.id).await, 10.0);
    }

    #[tokio::test]
    async fn test_validation() {
        let pool = testing::pool().await;
        let milk = seed_item(&pool).await;

        let zero = create(&pool, RESTAURANT, payload(milk.id, 0.0)).await;
        assert!(matches!(zero, Err(RepoError::Validation(_))));

        let mut unknown_vendor = payload(milk.id, 1.0);
        unknown_vendor.vendor_id = Some(99);
        let result = create(&pool, RESTAURANT, unknown_vendor).await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));

        let foreign = create(&pool, OTHER_RESTAURANT, payload(milk.id, 1.0)).await;
        assert!(matches!(foreign, Err(RepoError::NotFound(_))));
    }
}
