//! IVM Order Repository
//!
//! The order kind is stored as `order_type` plus the nullable column that
//! kind requires; rows are mapped back into [`IvmOrderKind`] on read.

use shared::models::{Destination, IvmOrder, IvmOrderItem, IvmOrderKind, IvmOrderStatus};
use sqlx::types::Json;
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};

const SELECT: &str = "SELECT id, restaurant_id, order_type, vendor_id, destination, items, status, \
    expected_delivery_date, total_amount, notes, created_at, updated_at FROM ivm_order";

#[derive(Debug, FromRow)]
struct IvmOrderRow {
    id: i64,
    restaurant_id: i64,
    order_type: String,
    vendor_id: Option<i64>,
    destination: Option<String>,
    #[sqlx(json)]
    items: Vec<IvmOrderItem>,
    status: String,
    expected_delivery_date: Option<i64>,
    total_amount: f64,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

fn corrupt(id: i64, what: &str) -> RepoError {
    RepoError::Database(format!("IVM order {id} has invalid {what}"))
}

impl TryFrom<IvmOrderRow> for IvmOrder {
    type Error = RepoError;

    fn try_from(row: IvmOrderRow) -> Result<Self, Self::Error> {
        let destination = || {
            row.destination
                .as_deref()
                .and_then(Destination::parse)
                .ok_or_else(|| corrupt(row.id, "destination"))
        };
        let kind = match row.order_type.as_str() {
            "purchaseOrder" => IvmOrderKind::PurchaseOrder {
                vendor_id: row.vendor_id.ok_or_else(|| corrupt(row.id, "vendor"))?,
            },
            "saleOrder" => IvmOrderKind::SaleOrder {
                destination: destination()?,
            },
            "stockoutOrder" => IvmOrderKind::StockoutOrder {
                destination: destination()?,
            },
            _ => return Err(corrupt(row.id, "order type")),
        };
        let status = IvmOrderStatus::parse(&row.status).ok_or_else(|| corrupt(row.id, "status"))?;

        Ok(IvmOrder {
            id: row.id,
            restaurant_id: row.restaurant_id,
            kind,
            items: row.items,
            status,
            expected_delivery_date: row.expected_delivery_date,
            total_amount: row.total_amount,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64, order_type: Option<&str>) -> RepoResult<Vec<IvmOrder>> {
    let rows = match order_type {
        Some(order_type) => {
            sqlx::query_as::<_, IvmOrderRow>(&format!(
                "{SELECT} WHERE restaurant_id = ? AND order_type = ? ORDER BY created_at DESC"
            ))
            .bind(restaurant_id)
            .bind(order_type)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, IvmOrderRow>(&format!(
                "{SELECT} WHERE restaurant_id = ? ORDER BY created_at DESC"
            ))
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?
        }
    };
    rows.into_iter().map(IvmOrder::try_from).collect()
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<IvmOrder>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, IvmOrderRow>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;
    row.map(IvmOrder::try_from).transpose()
}

pub async fn insert(conn: &mut SqliteConnection, order: &IvmOrder) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO ivm_order (id, restaurant_id, order_type, vendor_id, destination, items, status, \
         expected_delivery_date, total_amount, notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.restaurant_id)
    .bind(order.kind.type_name())
    .bind(order.kind.vendor_id())
    .bind(order.kind.destination().map(|d| d.as_str()))
    .bind(Json(&order.items))
    .bind(order.status.as_str())
    .bind(order.expected_delivery_date)
    .bind(order.total_amount)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, order: &IvmOrder) -> RepoResult<()> {
    sqlx::query(
        "UPDATE ivm_order SET vendor_id = ?, destination = ?, items = ?, status = ?, \
         expected_delivery_date = ?, total_amount = ?, notes = ?, updated_at = ? \
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(order.kind.vendor_id())
    .bind(order.kind.destination().map(|d| d.as_str()))
    .bind(Json(&order.items))
    .bind(order.status.as_str())
    .bind(order.expected_delivery_date)
    .bind(order.total_amount)
    .bind(&order.notes)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(order.restaurant_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, restaurant_id: i64, id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM ivm_order WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};

    fn order(kind: IvmOrderKind) -> IvmOrder {
        IvmOrder {
            id: shared::util::snowflake_id(),
            restaurant_id: RESTAURANT,
            kind,
            items: vec![IvmOrderItem {
                item_id: 1,
                name: "Rice".into(),
                quantity: 2.0,
                price: 50.0,
            }],
            status: IvmOrderStatus::Pending,
            expected_delivery_date: None,
            total_amount: 100.0,
            notes: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[tokio::test]
    async fn test_kind_survives_storage() {
        let pool = testing::pool().await;
        let purchase = order(IvmOrderKind::PurchaseOrder { vendor_id: 7 });
        let stockout = order(IvmOrderKind::StockoutOrder {
            destination: Destination::Kitchen,
        });
        let mut conn = pool.acquire().await.unwrap();
        insert(&mut conn, &purchase).await.unwrap();
        insert(&mut conn, &stockout).await.unwrap();
        drop(conn);

        let loaded = find_by_id(&pool, RESTAURANT, purchase.id).await.unwrap().unwrap();
        assert_eq!(loaded, purchase);

        let stockouts = find_all(&pool, RESTAURANT, Some("stockoutOrder")).await.unwrap();
        assert_eq!(stockouts, vec![stockout]);

        assert!(find_by_id(&pool, OTHER_RESTAURANT, purchase.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let pool = testing::pool().await;
        sqlx::query(
            "INSERT INTO ivm_order (id, restaurant_id, order_type, items, status, total_amount, created_at, updated_at) \
             VALUES (5, ?, 'saleOrder', '[]', 'pending', 0, 0, 0)",
        )
        .bind(RESTAURANT)
        .execute(&pool)
        .await
        .unwrap();

        let result = find_by_id(&pool, RESTAURANT, 5).await;
        assert!(matches!(result, Err(RepoError::Database(_))));
    }
}
