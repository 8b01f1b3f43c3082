//! Dining Table Repository
//!
//! Plain CRUD plus the summary writers used by the order engine. The
//! summary writers take a connection so they join the engine's transaction.

use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, OrderItem, WaiterSnapshot};
use shared::util::{now_millis, snowflake_id};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult, require, section};

const SELECT: &str = "SELECT id, restaurant_id, name, table_number, section_id, seats, has_orders, \
    current_order_items, current_bill_amount, bill_number, first_order_time, payment_method, \
    waiter_id, waiter, created_at, updated_at FROM dining_table";

const DEFAULT_SEATS: i32 = 4;

/// Pending-order summary written onto a table
#[derive(Debug, Clone)]
pub struct TableSummary<'a> {
    pub items: &'a [OrderItem],
    pub amount: f64,
    pub bill_number: &'a str,
    pub first_order_time: i64,
    pub waiter: Option<&'a WaiterSnapshot>,
}

pub async fn find_all(
    pool: &SqlitePool,
    restaurant_id: i64,
    section_id: Option<i64>,
) -> RepoResult<Vec<DiningTable>> {
    let tables = match section_id {
        Some(section_id) => {
            sqlx::query_as::<_, DiningTable>(&format!(
                "{SELECT} WHERE restaurant_id = ? AND section_id = ? ORDER BY table_number"
            ))
            .bind(restaurant_id)
            .bind(section_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DiningTable>(&format!(
                "{SELECT} WHERE restaurant_id = ? ORDER BY table_number"
            ))
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(tables)
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<DiningTable>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let table = sqlx::query_as::<_, DiningTable>(&format!("{SELECT} WHERE id = ? AND restaurant_id = ?"))
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;
    Ok(table)
}

async fn find_by_number(pool: &SqlitePool, restaurant_id: i64, number: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "{SELECT} WHERE restaurant_id = ? AND table_number = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(number)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

fn validate_number(number: i64) -> RepoResult<()> {
    if number <= 0 {
        return Err(RepoError::Validation("tableNumber must be a positive integer".into()));
    }
    Ok(())
}

fn validate_seats(seats: i32) -> RepoResult<()> {
    if seats <= 0 {
        return Err(RepoError::Validation("seats must be positive".into()));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: DiningTableCreate) -> RepoResult<DiningTable> {
    validate_number(data.table_number)?;
    let seats = data.seats.unwrap_or(DEFAULT_SEATS);
    validate_seats(seats)?;
    require(
        section::find_by_id(pool, restaurant_id, data.section_id).await?,
        "Section",
        data.section_id,
    )?;
    if find_by_number(pool, restaurant_id, data.table_number).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table number {} already exists",
            data.table_number
        )));
    }

    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO dining_table (id, restaurant_id, name, table_number, section_id, seats, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.table_number)
    .bind(data.section_id)
    .bind(seats)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Table", id)
}

pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: DiningTableUpdate,
) -> RepoResult<DiningTable> {
    let existing = require(find_by_id(pool, restaurant_id, id).await?, "Table", id)?;

    if let Some(number) = data.table_number {
        validate_number(number)?;
        if let Some(other) = find_by_number(pool, restaurant_id, number).await?
            && other.id != id
        {
            return Err(RepoError::Duplicate(format!("Table number {number} already exists")));
        }
    }
    if let Some(seats) = data.seats {
        validate_seats(seats)?;
    }
    if let Some(section_id) = data.section_id
        && section_id != existing.section_id
    {
        require(
            section::find_by_id(pool, restaurant_id, section_id).await?,
            "Section",
            section_id,
        )?;
    }

    sqlx::query(
        "UPDATE dining_table SET name = ?, table_number = ?, section_id = ?, seats = ?, updated_at = ? \
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(data.name.as_deref().map(str::trim).unwrap_or(&existing.name))
    .bind(data.table_number.unwrap_or(existing.table_number))
    .bind(data.section_id.unwrap_or(existing.section_id))
    .bind(data.seats.unwrap_or(existing.seats))
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    require(find_by_id(pool, restaurant_id, id).await?, "Table", id)
}

/// Delete a table together with its orders and its group memberships
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    require(find_by_id(pool, restaurant_id, id).await?, "Table", id)?;

    let mut tx = pool.begin().await?;
    let orders = sqlx::query("DELETE FROM orders WHERE table_id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "UPDATE table_group SET table_ids = \
            (SELECT json_group_array(value) FROM json_each(table_group.table_ids) WHERE value != ?1) \
         WHERE restaurant_id = ?2 AND EXISTS \
            (SELECT 1 FROM json_each(table_group.table_ids) WHERE value = ?1)",
    )
    .bind(id)
    .bind(restaurant_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM dining_table WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(
        table_id = id,
        orders_deleted = orders.rows_affected(),
        "Table deleted"
    );
    Ok(true)
}

/// Write the full pending summary (order placed or re-placed)
pub async fn write_summary(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    id: i64,
    summary: &TableSummary<'_>,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET has_orders = 1, current_order_items = ?, current_bill_amount = ?, \
         bill_number = ?, first_order_time = ?, payment_method = NULL, waiter_id = ?, waiter = ?, updated_at = ? \
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(Json(summary.items))
    .bind(summary.amount)
    .bind(summary.bill_number)
    .bind(summary.first_order_time)
    .bind(summary.waiter.map(|w| w.id))
    .bind(Json(summary.waiter))
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Refresh items and amount only; bill number, waiter and first order time stay
pub async fn write_items(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    id: i64,
    items: &[OrderItem],
    amount: f64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET has_orders = 1, current_order_items = ?, current_bill_amount = ?, updated_at = ? \
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(Json(items))
    .bind(amount)
    .bind(now_millis())
    .bind(id)
    .bind(restaurant_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Back to the empty state
pub async fn reset_summary(conn: &mut SqliteConnection, restaurant_id: i64, id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET has_orders = 0, current_order_items = '[]', current_bill_amount = 0, \
         bill_number = NULL, first_order_time = NULL, payment_method = NULL, waiter_id = NULL, \
         waiter = 'null', updated_at = ? WHERE id = ? AND restaurant_id = ?",
    )
    .bind(now_millis())
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
    use shared::models::SectionCreate;

    async fn seed_section(pool: &SqlitePool) -> i64 {
        section::create(
            pool,
            RESTAURANT,
            SectionCreate {
                name: "Patio".into(),
                charges: vec![],
            },
        )
        .await
        .unwrap()
        .id
    }

    fn payload(number: i64, section_id: i64) -> DiningTableCreate {
        DiningTableCreate {
            name: format!("T{number}"),
            table_number: number,
            section_id,
            seats: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_empty_summary() {
        let pool = testing::pool().await;
        let section_id = seed_section(&pool).await;
        let table = create(&pool, RESTAURANT, payload(1, section_id)).await.unwrap();
        assert!(!table.has_orders);
        assert!(table.current_order_items.is_empty());
        assert_eq!(table.seats, DEFAULT_SEATS);
        assert!(table.waiter.is_none());
    }

    #[tokio::test]
    async fn test_table_number_rules() {
        let pool = testing::pool().await;
        let section_id = seed_section(&pool).await;
        create(&pool, RESTAURANT, payload(1, section_id)).await.unwrap();

        let dup = create(&pool, RESTAURANT, payload(1, section_id)).await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));

        let zero = create(&pool, RESTAURANT, payload(0, section_id)).await;
        assert!(matches!(zero, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_section_must_belong_to_tenant() {
        let pool = testing::pool().await;
        let section_id = seed_section(&pool).await;
        let result = create(&pool, OTHER_RESTAURANT, payload(1, section_id)).await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_summary_write_and_reset() {
        let pool = testing::pool().await;
        let section_id = seed_section(&pool).await;
        let table = create(&pool, RESTAURANT, payload(3, section_id)).await.unwrap();
        let items = vec![OrderItem {
            name: "Coke".into(),
            price: 20.0,
            quantity: 2,
            category_name: None,
            item_id: None,
            is_cancelled: false,
            cancelled_reason: None,
            round: 1,
        }];
        let waiter = WaiterSnapshot {
            id: 9,
            name: "Asha".into(),
            phone_number: "555".into(),
        };

        let mut conn = pool.acquire().await.unwrap();
        write_summary(
            &mut conn,
            RESTAURANT,
            table.id,
            &TableSummary {
                items: &items,
                amount: 40.0,
                bill_number: "2601010001",
                first_order_time: 1,
                waiter: Some(&waiter),
            },
        )
        .await
        .unwrap();
        drop(conn);

        let written = find_by_id(&pool, RESTAURANT, table.id).await.unwrap().unwrap();
        assert!(written.has_orders);
        assert_eq!(written.current_order_items, items);
        assert_eq!(written.waiter, Some(waiter));
        assert_eq!(written.waiter_id, Some(9));

        let mut conn = pool.acquire().await.unwrap();
        reset_summary(&mut conn, RESTAURANT, table.id).await.unwrap();
        drop(conn);

        let reset = find_by_id(&pool, RESTAURANT, table.id).await.unwrap().unwrap();
        assert!(!reset.has_orders);
        assert!(reset.bill_number.is_none());
        assert!(reset.waiter.is_none());
        assert_eq!(reset.current_bill_amount, 0.0);
    }
}
