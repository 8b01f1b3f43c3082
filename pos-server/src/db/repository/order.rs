//! Order Repository
//!
//! Soft-deleted orders are invisible to every reader here.

use shared::models::{Order, OrderStatus};
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::RepoResult;

const COLUMNS: &str = "id, restaurant_id, bill_number, table_id, section_id, section_name, waiter_id, \
    waiter_name, items, charges, subtotal, total, current_round, status, payment_method, is_deleted, \
    deleted_reason, created_at, updated_at, completed_at";

/// Filter for [`list`]; `since` is a unix-millis lower bound on `created_at`
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub since: Option<i64>,
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

pub async fn find_by_id<'e, E>(executor: E, restaurant_id: i64, id: i64) -> RepoResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = ? AND restaurant_id = ? AND is_deleted = 0"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(executor)
    .await?;
    Ok(order)
}

/// Pending orders of a table, oldest first
pub async fn find_pending_for_table<'e, E>(executor: E, restaurant_id: i64, table_id: i64) -> RepoResult<Vec<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders \
         WHERE restaurant_id = ? AND table_id = ? AND status = ? AND is_deleted = 0 \
         ORDER BY created_at, id"
    ))
    .bind(restaurant_id)
    .bind(table_id)
    .bind(OrderStatus::Pending)
    .fetch_all(executor)
    .await?;
    Ok(orders)
}

pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO orders ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(order.id)
    .bind(order.restaurant_id)
    .bind(&order.bill_number)
    .bind(order.table_id)
    .bind(order.section_id)
    .bind(&order.section_name)
    .bind(order.waiter_id)
    .bind(&order.waiter_name)
    .bind(Json(&order.items))
    .bind(Json(&order.charges))
    .bind(order.subtotal)
    .bind(order.total)
    .bind(order.current_round)
    .bind(order.status)
    .bind(&order.payment_method)
    .bind(order.is_deleted)
    .bind(&order.deleted_reason)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.completed_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Persist the mutable content of a pending order
pub async fn update_contents(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "UPDATE orders SET section_name = ?, waiter_id = ?, waiter_name = ?, items = ?, charges = ?, \
         subtotal = ?, total = ?, current_round = ?, updated_at = ? \
         WHERE id = ? AND restaurant_id = ?",
    )
    .bind(&order.section_name)
    .bind(order.waiter_id)
    .bind(&order.waiter_name)
    .bind(Json(&order.items))
    .bind(Json(&order.charges))
    .bind(order.subtotal)
    .bind(order.total)
    .bind(order.current_round)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(order.restaurant_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn soft_delete(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    id: i64,
    reason: Option<&str>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE orders SET is_deleted = 1, deleted_reason = ?, updated_at = ? WHERE id = ? AND restaurant_id = ?",
    )
    .bind(reason)
    .bind(now)
    .bind(id)
    .bind(restaurant_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Complete every pending order of a table; returns the number of orders settled
pub async fn complete_pending(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    table_id: i64,
    payment_method: &str,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?, payment_method = ?, completed_at = ?, updated_at = ? \
         WHERE restaurant_id = ? AND table_id = ? AND status = ? AND is_deleted = 0",
    )
    .bind(OrderStatus::Completed)
    .bind(payment_method)
    .bind(now)
    .bind(now)
    .bind(restaurant_id)
    .bind(table_id)
    .bind(OrderStatus::Pending)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, restaurant_id: i64, filter: &'a OrderFilter) {
    qb.push(" WHERE is_deleted = 0 AND restaurant_id = ").push_bind(restaurant_id);
    if let Some(since) = filter.since {
        qb.push(" AND created_at >= ").push_bind(since);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        qb.push(" AND (LOWER(bill_number) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(section_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(COALESCE(waiter_name, '')) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Page of non-deleted orders, newest first, with the unpaged total
pub async fn list(pool: &SqlitePool, restaurant_id: i64, filter: &OrderFilter) -> RepoResult<(Vec<Order>, i64)> {
    let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filter(&mut count, restaurant_id, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut page: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM orders"));
    push_filter(&mut page, restaurant_id, filter);
    page.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    let orders = page.build_query_as::<Order>().fetch_all(pool).await?;

    Ok((orders, total))
}
