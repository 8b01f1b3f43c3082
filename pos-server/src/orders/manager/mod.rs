//! OrdersManager - dine-in order commands
//!
//! Every command that writes an order also rewrites the summary columns of
//! its table, inside the same transaction and under the table's lock.
//!
//! # Command Flow
//!
//! ```text
//! place_order(table, lines, waiter)
//!     ├─ 1. Validate lines
//!     ├─ 2. Lock table
//!     ├─ 3. Load table, section, waiter
//!     ├─ 4. Find pending order, or mint a bill number (committed on its own)
//!     ├─ 5. Replace lines, stamp round, apply section charges
//!     ├─ 6. BEGIN
//!     ├─ 7. Insert / update order
//!     ├─ 8. Rewrite table summary from all pending orders
//!     └─ 9. COMMIT
//! ```

mod error;
pub use error::*;

#[cfg(test)]
mod tests;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{
    ClearOrdersRequest, DiningTable, Order, OrderDeleted, OrderItem, OrderPage, OrderStatus,
    Pagination, PlaceOrderRequest, TableOrderView, WaiterSnapshot,
};
use shared::util::snowflake_id;
use sqlx::{SqliteConnection, SqlitePool};

use super::billing::{self, Totals};
use super::locks::TableLocks;
use crate::db::repository::dining_table::{self, TableSummary};
use crate::db::repository::order::{self as order_repo, OrderFilter};
use crate::db::repository::{restaurant, section, waiter};
use crate::utils::money::{to_decimal, to_f64};
use crate::utils::time::{TimeRange, business_date, range_start_millis};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN};

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

/// GET /api/orders query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    #[serde(default)]
    pub time_range: TimeRange,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Order engine handle (cheap to clone)
#[derive(Clone)]
pub struct OrdersManager {
    pool: SqlitePool,
    locks: TableLocks,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("pool", &"<SqlitePool>")
            .field("locks", &"<TableLocks>")
            .finish()
    }
}

impl OrdersManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: TableLocks::new(),
        }
    }

    async fn load_table(&self, restaurant_id: i64, table_id: i64) -> ManagerResult<DiningTable> {
        dining_table::find_by_id(&self.pool, restaurant_id, table_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Table {table_id} not found")))
    }

    async fn load_order(&self, restaurant_id: i64, order_id: i64) -> ManagerResult<Order> {
        order_repo::find_by_id(&self.pool, restaurant_id, order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {order_id} not found")))
    }

    async fn section_name(&self, restaurant_id: i64, section_id: i64) -> ManagerResult<Option<String>> {
        Ok(section::find_by_id(&self.pool, restaurant_id, section_id)
            .await?
            .map(|s| s.name))
    }

    // ========== Commands ==========

    /// Create the table's pending order, or replace the lines of the existing one
    pub async fn place_order(
        &self,
        restaurant_id: i64,
        table_id: i64,
        request: PlaceOrderRequest,
    ) -> ManagerResult<TableOrderView> {
        if request.orders.is_empty() {
            return Err(OrderError::InvalidOperation(
                "orders must contain at least one item".into(),
            ));
        }
        for (index, item) in request.orders.iter().enumerate() {
            billing::validate_item(index, item)?;
        }

        let _guard = self.locks.lock(table_id).await;

        let table = self.load_table(restaurant_id, table_id).await?;
        let section = section::find_by_id(&self.pool, restaurant_id, table.section_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Section {} not found", table.section_id)))?;
        let new_waiter = match request.waiter_id {
            Some(waiter_id) => {
                let w = waiter::find_by_id(&self.pool, restaurant_id, waiter_id)
                    .await?
                    .ok_or_else(|| OrderError::NotFound(format!("Waiter {waiter_id} not found")))?;
                Some(WaiterSnapshot {
                    id: w.id,
                    name: w.name,
                    phone_number: w.phone_number,
                })
            }
            None => None,
        };

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let existing = order_repo::find_pending_for_table(&self.pool, restaurant_id, table_id)
            .await?
            .pop();
        let is_new = existing.is_none();

        let mut order = match existing {
            Some(order) => order,
            None => {
                let date = business_date(now);
                let counter = restaurant::next_bill_counter(&self.pool, restaurant_id, date).await?;
                Order {
                    id: snowflake_id(),
                    restaurant_id,
                    bill_number: billing::format_bill_number(date, counter),
                    table_id,
                    section_id: section.id,
                    section_name: section.name.clone(),
                    waiter_id: None,
                    waiter_name: None,
                    items: Vec::new(),
                    charges: Vec::new(),
                    subtotal: 0.0,
                    total: 0.0,
                    current_round: 0,
                    status: OrderStatus::Pending,
                    payment_method: None,
                    is_deleted: false,
                    deleted_reason: None,
                    created_at: now_ms,
                    updated_at: now_ms,
                    completed_at: None,
                }
            }
        };

        order.current_round += 1;
        order.items = billing::stamp_items(request.orders, order.current_round);
        let Totals {
            subtotal,
            charges,
            total,
        } = billing::compute_totals(&order.items, &section.charges);
        order.subtotal = subtotal;
        order.charges = charges;
        order.total = total;
        order.section_name = section.name.clone();
        order.updated_at = now_ms;
        if let Some(w) = &new_waiter {
            order.waiter_id = Some(w.id);
            order.waiter_name = Some(w.name.clone());
        }

        let table_waiter = match new_waiter {
            Some(w) => Some(w),
            None if is_new => None,
            None => table.waiter.clone(),
        };
        let first_order_time = match table.first_order_time {
            Some(t) if !is_new => t,
            _ => now_ms,
        };

        let mut tx = self.pool.begin().await?;
        if is_new {
            order_repo::insert(&mut *tx, &order).await?;
        } else {
            order_repo::update_contents(&mut *tx, &order).await?;
        }
        let (items, amount) = pending_summary(&mut *tx, restaurant_id, table_id)
            .await?
            .unwrap_or_default();
        dining_table::write_summary(
            &mut *tx,
            restaurant_id,
            table_id,
            &TableSummary {
                items: &items,
                amount,
                bill_number: &order.bill_number,
                first_order_time,
                waiter: table_waiter.as_ref(),
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            restaurant_id,
            table_id,
            order_id = order.id,
            bill_number = %order.bill_number,
            round = order.current_round,
            total = order.total,
            created = is_new,
            "Order placed"
        );

        let table = self.load_table(restaurant_id, table_id).await?;
        Ok(table_view(table, Some(order.section_name.clone()), Some(&order)))
    }

    /// Soft-delete an order and resync its table
    pub async fn delete_order(
        &self,
        restaurant_id: i64,
        order_id: i64,
        reason: Option<String>,
    ) -> ManagerResult<OrderDeleted> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if let Some(r) = &reason
            && r.len() > MAX_NOTE_LEN
        {
            return Err(OrderError::InvalidOperation(format!(
                "reason is too long (max {MAX_NOTE_LEN})"
            )));
        }

        let table_id = self.load_order(restaurant_id, order_id).await?.table_id;
        let _guard = self.locks.lock(table_id).await;
        // Re-read under the lock
        let order = self.load_order(restaurant_id, order_id).await?;

        let mut tx = self.pool.begin().await?;
        order_repo::soft_delete(
            &mut *tx,
            restaurant_id,
            order.id,
            reason.as_deref(),
            Utc::now().timestamp_millis(),
        )
        .await?;
        resync_table(&mut *tx, restaurant_id, order.table_id).await?;
        tx.commit().await?;

        tracing::info!(
            restaurant_id,
            order_id = order.id,
            table_id = order.table_id,
            reason = reason.as_deref().unwrap_or(""),
            "Order deleted"
        );

        Ok(OrderDeleted {
            message: "Order deleted successfully".into(),
            order_id: order.id,
        })
    }

    /// Settle every pending order of a table and free the table
    pub async fn clear_orders(
        &self,
        restaurant_id: i64,
        table_id: i64,
        request: ClearOrdersRequest,
    ) -> ManagerResult<TableOrderView> {
        let payment_method = request
            .payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| OrderError::InvalidOperation("paymentMethod is required".into()))?
            .to_string();
        if payment_method.len() > MAX_SHORT_TEXT_LEN {
            return Err(OrderError::InvalidOperation(format!(
                "paymentMethod is too long (max {MAX_SHORT_TEXT_LEN})"
            )));
        }

        let _guard = self.locks.lock(table_id).await;
        let table = self.load_table(restaurant_id, table_id).await?;
        let bill_number = table.bill_number.clone();

        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        let settled =
            order_repo::complete_pending(&mut *tx, restaurant_id, table_id, &payment_method, now_ms)
                .await?;
        dining_table::reset_summary(&mut *tx, restaurant_id, table_id).await?;
        tx.commit().await?;

        tracing::info!(
            restaurant_id,
            table_id,
            settled,
            payment_method = %payment_method,
            bill_number = bill_number.as_deref().unwrap_or(""),
            "Table cleared"
        );

        let table = self.load_table(restaurant_id, table_id).await?;
        let section_name = self.section_name(restaurant_id, table.section_id).await?;
        let mut view = table_view(table, section_name, None);
        view.bill_number = bill_number;
        view.payment_method = Some(payment_method);
        Ok(view)
    }

    /// Cancel one line of a pending order
    pub async fn cancel_item(
        &self,
        restaurant_id: i64,
        order_id: i64,
        index: usize,
        reason: &str,
    ) -> ManagerResult<TableOrderView> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(OrderError::InvalidOperation("reason is required".into()));
        }
        if reason.len() > MAX_NOTE_LEN {
            return Err(OrderError::InvalidOperation(format!(
                "reason is too long (max {MAX_NOTE_LEN})"
            )));
        }

        let table_id = self.load_order(restaurant_id, order_id).await?.table_id;
        let _guard = self.locks.lock(table_id).await;
        let mut order = self.load_order(restaurant_id, order_id).await?;

        if order.status != OrderStatus::Pending {
            return Err(OrderError::InvalidOperation(format!(
                "Order {order_id} is not pending"
            )));
        }
        let len = order.items.len();
        let item = order.items.get_mut(index).ok_or_else(|| {
            OrderError::InvalidOperation(format!("Item index {index} out of range (0..{len})"))
        })?;
        if item.is_cancelled {
            return Err(OrderError::InvalidOperation(format!(
                "Item {index} is already cancelled"
            )));
        }
        item.is_cancelled = true;
        item.cancelled_reason = Some(reason.to_string());

        let Totals {
            subtotal,
            charges,
            total,
        } = billing::recompute_totals(&order.items, &order.charges);
        order.subtotal = subtotal;
        order.charges = charges;
        order.total = total;
        order.updated_at = Utc::now().timestamp_millis();

        let mut tx = self.pool.begin().await?;
        order_repo::update_contents(&mut *tx, &order).await?;
        resync_table(&mut *tx, restaurant_id, order.table_id).await?;
        tx.commit().await?;

        tracing::info!(
            restaurant_id,
            order_id,
            index,
            total = order.total,
            "Order item cancelled"
        );

        let table = self.load_table(restaurant_id, order.table_id).await?;
        Ok(table_view(table, Some(order.section_name.clone()), Some(&order)))
    }

    // ========== Queries ==========

    pub async fn get_order(&self, restaurant_id: i64, order_id: i64) -> ManagerResult<Order> {
        self.load_order(restaurant_id, order_id).await
    }

    /// The table's current pending order
    pub async fn get_table_order(&self, restaurant_id: i64, table_id: i64) -> ManagerResult<Order> {
        self.load_table(restaurant_id, table_id).await?;
        order_repo::find_pending_for_table(&self.pool, restaurant_id, table_id)
            .await?
            .pop()
            .ok_or_else(|| OrderError::NotFound(format!("No pending order for table {table_id}")))
    }

    pub async fn list_orders(&self, restaurant_id: i64, query: OrderListQuery) -> ManagerResult<OrderPage> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(OrderError::InvalidOperation("page must be at least 1".into()));
        }
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(OrderError::InvalidOperation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        let filter = OrderFilter {
            since: range_start_millis(query.time_range, Utc::now()),
            search: query.search,
            offset: (page - 1) * limit,
            limit,
        };
        let (orders, total) = order_repo::list(&self.pool, restaurant_id, &filter).await?;

        Ok(OrderPage {
            orders,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: (total + limit - 1) / limit,
            },
        })
    }
}

/// Concatenated lines and summed totals of the table's pending orders
///
/// `None` when the table has no pending order.
async fn pending_summary(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    table_id: i64,
) -> ManagerResult<Option<(Vec<OrderItem>, f64)>> {
    let pending = order_repo::find_pending_for_table(&mut *conn, restaurant_id, table_id).await?;
    if pending.is_empty() {
        return Ok(None);
    }
    let amount: Decimal = pending.iter().map(|o| to_decimal(o.total)).sum();
    let items = pending.into_iter().flat_map(|o| o.items).collect();
    Ok(Some((items, to_f64(amount))))
}

/// Reset the table when nothing is pending, otherwise refresh its lines and amount
async fn resync_table(conn: &mut SqliteConnection, restaurant_id: i64, table_id: i64) -> ManagerResult<()> {
    match pending_summary(&mut *conn, restaurant_id, table_id).await? {
        Some((items, amount)) => {
            dining_table::write_items(conn, restaurant_id, table_id, &items, amount).await?
        }
        None => dining_table::reset_summary(conn, restaurant_id, table_id).await?,
    }
    Ok(())
}

/// Merged table + order view
fn table_view(table: DiningTable, section_name: Option<String>, order: Option<&Order>) -> TableOrderView {
    TableOrderView {
        table_id: table.id,
        table_name: table.name,
        table_number: table.table_number,
        section_id: table.section_id,
        section_name,
        order_id: order.map(|o| o.id),
        bill_number: table.bill_number,
        has_orders: table.has_orders,
        current_order_items: table.current_order_items,
        current_bill_amount: table.current_bill_amount,
        charges: order.map(|o| o.charges.clone()).unwrap_or_default(),
        payment_method: table.payment_method,
        waiter_id: table.waiter_id,
        waiter: table.waiter,
        first_order_time: table.first_order_time,
        created_at: order.map(|o| o.created_at),
        updated_at: table.updated_at,
    }
}
