//! IVM orders (purchase / sale / stockout)
//!
//! A non-cancelled order's lines are reflected in stock:
//! purchase lines through [`ledger::apply_purchase`], sale and stockout
//! lines through [`ledger::apply_consumption`]. Updating an order reverts
//! every delta of the stored version and applies the new one; deleting
//! reverts.

use rust_decimal::Decimal;
use shared::models::{
    IvmOrder, IvmOrderCreate, IvmOrderItem, IvmOrderKind, IvmOrderQuery, IvmOrderStatus,
    IvmOrderUpdate,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::ledger;
use crate::db::repository::{RepoError, RepoResult, item, ivm_order, require, vendor};
use crate::utils::money::{to_decimal, to_f64};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_QUANTITY};

const ORDER_TYPES: [&str; 3] = ["purchaseOrder", "saleOrder", "stockoutOrder"];

fn applies_stock(status: IvmOrderStatus) -> bool {
    status != IvmOrderStatus::Cancelled
}

fn validate_notes(notes: Option<&str>) -> RepoResult<()> {
    if let Some(notes) = notes
        && notes.len() > MAX_NOTE_LEN
    {
        return Err(RepoError::Validation(format!("notes is too long (max {MAX_NOTE_LEN})")));
    }
    Ok(())
}

async fn validate_kind(pool: &SqlitePool, restaurant_id: i64, kind: &IvmOrderKind) -> RepoResult<()> {
    if let Some(vendor_id) = kind.vendor_id() {
        require(vendor::find_by_id(pool, restaurant_id, vendor_id).await?, "Vendor", vendor_id)?;
    }
    Ok(())
}

/// Check quantities and prices, resolve every line against the item table
///
/// Line names are taken from the item so the order keeps a readable snapshot.
async fn prepare_items(
    pool: &SqlitePool,
    restaurant_id: i64,
    lines: Vec<IvmOrderItem>,
) -> RepoResult<Vec<IvmOrderItem>> {
    if lines.is_empty() {
        return Err(RepoError::Validation("items must contain at least one line".into()));
    }
    let mut prepared = Vec::with_capacity(lines.len());
    for (index, line) in lines.into_iter().enumerate() {
        if !line.quantity.is_finite() || line.quantity <= 0.0 || line.quantity > MAX_QUANTITY {
            return Err(RepoError::Validation(format!(
                "items[{index}].quantity must be between 0 and {MAX_QUANTITY}, got {}",
                line.quantity
            )));
        }
        if !line.price.is_finite() || line.price < 0.0 {
            return Err(RepoError::Validation(format!(
                "items[{index}].price must be non-negative, got {}",
                line.price
            )));
        }
        let stock = require(
            item::find_by_id(pool, restaurant_id, line.item_id).await?,
            "Item",
            line.item_id,
        )?;
        prepared.push(IvmOrderItem {
            name: stock.name,
            ..line
        });
    }
    Ok(prepared)
}

fn total_amount(items: &[IvmOrderItem]) -> f64 {
    let sum: Decimal = items
        .iter()
        .map(|l| to_decimal(l.price) * to_decimal(l.quantity))
        .sum();
    to_f64(sum)
}

async fn apply_stock(conn: &mut SqliteConnection, order: &IvmOrder) -> RepoResult<()> {
    if !applies_stock(order.status) {
        return Ok(());
    }
    for line in &order.items {
        if order.kind.is_purchase() {
            ledger::apply_purchase(conn, order.restaurant_id, line.item_id, line.quantity, line.price).await?;
        } else {
            ledger::apply_consumption(conn, order.restaurant_id, line.item_id, line.quantity).await?;
        }
    }
    Ok(())
}

/// Undo [`apply_stock`]; lines whose item no longer exists are skipped
async fn revert_stock(conn: &mut SqliteConnection, order: &IvmOrder) -> RepoResult<()> {
    if !applies_stock(order.status) {
        return Ok(());
    }
    for line in &order.items {
        let found = if order.kind.is_purchase() {
            ledger::revert_purchase(conn, order.restaurant_id, line.item_id, line.quantity, line.price)
                .await?
        } else {
            ledger::adjust_quantity(conn, order.restaurant_id, line.item_id, line.quantity).await?
        };
        if !found {
            tracing::warn!(order_id = order.id, item_id = line.item_id, "Reverted line has no item");
        }
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: IvmOrderCreate) -> RepoResult<IvmOrder> {
    validate_notes(data.notes.as_deref())?;
    validate_kind(pool, restaurant_id, &data.kind).await?;
    let items = prepare_items(pool, restaurant_id, data.items).await?;

    let now = now_millis();
    let order = IvmOrder {
        id: snowflake_id(),
        restaurant_id,
        kind: data.kind,
        total_amount: total_amount(&items),
        items,
        status: data.status.unwrap_or(IvmOrderStatus::Pending),
        expected_delivery_date: data.expected_delivery_date,
        notes: data.notes,
        created_at: now,
        updated_at: now,
    };

    let mut tx = pool.begin().await?;
    ivm_order::insert(&mut *tx, &order).await?;
    apply_stock(&mut *tx, &order).await?;
    tx.commit().await?;

    tracing::info!(
        restaurant_id,
        order_id = order.id,
        order_type = order.kind.type_name(),
        lines = order.items.len(),
        total_amount = order.total_amount,
        "IVM order created"
    );
    Ok(order)
}

pub async fn list(pool: &SqlitePool, restaurant_id: i64, query: &IvmOrderQuery) -> RepoResult<Vec<IvmOrder>> {
    let order_type = query.order_type.as_deref().filter(|t| !t.is_empty());
    if let Some(order_type) = order_type
        && !ORDER_TYPES.contains(&order_type)
    {
        return Err(RepoError::Validation(format!(
            "orderType must be one of {}",
            ORDER_TYPES.join(", ")
        )));
    }
    ivm_order::find_all(pool, restaurant_id, order_type).await
}

pub async fn get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<IvmOrder> {
    require(ivm_order::find_by_id(pool, restaurant_id, id).await?, "IVM order", id)
}

/// Partial update; the order type is fixed at creation
pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: IvmOrderUpdate,
) -> RepoResult<IvmOrder> {
    let existing = get(pool, restaurant_id, id).await?;
    validate_notes(data.notes.as_deref())?;

    let kind = match (existing.kind, data.vendor_id, data.destination) {
        (IvmOrderKind::PurchaseOrder { .. }, Some(vendor_id), None) => {
            IvmOrderKind::PurchaseOrder { vendor_id }
        }
        (IvmOrderKind::SaleOrder { .. }, None, Some(destination)) => {
            IvmOrderKind::SaleOrder { destination }
        }
        (IvmOrderKind::StockoutOrder { .. }, None, Some(destination)) => {
            IvmOrderKind::StockoutOrder { destination }
        }
        (kind, None, None) => kind,
        (kind, _, _) => {
            return Err(RepoError::Validation(format!(
                "{} accepts {} only",
                kind.type_name(),
                if kind.is_purchase() { "vendorId" } else { "destination" }
            )));
        }
    };
    validate_kind(pool, restaurant_id, &kind).await?;
    let items = match data.items {
        Some(lines) => prepare_items(pool, restaurant_id, lines).await?,
        None => existing.items.clone(),
    };

    let updated = IvmOrder {
        kind,
        total_amount: total_amount(&items),
        items,
        status: data.status.unwrap_or(existing.status),
        expected_delivery_date: data.expected_delivery_date.or(existing.expected_delivery_date),
        notes: data.notes.or_else(|| existing.notes.clone()),
        updated_at: now_millis(),
        ..existing.clone()
    };

    let mut tx = pool.begin().await?;
    revert_stock(&mut *tx, &existing).await?;
    apply_stock(&mut *tx, &updated).await?;
    ivm_order::update(&mut *tx, &updated).await?;
    tx.commit().await?;

    tracing::info!(
        restaurant_id,
        order_id = id,
        status = updated.status.as_str(),
        total_amount = updated.total_amount,
        "IVM order updated"
    );
    Ok(updated)
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    let existing = get(pool, restaurant_id, id).await?;

    let mut tx = pool.begin().await?;
    revert_stock(&mut *tx, &existing).await?;
    ivm_order::delete(&mut *tx, restaurant_id, id).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, order_id = id, "IVM order deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};
    use crate::db::repository::category;
    use shared::models::{CategoryCreate, Destination, Item, ItemCreate, VendorCreate};

    struct Fixture {
        pool: SqlitePool,
        vendor_id: i64,
        rice: Item,
    }

    async fn fixture() -> Fixture {
        let pool = testing::pool().await;
        let cat = category::create(&pool, RESTAURANT, CategoryCreate { name: "Dry".into() })
            .await
            .unwrap();
        let rice = item::create(
            &pool,
            RESTAURANT,
            ItemCreate {
                name: "Rice".into(),
                price: 10.0,
                category_id: cat.id,
                quantity: Some(5.0),
                tags: vec![],
            },
        )
        .await
        .unwrap();
        let vendor = vendor::create(
            &pool,
            RESTAURANT,
            VendorCreate {
                name: "Grain Co".into(),
                phone_number: None,
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();
        Fixture {
            pool,
            vendor_id: vendor.id,
            rice,
        }
    }

    fn line(item_id: i64, quantity: f64, price: f64) -> IvmOrderItem {
        IvmOrderItem {
            item_id,
            name: String::new(),
            quantity,
            price,
        }
    }

    fn purchase(f: &Fixture, quantity: f64, price: f64) -> IvmOrderCreate {
        IvmOrderCreate {
            kind: IvmOrderKind::PurchaseOrder {
                vendor_id: f.vendor_id,
            },
            items: vec![line(f.rice.id, quantity, price)],
            status: None,
            expected_delivery_date: None,
            notes: None,
        }
    }

    async fn rice(f: &Fixture) -> Item {
        item::find_by_id(&f.pool, RESTAURANT, f.rice.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_purchase_order_books_stock() {
        let f = fixture().await;
        let order = create(&f.pool, RESTAURANT, purchase(&f, 10.0, 20.0)).await.unwrap();
        assert_eq!(order.total_amount, 200.0);
        assert_eq!(order.items[0].name, "Rice");
        assert_eq!(order.status, IvmOrderStatus::Pending);

        let rice = rice(&f).await;
        assert_eq!(rice.quantity, 15.0);
        assert_eq!(rice.total_purchase_value, 250.0);
        assert_eq!(rice.avg_price, 16.67);
    }

    #[tokio::test]
    async fn test_unknown_vendor_or_item_rejected() {
        let f = fixture().await;
        let mut bad_vendor = purchase(&f, 1.0, 1.0);
        bad_vendor.kind = IvmOrderKind::PurchaseOrder { vendor_id: 404 };
        assert!(matches!(
            create(&f.pool, RESTAURANT, bad_vendor).await,
            Err(RepoError::NotFound(_))
        ));

        let foreign = create(&f.pool, OTHER_RESTAURANT, IvmOrderCreate {
            kind: IvmOrderKind::SaleOrder {
                destination: Destination::Sale,
            },
            items: vec![line(f.rice.id, 1.0, 1.0)],
            status: None,
            expected_delivery_date: None,
            notes: None,
        })
        .await;
        assert!(matches!(foreign, Err(RepoError::NotFound(_))));
        assert_eq!(rice(&f).await.quantity, 5.0);
    }

    #[tokio::test]
    async fn test_stockout_decrements() {
        let f = fixture().await;
        create(
            &f.pool,
            RESTAURANT,
            IvmOrderCreate {
                kind: IvmOrderKind::StockoutOrder {
                    destination: Destination::Kitchen,
                },
                items: vec![line(f.rice.id, 2.0, 10.0)],
                status: None,
                expected_delivery_date: None,
                notes: Some("lunch prep".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(rice(&f).await.quantity, 3.0);
    }

    #[tokio::test]
    async fn test_update_reverts_then_reapplies() {
        let f = fixture().await;
        let order = create(&f.pool, RESTAURANT, purchase(&f, 10.0, 20.0)).await.unwrap();

        let updated = update(
            &f.pool,
            RESTAURANT,
            order.id,
            IvmOrderUpdate {
                items: Some(vec![line(f.rice.id, 4.0, 20.0)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.total_amount, 80.0);

        let rice = rice(&f).await;
        assert_eq!(rice.quantity, 9.0);
        assert_eq!(rice.total_purchase_value, 130.0);
        assert_eq!(rice.avg_price, 14.44);
    }

    #[tokio::test]
    async fn test_cancel_and_delete_revert() {
        let f = fixture().await;
        let sale = create(
            &f.pool,
            RESTAURANT,
            IvmOrderCreate {
                kind: IvmOrderKind::SaleOrder {
                    destination: Destination::Sale,
                },
                items: vec![line(f.rice.id, 2.0, 15.0)],
                status: None,
                expected_delivery_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(rice(&f).await.quantity, 3.0);

        update(
            &f.pool,
            RESTAURANT,
            sale.id,
            IvmOrderUpdate {
                status: Some(IvmOrderStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rice(&f).await.quantity, 5.0);

        // Cancelled orders carry no stock, so deleting changes nothing
        delete(&f.pool, RESTAURANT, sale.id).await.unwrap();
        assert_eq!(rice(&f).await.quantity, 5.0);

        let purchase_order = create(&f.pool, RESTAURANT, purchase(&f, 10.0, 20.0)).await.unwrap();
        delete(&f.pool, RESTAURANT, purchase_order.id).await.unwrap();
        let rice = rice(&f).await;
        assert_eq!(rice.quantity, 5.0);
        assert_eq!(rice.total_purchase_value, 50.0);
        assert!(matches!(
            get(&f.pool, RESTAURANT, purchase_order.id).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_kind_fields_must_match() {
        let f = fixture().await;
        let order = create(&f.pool, RESTAURANT, purchase(&f, 1.0, 1.0)).await.unwrap();
        let result = update(
            &f.pool,
            RESTAURANT,
            order.id,
            IvmOrderUpdate {
                destination: Some(Destination::Kitchen),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let f = fixture().await;
        create(&f.pool, RESTAURANT, purchase(&f, 1.0, 1.0)).await.unwrap();

        let purchases = list(
            &f.pool,
            RESTAURANT,
            &IvmOrderQuery {
                order_type: Some("purchaseOrder".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(purchases.len(), 1);

        let sales = list(
            &f.pool,
            RESTAURANT,
            &IvmOrderQuery {
                order_type: Some("saleOrder".into()),
            },
        )
        .await
        .unwrap();
        assert!(sales.is_empty());

        let bad = list(
            &f.pool,
            RESTAURANT,
            &IvmOrderQuery {
                order_type: Some("refund".into()),
            },
        )
        .await;
        assert!(matches!(bad, Err(RepoError::Validation(_))));
    }
}
