use super::*;
use crate::db::repository::testing::{self, OTHER_RESTAURANT, RESTAURANT};
use shared::models::{
    ChargeType, DiningTableCreate, OrderItemInput, SectionCharge, SectionCreate, WaiterCreate,
};
use sqlx::types::Json;

struct Fixture {
    pool: SqlitePool,
    manager: OrdersManager,
    table_id: i64,
}

async fn fixture_with_charges(charges: Vec<SectionCharge>) -> Fixture {
    let pool = testing::pool().await;
    let section = section::create(
        &pool,
        RESTAURANT,
        SectionCreate {
            name: "Main Hall".into(),
            charges,
        },
    )
    .await
    .unwrap();
    let table = dining_table::create(
        &pool,
        RESTAURANT,
        DiningTableCreate {
            name: "T1".into(),
            table_number: 1,
            section_id: section.id,
            seats: None,
        },
    )
    .await
    .unwrap();
    Fixture {
        manager: OrdersManager::new(pool.clone()),
        pool,
        table_id: table.id,
    }
}

async fn fixture() -> Fixture {
    fixture_with_charges(vec![]).await
}

fn coke(quantity: i32) -> OrderItemInput {
    OrderItemInput {
        name: "Coke".into(),
        price: 50.0,
        quantity,
        category_name: Some("Drinks".into()),
        item_id: None,
        is_cancelled: false,
        cancelled_reason: None,
        round: None,
    }
}

fn request(lines: Vec<OrderItemInput>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        orders: lines,
        waiter_id: None,
    }
}

async fn table(f: &Fixture) -> DiningTable {
    dining_table::find_by_id(&f.pool, RESTAURANT, f.table_id)
        .await
        .unwrap()
        .unwrap()
}

fn is_bill_number(value: &str) -> bool {
    value.len() == 10 && value.chars().all(|c| c.is_ascii_digit())
}

#[tokio::test]
async fn test_replace_not_add() {
    let f = fixture().await;

    let first = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();
    assert!(first.has_orders);
    assert_eq!(first.current_bill_amount, 100.0);
    let bill = first.bill_number.clone().unwrap();
    assert!(is_bill_number(&bill), "bad bill number {bill}");

    let second = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(1)]))
        .await
        .unwrap();
    assert_eq!(second.current_bill_amount, 50.0);
    assert_eq!(second.bill_number.as_deref(), Some(bill.as_str()));
    assert_eq!(second.order_id, first.order_id);
    assert_eq!(second.current_order_items.len(), 1);
    assert_eq!(second.current_order_items[0].quantity, 1);
}

#[tokio::test]
async fn test_rounds_are_stamped() {
    let f = fixture().await;
    f.manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(1)]))
        .await
        .unwrap();

    let mut kept = coke(1);
    kept.round = Some(1);
    let view = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![kept, coke(3)]))
        .await
        .unwrap();

    let order = f.manager.get_order(RESTAURANT, view.order_id.unwrap()).await.unwrap();
    assert_eq!(order.current_round, 2);
    assert_eq!(order.items[0].round, 1);
    assert_eq!(order.items[1].round, 2);
}

#[tokio::test]
async fn test_section_charges_applied() {
    let f = fixture_with_charges(vec![
        SectionCharge {
            name: "Service".into(),
            value: 10.0,
            charge_type: ChargeType::Percentage,
        },
        SectionCharge {
            name: "Cover".into(),
            value: 15.0,
            charge_type: ChargeType::Fixed,
        },
    ])
    .await;

    let view = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();
    assert_eq!(view.charges.len(), 2);
    assert_eq!(view.charges[0].amount, 10.0);
    assert_eq!(view.current_bill_amount, 125.0);

    let order = f.manager.get_order(RESTAURANT, view.order_id.unwrap()).await.unwrap();
    let lines: f64 = order
        .items
        .iter()
        .filter(|i| !i.is_cancelled)
        .map(|i| i.price * i.quantity as f64)
        .sum();
    let charges: f64 = order.charges.iter().map(|c| c.amount).sum();
    assert_eq!(order.subtotal, 100.0);
    assert_eq!(order.total, lines + charges);
}

#[tokio::test]
async fn test_waiter_snapshot_kept_across_rounds() {
    let f = fixture().await;
    let waiter = waiter::create(
        &f.pool,
        RESTAURANT,
        WaiterCreate {
            name: "Asha".into(),
            phone_number: "9000000001".into(),
        },
    )
    .await
    .unwrap();

    f.manager
        .place_order(
            RESTAURANT,
            f.table_id,
            PlaceOrderRequest {
                orders: vec![coke(1)],
                waiter_id: Some(waiter.id),
            },
        )
        .await
        .unwrap();
    let view = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();

    assert_eq!(view.waiter_id, Some(waiter.id));
    assert_eq!(view.waiter.map(|w| w.name), Some("Asha".to_string()));
    let order = f.manager.get_table_order(RESTAURANT, f.table_id).await.unwrap();
    assert_eq!(order.waiter_name.as_deref(), Some("Asha"));
}

#[tokio::test]
async fn test_unknown_waiter_rejected_before_any_write() {
    let f = fixture().await;
    let result = f
        .manager
        .place_order(
            RESTAURANT,
            f.table_id,
            PlaceOrderRequest {
                orders: vec![coke(1)],
                waiter_id: Some(12345),
            },
        )
        .await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
    assert!(!table(&f).await.has_orders);
}

#[tokio::test]
async fn test_empty_and_invalid_lines_rejected() {
    let f = fixture().await;
    let empty = f.manager.place_order(RESTAURANT, f.table_id, request(vec![])).await;
    assert!(matches!(empty, Err(OrderError::InvalidOperation(_))));

    let zero = f.manager.place_order(RESTAURANT, f.table_id, request(vec![coke(0)])).await;
    assert!(matches!(zero, Err(OrderError::InvalidOperation(_))));
}

#[tokio::test]
async fn test_other_tenant_cannot_touch_table() {
    let f = fixture().await;
    let result = f
        .manager
        .place_order(OTHER_RESTAURANT, f.table_id, request(vec![coke(1)]))
        .await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_only_pending_order_resets_table() {
    let f = fixture().await;
    let view = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();
    let order_id = view.order_id.unwrap();

    let deleted = f
        .manager
        .delete_order(RESTAURANT, order_id, Some("wrong table".into()))
        .await
        .unwrap();
    assert_eq!(deleted.order_id, order_id);

    let t = table(&f).await;
    assert!(!t.has_orders);
    assert_eq!(t.current_bill_amount, 0.0);
    assert!(t.bill_number.is_none());
    assert!(t.current_order_items.is_empty());

    let gone = f.manager.get_order(RESTAURANT, order_id).await;
    assert!(matches!(gone, Err(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_with_other_pending_order_recomputes() {
    let f = fixture().await;
    let view = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();
    let first = f.manager.get_order(RESTAURANT, view.order_id.unwrap()).await.unwrap();

    // Second pending order on the same table, as left behind by older data
    let mut second = first.clone();
    second.id = first.id + 1;
    second.bill_number = "0000000001".into();
    second.items = vec![OrderItem {
        name: "Tea".into(),
        price: 30.0,
        quantity: 1,
        category_name: None,
        item_id: None,
        is_cancelled: false,
        cancelled_reason: None,
        round: 1,
    }];
    second.total = 30.0;
    second.created_at = first.created_at + 1;
    sqlx::query(
        "INSERT INTO orders (id, restaurant_id, bill_number, table_id, section_id, section_name, items, charges, \
         subtotal, total, current_round, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, '[]', ?, ?, 1, 'pending', ?, ?)",
    )
    .bind(second.id)
    .bind(RESTAURANT)
    .bind(&second.bill_number)
    .bind(f.table_id)
    .bind(second.section_id)
    .bind(&second.section_name)
    .bind(Json(&second.items))
    .bind(second.total)
    .bind(second.total)
    .bind(second.created_at)
    .bind(second.created_at)
    .execute(&f.pool)
    .await
    .unwrap();

    f.manager.delete_order(RESTAURANT, second.id, None).await.unwrap();

    let t = table(&f).await;
    assert!(t.has_orders);
    assert_eq!(t.current_bill_amount, 100.0);
    assert_eq!(t.current_order_items.len(), 1);
    assert_eq!(t.current_order_items[0].name, "Coke");
    assert_eq!(t.bill_number, Some(first.bill_number));
}

#[tokio::test]
async fn test_clear_requires_payment_method() {
    let f = fixture().await;
    f.manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();

    for payment_method in [None, Some("   ".to_string())] {
        let result = f
            .manager
            .clear_orders(RESTAURANT, f.table_id, ClearOrdersRequest { payment_method })
            .await;
        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
    }

    let t = table(&f).await;
    assert!(t.has_orders);
    assert_eq!(t.current_bill_amount, 100.0);
    assert!(f.manager.get_table_order(RESTAURANT, f.table_id).await.is_ok());
}

#[tokio::test]
async fn test_clear_completes_and_echoes_bill_number() {
    let f = fixture().await;
    let placed = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2)]))
        .await
        .unwrap();

    let cleared = f
        .manager
        .clear_orders(
            RESTAURANT,
            f.table_id,
            ClearOrdersRequest {
                payment_method: Some("cash".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.bill_number, placed.bill_number);
    assert_eq!(cleared.payment_method.as_deref(), Some("cash"));
    assert!(!cleared.has_orders);

    let t = table(&f).await;
    assert!(t.bill_number.is_none());

    let order = f.manager.get_order(RESTAURANT, placed.order_id.unwrap()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.payment_method.as_deref(), Some("cash"));
    assert!(order.completed_at.is_some());

    // Next order on the freed table gets a fresh bill number
    let next = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(1)]))
        .await
        .unwrap();
    assert_ne!(next.bill_number, placed.bill_number);
    assert_ne!(next.order_id, placed.order_id);
}

#[tokio::test]
async fn test_bill_numbers_increase_within_day() {
    let f = fixture().await;
    let mut seen = Vec::new();
    for _ in 0..3 {
        let view = f
            .manager
            .place_order(RESTAURANT, f.table_id, request(vec![coke(1)]))
            .await
            .unwrap();
        seen.push(view.bill_number.unwrap());
        f.manager
            .clear_orders(
                RESTAURANT,
                f.table_id,
                ClearOrdersRequest {
                    payment_method: Some("card".into()),
                },
            )
            .await
            .unwrap();
    }
    let suffixes: Vec<u32> = seen.iter().map(|b| b[6..].parse().unwrap()).collect();
    assert!(suffixes.windows(2).all(|w| w[1] == w[0] + 1), "{seen:?}");
}

#[tokio::test]
async fn test_cancel_item_recomputes_total() {
    let f = fixture_with_charges(vec![SectionCharge {
        name: "Service".into(),
        value: 10.0,
        charge_type: ChargeType::Percentage,
    }])
    .await;
    let mut tea = coke(1);
    tea.name = "Tea".into();
    tea.price = 30.0;
    let view = f
        .manager
        .place_order(RESTAURANT, f.table_id, request(vec![coke(2), tea]))
        .await
        .unwrap();
    assert_eq!(view.current_bill_amount, 143.0);
    let order_id = view.order_id.unwrap();

    let blank = f.manager.cancel_item(RESTAURANT, order_id, 1, " ").await;
    assert!(matches!(blank, Err(OrderError::InvalidOperation(_))));
    let out_of_range = f.manager.cancel_item(RESTAURANT, order_id, 5, "gone").await;
    assert!(matches!(out_of_range, Err(OrderError::InvalidOperation(_))));

    let view = f.manager.cancel_item(RESTAURANT, order_id, 1, "out of stock").await.unwrap();
    assert_eq!(view.current_bill_amount, 110.0);
    assert!(view.current_order_items[1].is_cancelled);

    let again = f.manager.cancel_item(RESTAURANT, order_id, 1, "twice").await;
    assert!(matches!(again, Err(OrderError::InvalidOperation(_))));
}

#[tokio::test]
async fn test_list_orders_paginates_and_searches() {
    let f = fixture().await;
    let mut bills = Vec::new();
    for _ in 0..3 {
        let view = f
            .manager
            .place_order(RESTAURANT, f.table_id, request(vec![coke(1)]))
            .await
            .unwrap();
        bills.push(view.bill_number.unwrap());
        f.manager
            .clear_orders(
                RESTAURANT,
                f.table_id,
                ClearOrdersRequest {
                    payment_method: Some("upi".into()),
                },
            )
            .await
            .unwrap();
    }

    let page = f
        .manager
        .list_orders(
            RESTAURANT,
            OrderListQuery {
                time_range: TimeRange::Today,
                page: Some(1),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.orders.len(), 2);
    assert_eq!(
        page.pagination,
        Pagination {
            page: 1,
            limit: 2,
            total: 3,
            total_pages: 2
        }
    );

    let found = f
        .manager
        .list_orders(
            RESTAURANT,
            OrderListQuery {
                search: Some(bills[1].clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(found.orders.len(), 1);
    assert_eq!(found.orders[0].bill_number, bills[1]);

    let by_section = f
        .manager
        .list_orders(
            RESTAURANT,
            OrderListQuery {
                search: Some("main hall".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_section.pagination.total, 3);

    let other = f
        .manager
        .list_orders(OTHER_RESTAURANT, OrderListQuery::default())
        .await
        .unwrap();
    assert!(other.orders.is_empty());

    let bad = f
        .manager
        .list_orders(
            RESTAURANT,
            OrderListQuery {
                limit: Some(101),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad, Err(OrderError::InvalidOperation(_))));
}
