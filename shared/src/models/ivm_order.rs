//! Inventory (IVM) Order Model: purchase, sale and stockout orders

use serde::{Deserialize, Serialize};

/// Where a sale/stockout moves stock to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Kitchen,
    Sale,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Kitchen => "kitchen",
            Destination::Sale => "sale",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "kitchen" => Some(Destination::Kitchen),
            "sale" => Some(Destination::Sale),
            _ => None,
        }
    }
}

/// Order type with the fields each type requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "orderType", rename_all = "camelCase")]
pub enum IvmOrderKind {
    #[serde(rename_all = "camelCase")]
    PurchaseOrder { vendor_id: i64 },
    #[serde(rename_all = "camelCase")]
    SaleOrder { destination: Destination },
    #[serde(rename_all = "camelCase")]
    StockoutOrder { destination: Destination },
}

impl IvmOrderKind {
    /// Value of the `order_type` column
    pub fn type_name(&self) -> &'static str {
        match self {
            IvmOrderKind::PurchaseOrder { .. } => "purchaseOrder",
            IvmOrderKind::SaleOrder { .. } => "saleOrder",
            IvmOrderKind::StockoutOrder { .. } => "stockoutOrder",
        }
    }

    pub fn vendor_id(&self) -> Option<i64> {
        match self {
            IvmOrderKind::PurchaseOrder { vendor_id } => Some(*vendor_id),
            _ => None,
        }
    }

    pub fn destination(&self) -> Option<Destination> {
        match self {
            IvmOrderKind::SaleOrder { destination } | IvmOrderKind::StockoutOrder { destination } => {
                Some(*destination)
            }
            IvmOrderKind::PurchaseOrder { .. } => None,
        }
    }

    pub fn is_purchase(&self) -> bool {
        matches!(self, IvmOrderKind::PurchaseOrder { .. })
    }
}

/// IVM order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvmOrderStatus {
    Pending,
    Received,
    Cancelled,
}

impl IvmOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IvmOrderStatus::Pending => "pending",
            IvmOrderStatus::Received => "received",
            IvmOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(IvmOrderStatus::Pending),
            "received" => Some(IvmOrderStatus::Received),
            "cancelled" => Some(IvmOrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Stock line of an IVM order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvmOrderItem {
    pub item_id: i64,
    /// Filled from the item on write
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

/// IVM order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvmOrder {
    pub id: i64,
    pub restaurant_id: i64,
    #[serde(flatten)]
    pub kind: IvmOrderKind,
    pub items: Vec<IvmOrderItem>,
    pub status: IvmOrderStatus,
    pub expected_delivery_date: Option<i64>,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// POST /api/ivm/orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvmOrderCreate {
    #[serde(flatten)]
    pub kind: IvmOrderKind,
    pub items: Vec<IvmOrderItem>,
    pub status: Option<IvmOrderStatus>,
    pub expected_delivery_date: Option<i64>,
    pub notes: Option<String>,
}

/// PUT /api/ivm/orders/{id} (partial; the order type cannot change)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvmOrderUpdate {
    pub vendor_id: Option<i64>,
    pub destination: Option<Destination>,
    pub items: Option<Vec<IvmOrderItem>>,
    pub status: Option<IvmOrderStatus>,
    pub expected_delivery_date: Option<i64>,
    pub notes: Option<String>,
}

/// GET /api/ivm/orders filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvmOrderQuery {
    pub order_type: Option<String>,
}
