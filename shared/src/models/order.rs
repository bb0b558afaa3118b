//! Order Model
//!
//! Orders hold a snapshot of the user and product taken when the order is
//! placed; later edits to either never flow back into an order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::product::{PriceRange, ProductImage};

/// Order status
///
/// `pending`, `contacted` and `in-process` are live. `completed` and
/// `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Contacted,
    InProcess,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses that block a new order for the same (user, product) pair
    pub const LIVE: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Contacted,
        OrderStatus::InProcess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Contacted => "contacted",
            OrderStatus::InProcess => "in-process",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_live(&self) -> bool {
        Self::LIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }

    /// Whether `self -> next` is a permitted transition.
    ///
    /// `pending -> completed` is included so an admin can close an order
    /// without stepping through the intermediate states.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Contacted | InProcess | Completed | Cancelled)
                | (Contacted, InProcess | Completed | Cancelled)
                | (InProcess, Completed | Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "contacted" => Ok(OrderStatus::Contacted),
            "in-process" => Ok(OrderStatus::InProcess),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// Order entity (admin view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub user_name: String,
    pub user_phone: String,
    pub user_address: String,
    pub model_name: String,
    pub price_range: PriceRange,
    pub product_image: Option<ProductImage>,
    pub manufacturer_name: String,
    pub factory_name: String,
    pub manufacturer_phone: String,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order as shown in the owner's history (owner id stripped)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    pub user_name: String,
    pub user_phone: String,
    pub user_address: String,
    pub model_name: String,
    pub price_range: PriceRange,
    pub product_image: Option<ProductImage>,
    pub manufacturer_name: String,
    pub factory_name: String,
    pub manufacturer_phone: String,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Order> for OrderHistoryEntry {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            product_id: o.product_id,
            user_name: o.user_name,
            user_phone: o.user_phone,
            user_address: o.user_address,
            model_name: o.model_name,
            price_range: o.price_range,
            product_image: o.product_image,
            manufacturer_name: o.manufacturer_name,
            factory_name: o.factory_name,
            manufacturer_phone: o.manufacturer_phone,
            status: o.status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Admin status update payload
///
/// The status stays raw text so an unknown value can be reported with its
/// own error code.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

impl OrderStatusUpdate {
    pub fn status(&self) -> Result<OrderStatus, String> {
        self.status.trim().parse()
    }
}
