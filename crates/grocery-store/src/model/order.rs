//! Orders produced by checkout and advanced by the order desk.

use crate::model::{CartLine, Location};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Order identifier, `ORD` followed by nine base-36 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an order is in its lifecycle.
///
/// The forward path is `Pending → Confirmed → Preparing → OutForDelivery → Delivered`.
/// `Cancelled` is terminal and reachable from any status except `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    fn stage(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::OutForDelivery => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Transitions only move forward; nothing leaves a terminal status.
    pub fn can_become(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => true,
            _ => next.stage() > self.stage(),
        }
    }

    /// Human label, e.g. "out for delivery".
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out for delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The delivery person assigned to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Courier {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub image: String,
    pub location: Location,
    pub rating: f32,
    pub total_deliveries: u32,
}

/// What checkout hands to the order desk: the cart lines and their subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "items")]
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(rename = "deliveryPerson")]
    pub courier: Courier,
    pub estimated_delivery_time: String,
    pub customer_location: Location,
    pub shop_location: Location,
    pub created_at: DateTime<Utc>,
}
