//! Orders, their lines and lifecycle statuses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::count_from_any;
use crate::{GuestId, Item, ItemId, OrderId, Price, StoreId};

/// Order lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Confirmed,
    Processing,
    Handover,
    PickedUp,
    Delivered,
    Canceled,
    RefundRequested,
    Refunded,
    RefundRequestCanceled,
    Failed,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the order is still moving (shown under "running orders").
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(
            self,
            Self::Pending
                | Self::Accepted
                | Self::Confirmed
                | Self::Processing
                | Self::Handover
                | Self::PickedUp
        )
    }

    /// Whether the customer may still cancel the order.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted | Self::Confirmed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Handover => "handover",
            Self::PickedUp => "picked_up",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
            Self::RefundRequested => "refund_requested",
            Self::Refunded => "refunded",
            Self::RefundRequestCanceled => "refund_request_canceled",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    DigitalPayment,
    Wallet,
    OfflinePayment,
    #[serde(other)]
    Other,
}

/// An order summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_amount: Price,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub details_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: OrderId,
    #[serde(default)]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub item_details: Option<Item>,
}

/// Page envelope of order list endpoints: `{total_size, limit, offset, orders}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default, deserialize_with = "count_from_any")]
    pub total_size: u32,
    #[serde(default, deserialize_with = "count_from_any")]
    pub limit: u32,
    #[serde(default, deserialize_with = "count_from_any")]
    pub offset: u32,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Body of the place-order call. The cart itself is read server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub order_amount: Price,
    pub payment_method: PaymentMethod,
    /// `"delivery"` or `"take_away"`.
    pub order_type: String,
    pub store_id: StoreId,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    pub contact_person_name: String,
    pub contact_person_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_tips: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        let status: OrderStatus = serde_json::from_str("\"picked_up\"").unwrap();
        assert_eq!(status, OrderStatus::PickedUp);
        assert_eq!(status.to_string(), "picked_up");
        let status: OrderStatus = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }

    #[test]
    fn test_running_and_cancellable() {
        assert!(OrderStatus::Processing.is_running());
        assert!(!OrderStatus::Delivered.is_running());
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(!OrderStatus::Handover.is_cancellable());
    }

    #[test]
    fn test_order_page() {
        let page: OrderPage = serde_json::from_str(
            r#"{"total_size": 1, "limit": "10", "offset": "1", "orders": [
                {"id": 100001, "order_amount": 250, "order_status": "delivered",
                 "payment_method": "cash_on_delivery", "created_at": "2024-05-01T10:00:00.000000Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.orders[0].order_status, OrderStatus::Delivered);
        assert_eq!(page.orders[0].order_amount, Price::from_units(250));
        assert!(page.orders[0].created_at.is_some());
    }
}
