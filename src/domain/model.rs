use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// 订单状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Returned
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Returned => "Returned",
            OrderStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

// 公开追踪结果 (无需验证)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSummary {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpDispatch {
    pub message: String,
    #[serde(default)]
    pub masked_email: Option<String>,
    #[serde(default)]
    pub expires_in_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerification {
    pub access_token: String,
    #[serde(default)]
    pub expires_in_secs: Option<u64>,
}

// 验证后的订单详情
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub summary: TrackingSummary,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub timeline: Vec<TrackingEvent>,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_camel_case() {
        let json = r#"{
            "orderId": "PC-1001",
            "status": "SHIPPED",
            "updatedAt": "2026-10-01T08:30:00Z",
            "carrier": "DHL",
            "trackingNumber": "JD0001"
        }"#;
        let summary: TrackingSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.order_id, "PC-1001");
        assert_eq!(summary.status, OrderStatus::Shipped);
        assert_eq!(summary.carrier.as_deref(), Some("DHL"));
        assert!(summary.estimated_delivery.is_none());
    }

    #[test]
    fn test_unknown_status() {
        let summary: TrackingSummary =
            serde_json::from_str(r#"{"orderId": "PC-1", "status": "LOST_IN_SPACE"}"#).unwrap();
        assert_eq!(summary.status, OrderStatus::Unknown);
        assert!(!summary.status.is_final());
    }

    #[test]
    fn test_details_flatten_summary() {
        let json = r#"{
            "orderId": "PC-7",
            "status": "DELIVERED",
            "items": [{"name": "RTX 4070", "quantity": 2, "unitPrice": 599.5}],
            "timeline": [{"status": "SHIPPED", "at": "2026-09-30T10:00:00Z"}],
            "total": 1199.0
        }"#;
        let details: OrderDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.summary.order_id, "PC-7");
        assert!(details.summary.status.is_final());
        assert_eq!(details.items[0].line_total(), 1199.0);
        assert_eq!(details.timeline.len(), 1);
    }
}
