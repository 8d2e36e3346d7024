use chrono::{DateTime, SecondsFormat, Utc};
use loyalty_engine::db_types::{Order, OrderStatusType, Withdrawal};
use lpg_common::{Points, Secret};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatusType,
    /// Only reported for processed orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
    pub uploaded_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let accrual = (order.status == OrderStatusType::Processed).then_some(order.accrual);
        Self {
            number: order.number.as_str().to_string(),
            status: order.status,
            accrual,
            uploaded_at: rfc3339(&order.registered_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: Points,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WithdrawalResponse {
    pub order: String,
    pub sum: Points,
    pub processed_at: String,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(w: Withdrawal) -> Self {
        Self { order: w.order_number.as_str().to_string(), sum: w.sum, processed_at: rfc3339(&w.processed_at) }
    }
}

fn rfc3339(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, false)
}
