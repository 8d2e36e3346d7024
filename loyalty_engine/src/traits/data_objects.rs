use lpg_common::Points;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType, User, Withdrawal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    /// The order number was unseen, and is now owned by the submitting user.
    Inserted(Order),
    /// The order number was already registered. The stored record is returned unchanged.
    AlreadyExists(Order),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendWithdrawalResult {
    Appended(Withdrawal),
    /// The balance check failed. `available` is the balance at the time of the check.
    InsufficientFunds { available: Points },
    /// A withdrawal has already been filed against this order number.
    DuplicateOrderNumber,
}

#[derive(Debug, Clone)]
pub enum InsertUserResult {
    Inserted(User),
    LoginTaken,
}

/// The accrual authority's answer for a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualReport {
    pub order: String,
    /// The authority's own status vocabulary: `REGISTERED`, `PROCESSING`, `INVALID` or `PROCESSED`.
    pub status: String,
    #[serde(default)]
    pub accrual: Option<Points>,
}

impl AccrualReport {
    pub fn new<S: Into<String>>(order: S, status: S, accrual: Option<Points>) -> Self {
        Self { order: order.into(), status: status.into(), accrual }
    }

    /// Maps the authority's status onto ours. Unrecognised states map to `None`, meaning "leave the order alone".
    ///
    /// A `REGISTERED` order has been accepted by the authority for calculation, which is what `PROCESSING` means to us.
    pub fn local_status(&self) -> Option<OrderStatusType> {
        match self.status.as_str() {
            "REGISTERED" | "PROCESSING" => Some(OrderStatusType::Processing),
            "INVALID" => Some(OrderStatusType::Invalid),
            "PROCESSED" => Some(OrderStatusType::Processed),
            _ => None,
        }
    }

    /// The reported accrual, clamped to zero. Only `PROCESSED` orders carry points.
    pub fn local_accrual(&self) -> Points {
        match (self.local_status(), self.accrual) {
            (Some(OrderStatusType::Processed), Some(points)) if points.is_positive() => points,
            _ => Points::default(),
        }
    }
}
