use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lpg_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::{validate_order_number, OrderNumberError};

//--------------------------------------        UserId         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// A purchase order number that has passed format and Luhn checksum validation.
///
/// The only way to build one from untrusted input is [`OrderNumber::parse`] (or `FromStr`), so every `OrderNumber`
/// the engine sees is known to be valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize)]
#[sqlx(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn parse(raw: &str) -> Result<Self, OrderNumberError> {
        validate_order_number(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for OrderNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been registered with us, but the accrual authority has not started on it yet.
    New,
    /// The accrual authority is calculating the reward for the order.
    Processing,
    /// The accrual authority has rejected the order. No points will be awarded. Terminal.
    Invalid,
    /// The reward has been calculated and is available in the `accrual` field. Terminal.
    Processed,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    /// The statuses an order may hold immediately before moving to `self`.
    ///
    /// | From \ To   | New | Processing | Invalid | Processed |
    /// |-------------|-----|------------|---------|-----------|
    /// | New         | -   | ✔          | ✔       | ✔         |
    /// | Processing  | ✘   | -          | ✔       | ✔         |
    /// | Invalid     | ✘   | ✘          | -       | ✘         |
    /// | Processed   | ✘   | ✘          | ✘       | -         |
    pub fn predecessors(&self) -> &'static [OrderStatusType] {
        use OrderStatusType::*;
        match self {
            New => &[],
            Processing => &[New],
            Invalid | Processed => &[New, Processing],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        next.predecessors().contains(self)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatusType,
    /// Points awarded for this order. Always zero unless `status` is `Processed`.
    pub accrual: Points,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Applies a reconciliation result to this in-memory copy. Backwards or terminal transitions are ignored.
    pub fn apply(&mut self, update: &OrderUpdate) -> bool {
        if self.number != update.number || !self.status.can_transition_to(update.status) {
            return false;
        }
        self.status = update.status;
        self.accrual = update.accrual;
        true
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub user_id: UserId,
    pub registered_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(number: OrderNumber, user_id: UserId) -> Self {
        Self { number, user_id, registered_at: Utc::now() }
    }
}

//--------------------------------------      OrderUpdate      ---------------------------------------------------------
/// A status (and accrual) change for a single order, as staged by the accrual reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub number: OrderNumber,
    pub status: OrderStatusType,
    pub accrual: Points,
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Withdrawal {
    pub id: i64,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

impl NewWithdrawal {
    pub fn new(order_number: OrderNumber, user_id: UserId, sum: Points) -> Self {
        Self { order_number, user_id, sum, processed_at: Utc::now() }
    }
}

//--------------------------------------        Balance        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Points available for withdrawal.
    pub current: Points,
    /// Total points withdrawn over the lifetime of the account.
    pub withdrawn: Points,
}

impl Balance {
    pub fn new(accrued: Points, withdrawn: Points) -> Self {
        Self { current: accrued - withdrawn, withdrawn }
    }
}

//--------------------------------------         User          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub salt: String,
}
