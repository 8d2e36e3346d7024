use lpg_common::Points;
use thiserror::Error;

use crate::{
    db_types::{Balance, NewWithdrawal, OrderNumber, UserId, Withdrawal},
    helpers::OrderNumberError,
    traits::{AppendWithdrawalResult, OrderManagement},
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Withdrawal amount must be positive. Got {0}")]
    InvalidAmount(Points),
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { requested: Points, available: Points },
    #[error("A withdrawal has already been made against order {0}")]
    DuplicateWithdrawal(OrderNumber),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// The `LedgerManagement` trait defines how withdrawals are recorded and balances derived.
///
/// Balances are never stored. They are always the sum of accruals on `PROCESSED` orders less the sum of withdrawals.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement: OrderManagement {
    /// Records a withdrawal if the user's balance covers it.
    ///
    /// The balance check and the insert must be a single atomic step, so that concurrent withdrawals can never jointly
    /// overdraw an account.
    async fn append_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<AppendWithdrawalResult, LedgerError>;

    /// All withdrawals made by `user`, newest first.
    async fn fetch_withdrawals_for_user(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerError>;

    async fn fetch_balance(&self, user: UserId) -> Result<Balance, LedgerError>;
}
