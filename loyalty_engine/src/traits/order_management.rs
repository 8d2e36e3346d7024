use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderUpdate, UserId},
    helpers::OrderNumberError,
    traits::InsertOrderResult,
};

#[derive(Debug, Clone, Error)]
pub enum OrderRegistryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
}

impl From<sqlx::Error> for OrderRegistryError {
    fn from(e: sqlx::Error) -> Self {
        OrderRegistryError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines the behaviour for storing purchase orders and their reconciliation state.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given number, if it has ever been registered.
    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderRegistryError>;

    /// Registers a new order if, and only if, no order with the same number exists.
    ///
    /// This must be atomic with respect to the uniqueness check: of any number of concurrent calls for the same
    /// order number, exactly one receives `Inserted`. Every other caller receives the winner's record.
    async fn insert_order_if_absent(&self, order: NewOrder) -> Result<InsertOrderResult, OrderRegistryError>;

    /// Applies a batch of status changes as a single unit of work.
    ///
    /// Each update only takes effect if the stored status is a legal predecessor of the new status. Unknown order
    /// numbers, terminal orders and backwards transitions are skipped without error. If any statement fails, none of
    /// the updates are persisted.
    ///
    /// Returns the number of orders that changed.
    async fn apply_order_updates(&self, updates: &[OrderUpdate]) -> Result<usize, OrderRegistryError>;

    /// All orders owned by `user`, newest first.
    async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<Order>, OrderRegistryError>;
}
