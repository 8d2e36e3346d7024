use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderUpdate, UserId},
    lpe_api::accrual_reconciler::{apply_updates, AccrualReconciler},
    traits::{AccrualAuthority, InsertOrderResult, OrderManagement, OrderRegistryError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOrderResult {
    /// The order number was new, and now belongs to the submitting user.
    Accepted(Order),
    /// The submitting user already owns this order. Nothing changed.
    AlreadyOwnedBySameUser(Order),
    /// Another user registered this order number first. Nothing changed.
    OwnedByOtherUser,
}

/// `OrderRegistryApi` owns the mapping from order number to owner and lifecycle status.
pub struct OrderRegistryApi<B, A> {
    db: B,
    reconciler: AccrualReconciler<A>,
}

impl<B: Debug, A> Debug for OrderRegistryApi<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderRegistryApi ({:?})", self.db)
    }
}

impl<B, A> OrderRegistryApi<B, A> {
    pub fn new(db: B, reconciler: AccrualReconciler<A>) -> Self {
        Self { db, reconciler }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn reconciler(&self) -> &AccrualReconciler<A> {
        &self.reconciler
    }
}

impl<B, A> OrderRegistryApi<B, A>
where
    B: OrderManagement,
    A: AccrualAuthority,
{
    /// Submits the order number `raw` on behalf of `user`.
    ///
    /// The first user to submit a number owns it forever. Resubmitting one of your own orders is harmless.
    pub async fn submit_order(&self, user: UserId, raw: &str) -> Result<SubmitOrderResult, OrderRegistryError> {
        let number = OrderNumber::parse(raw)?;
        let result = match self.db.insert_order_if_absent(NewOrder::new(number, user)).await? {
            InsertOrderResult::Inserted(order) => {
                info!("🔄️📦️ Order {} registered for {user}", order.number);
                SubmitOrderResult::Accepted(order)
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user => {
                debug!("🔄️📦️ Order {} was resubmitted by its owner", order.number);
                SubmitOrderResult::AlreadyOwnedBySameUser(order)
            },
            InsertOrderResult::AlreadyExists(order) => {
                info!("🔄️📦️ {user} tried to submit order {}, which belongs to {}", order.number, order.user_id);
                SubmitOrderResult::OwnedByOtherUser
            },
        };
        Ok(result)
    }

    pub async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderRegistryError> {
        self.db.fetch_order(number).await
    }

    /// All orders owned by `user`, newest first, brought up to date with the accrual authority.
    ///
    /// A failed reconciliation is not an error here. The stored state is returned instead.
    pub async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, OrderRegistryError> {
        self.reconciler.refresh_orders(&self.db, user).await
    }

    /// All orders owned by `user`, newest first, exactly as stored.
    pub async fn stored_orders_for_user(&self, user: UserId) -> Result<Vec<Order>, OrderRegistryError> {
        self.db.fetch_orders_for_user(user).await
    }

    /// Persists reconciliation results. Updates to unknown or terminal orders are skipped.
    ///
    /// Returns the number of orders that changed.
    pub async fn apply_reconciliation(&self, updates: &[OrderUpdate]) -> Result<usize, OrderRegistryError> {
        apply_updates(&self.db, updates).await
    }
}
