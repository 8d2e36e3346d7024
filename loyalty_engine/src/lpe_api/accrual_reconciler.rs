//! Reconciliation of order state against the accrual authority.
//!
//! A reconciliation pass takes a user's orders, queries the authority for every order that is still `NEW` or
//! `PROCESSING`, and stages an update for each forward status change. Passes are all-or-nothing: if any single query
//! fails, the whole pass fails and nothing is staged. The queries of one pass run concurrently, each bounded by a
//! timeout.
use std::{fmt::Debug, time::Duration};

use futures_util::future::try_join_all;
use log::*;
use thiserror::Error;
use tokio::time::timeout;

use crate::{
    db_types::{Order, OrderNumber, OrderUpdate, UserId},
    traits::{AccrualAuthority, AccrualAuthorityError, OrderManagement, OrderRegistryError},
};

pub const DEFAULT_ACCRUAL_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Accrual query for order {number} failed. {source}")]
    AuthorityFailure { number: OrderNumber, source: AccrualAuthorityError },
    #[error("Accrual query for order {0} timed out")]
    Timeout(OrderNumber),
    #[error("Asked the accrual authority about order {asked}, but it answered for '{answered}'")]
    MismatchedReport { asked: OrderNumber, answered: String },
}

/// The result of a successful reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// The orders that were passed in, in their original order, with `updates` applied in memory.
    pub orders: Vec<Order>,
    /// The changes that still need to be persisted.
    pub updates: Vec<OrderUpdate>,
}

impl Reconciliation {
    pub fn is_unchanged(&self) -> bool {
        self.updates.is_empty()
    }
}

#[derive(Clone)]
pub struct AccrualReconciler<A> {
    authority: A,
    timeout: Duration,
}

impl<A> Debug for AccrualReconciler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccrualReconciler (timeout: {:?})", self.timeout)
    }
}

impl<A> AccrualReconciler<A> {
    pub fn new(authority: A) -> Self {
        Self { authority, timeout: DEFAULT_ACCRUAL_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<A> AccrualReconciler<A>
where A: AccrualAuthority
{
    /// Runs a single reconciliation pass over `orders`. Terminal orders never cause a network call.
    ///
    /// Nothing is persisted here. Callers apply `Reconciliation::updates` to storage themselves, which keeps a
    /// cancelled pass (the future was dropped) from leaving partial changes behind.
    pub async fn reconcile(&self, orders: Vec<Order>) -> Result<Reconciliation, ReconciliationError> {
        let pending = orders.iter().filter(|o| !o.status.is_terminal()).count();
        if pending == 0 {
            trace!("🔄️ No pending orders. Nothing to reconcile");
            return Ok(Reconciliation { orders, updates: vec![] });
        }
        trace!("🔄️ Querying the accrual authority for {pending} pending orders");
        let queries = orders.iter().filter(|o| !o.status.is_terminal()).map(|o| self.query(o));
        let updates = try_join_all(queries).await?.into_iter().flatten().collect::<Vec<OrderUpdate>>();
        let mut orders = orders;
        for update in &updates {
            if let Some(order) = orders.iter_mut().find(|o| o.number == update.number) {
                order.apply(update);
            }
        }
        debug!("🔄️ Reconciliation pass complete. {} order(s) changed", updates.len());
        Ok(Reconciliation { orders, updates })
    }

    async fn query(&self, order: &Order) -> Result<Option<OrderUpdate>, ReconciliationError> {
        let number = &order.number;
        let report = timeout(self.timeout, self.authority.fetch_accrual(number))
            .await
            .map_err(|_| ReconciliationError::Timeout(number.clone()))?
            .map_err(|source| ReconciliationError::AuthorityFailure { number: number.clone(), source })?;
        let Some(report) = report else {
            trace!("🔄️ Order {number} is not known to the accrual authority yet");
            return Ok(None);
        };
        if report.order != number.as_str() {
            return Err(ReconciliationError::MismatchedReport { asked: number.clone(), answered: report.order });
        }
        let Some(status) = report.local_status() else {
            debug!("🔄️ Unrecognised accrual status '{}' for order {number}. Leaving it as {}", report.status, order.status);
            return Ok(None);
        };
        if !order.status.can_transition_to(status) {
            return Ok(None);
        }
        let accrual = report.local_accrual();
        trace!("🔄️ Order {number} moves from {} to {status} with accrual {accrual}", order.status);
        Ok(Some(OrderUpdate { number: number.clone(), status, accrual }))
    }

    /// Fetches the user's orders, reconciles them and persists the result.
    ///
    /// If the pass fails, the failure is logged and the stored orders are returned as they are. If a concurrent pass
    /// won the race for any of the updates, the orders are re-read so that the caller never sees a stale status.
    pub async fn refresh_orders<B: OrderManagement>(
        &self,
        db: &B,
        user: UserId,
    ) -> Result<Vec<Order>, OrderRegistryError> {
        let stored = db.fetch_orders_for_user(user).await?;
        let reconciliation = match self.reconcile(stored.clone()).await {
            Ok(r) => r,
            Err(e) => {
                warn!("🔄️ Could not reconcile orders for {user}. Serving the last known state. {e}");
                return Ok(stored);
            },
        };
        if reconciliation.is_unchanged() {
            return Ok(reconciliation.orders);
        }
        let applied = apply_updates(db, &reconciliation.updates).await?;
        if applied == reconciliation.updates.len() {
            Ok(reconciliation.orders)
        } else {
            debug!(
                "🔄️ {} of {} updates for {user} were superseded. Re-reading orders",
                reconciliation.updates.len() - applied,
                reconciliation.updates.len()
            );
            db.fetch_orders_for_user(user).await
        }
    }
}

/// Persists staged updates in one batch. Each update only takes effect if it is still a forward transition for the
/// stored order, and a storage failure part way through leaves every order as it was.
///
/// Returns the number of orders that changed.
pub async fn apply_updates<B: OrderManagement>(db: &B, updates: &[OrderUpdate]) -> Result<usize, OrderRegistryError> {
    if updates.is_empty() {
        return Ok(0);
    }
    let applied = db.apply_order_updates(updates).await?;
    if applied < updates.len() {
        debug!("🔄️ {} of {} staged update(s) were not applied", updates.len() - applied, updates.len());
    }
    Ok(applied)
}
