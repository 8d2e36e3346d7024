use std::fmt::Debug;

use log::*;
use lpg_common::Points;

use crate::{
    db_types::{Balance, NewWithdrawal, OrderNumber, UserId, Withdrawal},
    lpe_api::{accrual_reconciler::AccrualReconciler, order_registry_api::OrderRegistryApi},
    traits::{AccrualAuthority, AppendWithdrawalResult, LedgerError, LedgerManagement, OrderRegistryError},
};

impl From<OrderRegistryError> for LedgerError {
    fn from(e: OrderRegistryError) -> Self {
        match e {
            OrderRegistryError::DatabaseError(s) => LedgerError::DatabaseError(s),
            OrderRegistryError::InvalidOrderNumber(e) => LedgerError::InvalidOrderNumber(e),
        }
    }
}

/// `LedgerApi` derives balances and records withdrawals.
///
/// Every balance read refreshes the user's pending orders first, so that freshly processed accruals are available.
pub struct LedgerApi<B, A> {
    registry: OrderRegistryApi<B, A>,
}

impl<B: Debug, A> Debug for LedgerApi<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.registry.db())
    }
}

impl<B, A> LedgerApi<B, A> {
    pub fn new(db: B, reconciler: AccrualReconciler<A>) -> Self {
        Self { registry: OrderRegistryApi::new(db, reconciler) }
    }

    fn db(&self) -> &B {
        self.registry.db()
    }
}

impl<B, A> LedgerApi<B, A>
where
    B: LedgerManagement,
    A: AccrualAuthority,
{
    /// The user's current balance, after reconciling their pending orders.
    pub async fn balance(&self, user: UserId) -> Result<Balance, LedgerError> {
        self.registry.orders_for_user(user).await?;
        let balance = self.db().fetch_balance(user).await?;
        trace!("🔄️💰️ Balance for {user}: {} available, {} withdrawn", balance.current, balance.withdrawn);
        Ok(balance)
    }

    /// Withdraws `sum` points from the user's balance against the order number `raw`.
    ///
    /// The final balance check happens inside the backend, atomically with the insert. The check made here only lets
    /// the common case fail fast.
    pub async fn withdraw(&self, user: UserId, raw: &str, sum: Points) -> Result<Withdrawal, LedgerError> {
        let number = OrderNumber::parse(raw)?;
        if !sum.is_positive() {
            return Err(LedgerError::InvalidAmount(sum));
        }
        let balance = self.balance(user).await?;
        if sum > balance.current {
            info!("🔄️💰️ {user} tried to withdraw {sum}, but only has {}", balance.current);
            return Err(LedgerError::InsufficientFunds { requested: sum, available: balance.current });
        }
        let withdrawal = NewWithdrawal::new(number.clone(), user, sum);
        match self.db().append_withdrawal(withdrawal).await? {
            AppendWithdrawalResult::Appended(w) => {
                info!("🔄️💰️ {user} withdrew {sum} against order {number}");
                Ok(w)
            },
            AppendWithdrawalResult::InsufficientFunds { available } => {
                info!("🔄️💰️ Withdrawal of {sum} by {user} lost a race. Only {available} is available now");
                Err(LedgerError::InsufficientFunds { requested: sum, available })
            },
            AppendWithdrawalResult::DuplicateOrderNumber => {
                info!("🔄️💰️ {user} tried to withdraw against order {number} a second time");
                Err(LedgerError::DuplicateWithdrawal(number))
            },
        }
    }

    /// The user's withdrawals, newest first. Pending orders are reconciled first, as with every ledger read.
    pub async fn withdrawals_for_user(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerError> {
        self.registry.orders_for_user(user).await?;
        self.db().fetch_withdrawals_for_user(user).await
    }
}
