use loyalty_engine::{
    db_types::{Balance, NewOrder, NewUser, NewWithdrawal, Order, OrderNumber, OrderUpdate, User, UserId, Withdrawal},
    traits::{AppendWithdrawalResult, InsertOrderResult, InsertUserResult},
    AccrualAuthority,
    AccrualAuthorityError,
    AccrualReport,
    AuthApiError,
    LedgerError,
    LedgerManagement,
    OrderManagement,
    OrderRegistryError,
    UserManagement,
};
use mockall::mock;

mock! {
    pub Database {}
    impl OrderManagement for Database {
        async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderRegistryError>;
        async fn insert_order_if_absent(&self, order: NewOrder) -> Result<InsertOrderResult, OrderRegistryError>;
        async fn apply_order_updates(&self, updates: &[OrderUpdate]) -> Result<usize, OrderRegistryError>;
        async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<Order>, OrderRegistryError>;
    }
    impl LedgerManagement for Database {
        async fn append_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<AppendWithdrawalResult, LedgerError>;
        async fn fetch_withdrawals_for_user(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerError>;
        async fn fetch_balance(&self, user: UserId) -> Result<Balance, LedgerError>;
    }
    impl UserManagement for Database {
        async fn insert_user(&self, user: NewUser) -> Result<InsertUserResult, AuthApiError>;
        async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError>;
    }
}

mock! {
    pub Authority {}
    impl AccrualAuthority for Authority {
        async fn fetch_accrual(&self, number: &OrderNumber) -> Result<Option<AccrualReport>, AccrualAuthorityError>;
    }
}

/// An authority that must never be asked anything.
pub fn idle_authority() -> MockAuthority {
    let mut authority = MockAuthority::new();
    authority.expect_fetch_accrual().never();
    authority
}
