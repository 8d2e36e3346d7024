//! `SqliteDatabase` is a concrete implementation of a loyalty engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the storage traits defined in the [`traits`]
//! module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{new_pool, orders, users, withdrawals};
use crate::{
    db_types::{Balance, NewOrder, NewUser, NewWithdrawal, Order, OrderNumber, OrderUpdate, User, UserId, Withdrawal},
    traits::{
        AppendWithdrawalResult,
        AuthApiError,
        InsertOrderResult,
        InsertUserResult,
        LedgerError,
        LedgerManagement,
        LoyaltyDatabase,
        LoyaltyDatabaseError,
        OrderManagement,
        OrderRegistryError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LoyaltyDatabase for SqliteDatabase {
    async fn ping(&self) -> Result<(), LoyaltyDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn).await?;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderRegistryError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(number, &mut conn).await
    }

    async fn insert_order_if_absent(&self, order: NewOrder) -> Result<InsertOrderResult, OrderRegistryError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::insert_if_absent(order, &mut conn).await?;
        if let InsertOrderResult::Inserted(order) = &result {
            debug!("🗃️ Order {} has been saved in the DB with id {}", order.number, order.id);
        }
        Ok(result)
    }

    async fn apply_order_updates(&self, updates: &[OrderUpdate]) -> Result<usize, OrderRegistryError> {
        let mut tx = self.pool.begin().await?;
        let mut applied = 0;
        for update in updates {
            let OrderUpdate { number, status, accrual } = update;
            if orders::update_status(number, *status, *accrual, &mut tx).await? {
                trace!("🗃️ Order {number} is now {status} (accrual {accrual})");
                applied += 1;
            } else {
                trace!("🗃️ Order {number} was not moved to {status}. It is missing or already past that state");
            }
        }
        tx.commit().await?;
        debug!("🗃️ {applied} of {} order update(s) committed", updates.len());
        Ok(applied)
    }

    async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<Order>, OrderRegistryError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user, &mut conn).await
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn append_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<AppendWithdrawalResult, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        withdrawals::append(withdrawal, &mut conn).await
    }

    async fn fetch_withdrawals_for_user(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        withdrawals::fetch_for_user(user, &mut conn).await
    }

    async fn fetch_balance(&self, user: UserId) -> Result<Balance, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        withdrawals::balance(user, &mut conn).await
    }
}

impl UserManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<InsertUserResult, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = users::insert_user(user, &mut conn).await?;
        if let InsertUserResult::Inserted(user) = &result {
            debug!("🗃️ User '{}' created with id {}", user.login, user.id);
        }
        Ok(result)
    }

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_login(login, &mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), LoyaltyDatabaseError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LoyaltyDatabaseError::MigrationError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
