use thiserror::Error;

use crate::traits::{LedgerManagement, OrderManagement, UserManagement};

#[derive(Debug, Clone, Error)]
pub enum LoyaltyDatabaseError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Migration failed: {0}")]
    MigrationError(String),
}

impl From<sqlx::Error> for LoyaltyDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        LoyaltyDatabaseError::DatabaseError(e.to_string())
    }
}

/// The highest level of behaviour for storage backends supporting the loyalty engine.
#[allow(async_fn_in_trait)]
pub trait LoyaltyDatabase: Clone + OrderManagement + LedgerManagement + UserManagement {
    /// Checks that the database is reachable and answering queries.
    async fn ping(&self) -> Result<(), LoyaltyDatabaseError>;
}
