//! Loyalty Engine
//!
//! The loyalty engine is the core of the loyalty points gateway. Users submit purchase order numbers, the engine
//! reconciles each order against an external accrual authority, and keeps a per-user balance of points that can be
//! partially withdrawn.
//!
//! The library is divided into three main sections:
//! 1. The backend contracts ([`mod@traits`]). Storage and the accrual authority are only ever accessed through these
//!    traits. [`SqliteDatabase`] implements the storage traits.
//! 2. The engine public API ([`mod@lpe_api`]): order registration and ownership, reconciliation, the ledger and user
//!    authentication.
//! 3. Shared data types ([`mod@db_types`]) and validation helpers ([`mod@helpers`]).
//!
//! The engine has no background tasks. Reconciliation runs inline whenever a balance or an order list is read.
pub mod db_types;
pub mod helpers;
pub mod lpe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use lpe_api::{
    accrual_reconciler::{AccrualReconciler, Reconciliation, ReconciliationError, DEFAULT_ACCRUAL_TIMEOUT},
    auth_api::AuthApi,
    ledger_api::LedgerApi,
    order_registry_api::{OrderRegistryApi, SubmitOrderResult},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AccrualAuthority,
    AccrualAuthorityError,
    AccrualReport,
    AuthApiError,
    LedgerError,
    LedgerManagement,
    LoyaltyDatabase,
    OrderManagement,
    OrderRegistryError,
    UserManagement,
};
