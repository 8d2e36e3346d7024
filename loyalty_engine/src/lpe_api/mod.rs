//! # Loyalty engine public API
//!
//! The `lpe_api` module exposes the programmatic API of the loyalty engine. Like the backend traits, it is modular:
//!
//! * [`order_registry_api`] registers purchase orders and arbitrates their ownership.
//! * [`accrual_reconciler`] brings non-terminal orders up to date with the accrual authority.
//! * [`ledger_api`] computes balances and records withdrawals.
//! * [`auth_api`] registers and authenticates users.
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits the API needs. Anything that reads
//! balances or order lists also needs an [`AccrualReconciler`](accrual_reconciler::AccrualReconciler), since those
//! reads refresh pending orders first.
//!
//! ```rust,ignore
//! use loyalty_engine::{AccrualReconciler, LedgerApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let reconciler = AccrualReconciler::new(my_authority);
//! let api = LedgerApi::new(db, reconciler);
//! let balance = api.balance(user_id).await?;
//! ```

pub mod accrual_reconciler;
pub mod auth_api;
pub mod ledger_api;
pub mod order_registry_api;
