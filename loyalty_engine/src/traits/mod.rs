//! # Backend contracts
//!
//! This module defines the interfaces the loyalty engine needs from the outside world. The engine only ever talks to
//! storage and to the accrual authority through these traits, so any backend that implements them can drive it.
//!
//! * [`OrderManagement`] stores purchase orders and arbitrates their ownership.
//! * [`LedgerManagement`] stores withdrawals and computes balances. Appending a withdrawal must be atomic with respect
//!   to the balance check.
//! * [`UserManagement`] stores login credentials for the serving layer.
//! * [`LoyaltyDatabase`] bundles the three storage traits and adds a couple of housekeeping methods.
//! * [`AccrualAuthority`] is the external service that decides how many points an order earns.
mod accrual_authority;
mod ledger_management;
mod loyalty_database;
mod order_management;
mod user_management;

mod data_objects;

pub use accrual_authority::{AccrualAuthority, AccrualAuthorityError};
pub use data_objects::{AccrualReport, AppendWithdrawalResult, InsertOrderResult, InsertUserResult};
pub use ledger_management::{LedgerError, LedgerManagement};
pub use loyalty_database::{LoyaltyDatabase, LoyaltyDatabaseError};
pub use order_management::{OrderManagement, OrderRegistryError};
pub use user_management::{AuthApiError, UserManagement};
