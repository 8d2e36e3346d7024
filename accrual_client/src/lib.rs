//! Client for the external accrual authority.
//!
//! The accrual authority decides whether a purchase order earns loyalty points and how many. It exposes a single
//! endpoint, `GET {base_url}/api/orders/{number}`, which this crate wraps in [`AccrualApi`].
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::AccrualApi;
pub use config::AccrualConfig;
pub use data_objects::AccrualOrder;
pub use error::AccrualApiError;
