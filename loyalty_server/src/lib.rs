//! # Loyalty points gateway server
//!
//! This crate hosts the HTTP surface of the loyalty points gateway. It is a thin layer over [`loyalty_engine`]:
//! it authenticates users, turns requests into engine calls and maps engine results onto status codes.
//!
//! ## Configuration
//! The server is configured via command-line flags and environment variables. See [config](config/index.html) for
//! more information.
//!
//! ## Routes
//! * `POST /api/user/register`, `POST /api/user/login`: create an account or log in. Both set a session cookie.
//! * `POST /api/user/orders`: submit an order number (plain text body).
//! * `GET /api/user/orders`: list your orders, reconciled against the accrual authority.
//! * `GET /api/user/balance`: current and withdrawn points.
//! * `POST /api/user/balance/withdraw`: spend points against an order number.
//! * `GET /api/user/withdrawals`: withdrawal history.
//! * `/health` and `/ping`: liveness and database checks.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod session_reaper;
pub mod sessions;
