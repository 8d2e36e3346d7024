//! Adapters between external services and the loyalty engine's backend traits.
pub mod accrual;
