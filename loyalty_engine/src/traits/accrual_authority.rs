use std::time::Duration;

use thiserror::Error;

use crate::{db_types::OrderNumber, traits::AccrualReport};

#[derive(Debug, Clone, Error)]
pub enum AccrualAuthorityError {
    #[error("The accrual authority could not be reached: {0}")]
    Unreachable(String),
    #[error("The accrual authority did not answer in time")]
    Timeout,
    #[error("The accrual authority is rate limiting requests{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },
    #[error("The accrual authority sent a malformed response: {0}")]
    MalformedResponse(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after.map(|d| format!(". Retry after {}s", d.as_secs())).unwrap_or_default()
}

/// The external service that decides whether, and how much, an order earns.
#[allow(async_fn_in_trait)]
pub trait AccrualAuthority {
    /// Queries the authority for the order's accrual state.
    ///
    /// `Ok(None)` means the authority does not know about the order yet. This is a normal answer, not a failure.
    async fn fetch_accrual(&self, number: &OrderNumber) -> Result<Option<AccrualReport>, AccrualAuthorityError>;
}
