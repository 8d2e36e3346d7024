use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccrualApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The accrual authority is rate limiting requests. Retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },
    #[error("The request to the accrual authority timed out")]
    Timeout,
}
