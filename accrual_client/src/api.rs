use std::sync::Arc;

use log::*;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};

use crate::{config::AccrualConfig, helpers::parse_retry_after, AccrualApiError, AccrualOrder};

#[derive(Clone)]
pub struct AccrualApi {
    config: AccrualConfig,
    client: Arc<Client>,
}

impl AccrualApi {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    pub fn url(&self, number: &str) -> String {
        format!("{}/api/orders/{number}", self.config.base_url)
    }

    /// Fetches the accrual state for the order `number`.
    ///
    /// Returns `Ok(None)` if the authority does not know about the order (HTTP 204). Rate limiting (HTTP 429) and any
    /// other non-success status are errors.
    pub async fn fetch_order(&self, number: &str) -> Result<Option<AccrualOrder>, AccrualApiError> {
        let url = self.url(number);
        trace!("Sending accrual query: {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AccrualApiError::Timeout
            } else {
                AccrualApiError::RestResponseError(e.to_string())
            }
        })?;
        match response.status() {
            StatusCode::OK => {
                let order = response.json::<AccrualOrder>().await.map_err(|e| AccrualApiError::JsonError(e.to_string()))?;
                trace!("Accrual query for #{number} successful. Status: {}", order.status);
                Ok(Some(order))
            },
            StatusCode::NO_CONTENT => {
                debug!("Order #{number} is not registered with the accrual authority");
                Ok(None)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after =
                    response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()).and_then(parse_retry_after);
                warn!("Accrual authority is rate limiting us. Retry after {retry_after:?}");
                Err(AccrualApiError::RateLimited { retry_after })
            },
            status => {
                let status = status.as_u16();
                let message = response.text().await.map_err(|e| AccrualApiError::RestResponseError(e.to_string()))?;
                Err(AccrualApiError::QueryError { status, message })
            },
        }
    }
}
