use accrual_client::{AccrualApi, AccrualApiError, AccrualConfig, AccrualOrder};
use log::*;
use loyalty_engine::{db_types::OrderNumber, AccrualAuthority, AccrualAuthorityError, AccrualReport};

/// The accrual authority, reached over HTTP.
#[derive(Clone)]
pub struct HttpAccrualAuthority {
    api: AccrualApi,
}

impl HttpAccrualAuthority {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let api = AccrualApi::new(config)?;
        Ok(Self { api })
    }

    pub fn base_url(&self) -> &str {
        &self.api.config().base_url
    }
}

impl AccrualAuthority for HttpAccrualAuthority {
    async fn fetch_accrual(&self, number: &OrderNumber) -> Result<Option<AccrualReport>, AccrualAuthorityError> {
        let order = self.api.fetch_order(number.as_str()).await.map_err(|e| {
            debug!("🔄️ Accrual query for {number} failed. {e}");
            authority_error(e)
        })?;
        Ok(order.map(accrual_report))
    }
}

fn accrual_report(order: AccrualOrder) -> AccrualReport {
    AccrualReport::new(order.order, order.status, order.accrual)
}

pub fn authority_error(e: AccrualApiError) -> AccrualAuthorityError {
    match e {
        AccrualApiError::Timeout => AccrualAuthorityError::Timeout,
        AccrualApiError::RateLimited { retry_after } => AccrualAuthorityError::RateLimited { retry_after },
        AccrualApiError::JsonError(s) => AccrualAuthorityError::MalformedResponse(s),
        AccrualApiError::Initialization(s) | AccrualApiError::RestResponseError(s) => {
            AccrualAuthorityError::Unreachable(s)
        },
        AccrualApiError::QueryError { status, message } => {
            AccrualAuthorityError::Unreachable(format!("HTTP {status}. {message}"))
        },
    }
}
