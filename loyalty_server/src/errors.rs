use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use loyalty_engine::{
    helpers::OrderNumberError,
    traits::LoyaltyDatabaseError,
    AuthApiError,
    LedgerError,
    OrderRegistryError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication required. {0}")]
    Unauthorized(String),
    #[error("Invalid login or password")]
    InvalidCredentials,
    #[error("Login '{0}' is already taken")]
    LoginTaken(String),
    #[error("{0}")]
    InvalidOrderNumber(String),
    #[error("This order number has already been submitted by another user")]
    OrderOwnedByOtherUser,
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("{0}")]
    DuplicateWithdrawal(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::LoginTaken(_) => StatusCode::CONFLICT,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderOwnedByOtherUser => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            Self::DuplicateWithdrawal(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderNumberError> for ServerError {
    fn from(e: OrderNumberError) -> Self {
        match e {
            OrderNumberError::InvalidFormat(_) => Self::InvalidRequestBody(e.to_string()),
            OrderNumberError::ChecksumFailed(_) => Self::InvalidOrderNumber(e.to_string()),
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::LoginTaken(login) => Self::LoginTaken(login),
            AuthApiError::InvalidCredentials => Self::InvalidCredentials,
            AuthApiError::HashingError(e) => Self::BackendError(e),
        }
    }
}

impl From<OrderRegistryError> for ServerError {
    fn from(e: OrderRegistryError) -> Self {
        match e {
            OrderRegistryError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            OrderRegistryError::InvalidOrderNumber(e) => e.into(),
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            // Withdrawals report format and checksum failures alike as 422
            LedgerError::InvalidOrderNumber(e) => Self::InvalidOrderNumber(e.to_string()),
            LedgerError::InvalidAmount(_) => Self::InvalidRequestBody(e.to_string()),
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds(e.to_string()),
            LedgerError::DuplicateWithdrawal(_) => Self::DuplicateWithdrawal(e.to_string()),
        }
    }
}

impl From<LoyaltyDatabaseError> for ServerError {
    fn from(e: LoyaltyDatabaseError) -> Self {
        Self::BackendError(e.to_string())
    }
}
