use thiserror::Error;

use crate::{
    db_types::{NewUser, User},
    traits::InsertUserResult,
};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Login '{0}' is already taken")]
    LoginTaken(String),
    #[error("Invalid login or password")]
    InvalidCredentials,
    #[error("Could not hash password: {0}")]
    HashingError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Inserts the user unless the login is already in use. This is atomic with respect to the uniqueness check.
    async fn insert_user(&self, user: NewUser) -> Result<InsertUserResult, AuthApiError>;

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError>;
}
