use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewUser, User},
    helpers::{hash_password, new_salt, verify_password},
    traits::{AuthApiError, InsertUserResult, UserManagement},
};

/// Registers and authenticates users. Session handling is left to the caller.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn register(&self, login: &str, password: &str) -> Result<User, AuthApiError> {
        if login.is_empty() || password.is_empty() {
            return Err(AuthApiError::InvalidCredentials);
        }
        let salt = new_salt();
        let password_hash = hash_password(&salt, password).map_err(|e| AuthApiError::HashingError(e.to_string()))?;
        let user = NewUser { login: login.to_string(), password_hash, salt };
        match self.db.insert_user(user).await? {
            InsertUserResult::Inserted(user) => {
                info!("🔄️🔑️ New user '{}' registered as {}", user.login, user.id);
                Ok(user)
            },
            InsertUserResult::LoginTaken => Err(AuthApiError::LoginTaken(login.to_string())),
        }
    }

    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, AuthApiError> {
        let user = self.db.fetch_user_by_login(login).await?.ok_or(AuthApiError::InvalidCredentials)?;
        if !verify_password(&user.salt, password, &user.password_hash) {
            debug!("🔄️🔑️ Wrong password supplied for '{login}'");
            return Err(AuthApiError::InvalidCredentials);
        }
        trace!("🔄️🔑️ '{login}' authenticated as {}", user.id);
        Ok(user)
    }
}
