//! Session authentication for the `/api/user` routes.
//!
//! Clients present their session token either as the `token` cookie set at login, or in an
//! `Authorization: Bearer <token>` header. Handlers that take an [`AuthenticatedUser`] argument are only reached
//! when the token resolves to a live session; everything else gets a 401.
use actix_web::{
    cookie::{Cookie, SameSite},
    dev::Payload,
    http::header::AUTHORIZATION,
    web,
    FromRequest,
    HttpRequest,
};
use futures::future::{ready, Ready};
use log::*;
use loyalty_engine::db_types::UserId;

use crate::{config::SessionConfig, errors::ServerError, sessions::SessionStore};

pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.0
    }
}

/// Pulls the session token out of the request. The cookie wins if both are present.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServerError> {
    let sessions = req.app_data::<web::Data<dyn SessionStore>>().ok_or_else(|| {
        error!("💻️ No session store has been registered with the server");
        ServerError::Unspecified("Session store is not configured".into())
    })?;
    let token = session_token(req).ok_or_else(|| ServerError::Unauthorized("No session token provided".into()))?;
    let session = sessions.get(&token).ok_or_else(|| {
        debug!("💻️ Request presented an unknown or expired session token");
        ServerError::Unauthorized("Session is invalid or has expired".into())
    })?;
    Ok(AuthenticatedUser(session.user_id))
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Builds the cookie that carries a freshly issued session token.
pub fn session_cookie(token: &str, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(actix_web::cookie::time::Duration::seconds(config.ttl.num_seconds()))
        .finish()
}
