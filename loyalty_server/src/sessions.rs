//! Login sessions.
//!
//! A successful register or login call creates a session and hands its token to the client. Every other `/api/user`
//! route resolves the token back to a [`UserId`] through a [`SessionStore`].
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::*;
use loyalty_engine::db_types::UserId;
use parking_lot::RwLock;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

const TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub trait SessionStore: Send + Sync {
    /// Creates a new session for `user_id` and returns its token.
    fn create(&self, user_id: UserId, ttl: Duration) -> String;
    /// Looks up a live session. Expired sessions are never returned.
    fn get(&self, token: &str) -> Option<Session>;
    fn evict(&self, token: &str) -> bool;
    /// Removes every expired session and returns how many were dropped.
    fn evict_expired(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

fn new_token() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(TOKEN_LENGTH).map(char::from).collect()
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user_id: UserId, ttl: Duration) -> String {
        let token = new_token();
        let session = Session { user_id, expires_at: Utc::now() + ttl };
        self.sessions.write().insert(token.clone(), session);
        trace!("💻️ New session for {user_id}");
        token
    }

    fn get(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().get(token).cloned()?;
        if session.is_expired(Utc::now()) {
            trace!("💻️ Session for {} has expired", session.user_id);
            None
        } else {
            Some(session)
        }
    }

    fn evict(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }
}
