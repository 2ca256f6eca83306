//! Server-side sessions keyed by an opaque bearer token.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::crypto::CryptoUtils;
use crate::models::UserInfo;
use crate::quiz::Quiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Diagnosis,
    Training,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserInfo,
    pub mode: Option<Mode>,
    pub quiz: Quiz,
    last_seen: Instant,
}

impl Session {
    /// Switch mode. Any quiz in progress is dropped.
    pub fn set_mode(&mut self, mode: Option<Mode>) {
        self.mode = mode;
        self.quiz.reset();
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a session for a freshly logged-in user and return its token.
    pub fn create(&self, user: UserInfo) -> String {
        let token = CryptoUtils::generate_session_token();
        let session = Session {
            user,
            mode: None,
            quiz: Quiz::default(),
            last_seen: Instant::now(),
        };
        self.lock().insert(token.clone(), session);
        token
    }

    /// Run `f` on a live session and refresh its idle timer. Returns `None`
    /// for unknown or expired tokens; an expired session is removed.
    pub fn with_session<T>(&self, token: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.lock();
        let now = Instant::now();

        let session = sessions.get_mut(token)?;
        if now.duration_since(session.last_seen) >= self.ttl {
            sessions.remove(token);
            tracing::debug!("Session expired");
            return None;
        }
        session.last_seen = now;
        Some(f(session))
    }

    pub fn destroy(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    /// Drop every session idle for at least the TTL. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, s| s.last_seen.elapsed() < ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
