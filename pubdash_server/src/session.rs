use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::http::{header::COOKIE, HeaderMap};
use hashbrown::HashMap;
use rand::Rng;
use tracing::debug;

use crate::gate::SessionState;

pub const SESSION_COOKIE: &str = "pubdash_session";
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
pub const MAX_SESSIONS: usize = 10_000;

struct Entry {
    state: SessionState,
    seen: Instant,
}

//entries idle past the ttl are dropped, past the capacity the least recently seen goes
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_TTL, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn new_token() -> String {
        let bytes: [u8; 16] = rand::thread_rng().gen();
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn get(&self, token: &str) -> SessionState {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .filter(|e| e.seen.elapsed() < self.ttl)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    pub fn insert(&self, token: &str, state: SessionState) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, e| e.seen.elapsed() < self.ttl);
        if !sessions.contains_key(token) && sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, e)| e.seen)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                sessions.remove(&k);
            }
        }
        if sessions.len() < before {
            debug!("evicted {} sessions", before - sessions.len());
        }
        sessions.insert(
            token.to_string(),
            Entry {
                state,
                seen: Instant::now(),
            },
        );
    }

    pub fn remove(&self, token: &str) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == SESSION_COOKIE && is_token(v))
        .map(|(_, v)| v.to_string())
}

pub fn set_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn expire_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn is_token(v: &str) -> bool {
    v.len() == 32 && v.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::AuthState;
    use axum::http::HeaderValue;

    #[test]
    fn tokens_are_hex() {
        let t = SessionStore::new_token();
        assert!(is_token(&t));
        assert_ne!(t, SessionStore::new_token());
    }

    #[test]
    fn reads_cookie_header() {
        let token = SessionStore::new_token();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, token)).unwrap(),
        );
        assert_eq!(token_from_headers(&headers), Some(token));

        let mut forged = HeaderMap::new();
        forged.insert(COOKIE, HeaderValue::from_static("pubdash_session=../../etc"));
        assert_eq!(token_from_headers(&forged), None);
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    fn authorized() -> SessionState {
        SessionState {
            auth: AuthState::Authorized,
            ..Default::default()
        }
    }

    #[test]
    fn sessions_are_separate() {
        let store = SessionStore::new();
        store.insert("a", authorized());
        assert_eq!(store.get("a").auth, AuthState::Authorized);
        assert_eq!(store.get("b").auth, AuthState::NotAttempted);
        assert_eq!(store.len(), 1);
        store.remove("a");
        assert!(store.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = SessionStore::with_limits(SESSION_TTL, 2);
        store.insert("a", authorized());
        std::thread::sleep(Duration::from_millis(2));
        store.insert("b", SessionState::default());
        std::thread::sleep(Duration::from_millis(2));
        store.insert("c", SessionState::default());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").auth, AuthState::NotAttempted);
        store.insert("c", authorized());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("c").auth, AuthState::Authorized);
    }

    #[test]
    fn idle_sessions_expire() {
        let store = SessionStore::with_limits(Duration::ZERO, 10);
        store.insert("a", authorized());
        assert_eq!(store.get("a").auth, AuthState::NotAttempted);
        store.insert("b", SessionState::default());
        assert_eq!(store.len(), 1);
    }
}
