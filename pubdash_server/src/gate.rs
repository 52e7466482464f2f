use std::{fmt::Debug, fs::File, io::BufReader, path::Path};

use hashbrown::HashMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ConfigError;

pub const LOGIN_ERROR: &str = "User not known or password incorrect";

#[derive(Deserialize, Default)]
pub struct Credentials {
    passwords: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    NotAttempted,
    Rejected,
    Authorized,
}

//username / password only live here between the form post and the check
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub auth: AuthState,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub struct AccessGate {
    credentials: Credentials,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("users", &self.passwords.len())
            .finish()
    }
}

impl Credentials {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            passwords: pairs
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let de = &mut serde_json::Deserializer::from_reader(reader);
        let out: Self = serde_path_to_error::deserialize(de)?;
        info!("read {} credentials from {}", out.passwords.len(), path.display());
        Ok(out)
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.passwords.get(username) {
            Some(stored) => constant_time_eq(password.as_bytes(), stored.as_bytes()),
            None => false,
        }
    }
}

impl SessionState {
    pub fn submit(&mut self, username: String, password: String) {
        self.username = Some(username);
        self.password = Some(password);
    }

    pub fn show_error(&self) -> bool {
        self.auth == AuthState::Rejected
    }
}

impl AccessGate {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn is_authorized(&self, session: &SessionState) -> bool {
        session.auth == AuthState::Authorized
    }

    //password is always dropped, username survives a rejection to refill the form
    pub fn password_entered(&self, session: &mut SessionState) -> bool {
        let password = session.password.take().unwrap_or_default();
        let username = session.username.as_deref().unwrap_or_default();
        if self.credentials.verify(username, &password) {
            info!("user {} logged in", username);
            session.auth = AuthState::Authorized;
            session.username = None;
            true
        } else {
            warn!("rejected login for user {:?}", username);
            session.auth = AuthState::Rejected;
            false
        }
    }
}

//length is not hidden, contents are
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
