pub mod config;
pub mod gate;
mod html;
pub mod pages;
pub mod session;

pub use config::{Args, ConfigError};
pub use gate::{AccessGate, AuthState, Credentials, SessionState};
pub use pages::{app, AppState};
