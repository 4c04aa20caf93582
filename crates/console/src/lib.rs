//! Campus Console - login boundary.
//!
//! Wires the pure rules in `campus-console-core` to the outside world:
//! - `client` - posts credentials to the campus authentication endpoint
//! - `store` - durable and tab-scoped session persistence
//! - `login` - the login page state machine
//! - `guard` - session checks for the screens behind the login page
//! - `config` - environment configuration
//!
//! # Security
//!
//! Passwords are held as [`secrecy::SecretString`] and never logged. Only
//! the normalized session is persisted; raw server responses are not.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod login;
pub mod store;

pub use client::{AuthClient, Credentials, LoginResponse};
pub use config::{ConfigError, ConsoleConfig};
pub use error::{FailureKind, LoginError};
pub use guard::{GuardRejection, require_finance, require_session};
pub use login::{FormError, LoginPage, LoginState};
pub use store::{FileStore, KeyValueStore, MemoryStore, SessionStore, StoreError};
