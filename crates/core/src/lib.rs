//! Campus Console Core - session normalization and redirect rules.
//!
//! This crate holds the decision logic behind the console's login flow:
//! - `payload` - Field Resolver over loosely-typed authentication responses
//! - `types::role` - Role Classifier and its fixed predicates
//! - `builder` - Session Builder producing a [`CanonicalSession`]
//! - `validator` - Session Validator for previously persisted sessions
//! - `redirect` - Redirect Resolver choosing the post-login destination
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! client, no storage. Persisting sessions and talking to the authentication
//! server live in the `campus-console` crate, which feeds raw JSON in and
//! writes the results out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod builder;
pub mod error;
pub mod payload;
pub mod redirect;
pub mod types;
pub mod validator;

pub use builder::build_session;
pub use error::InvalidResponse;
pub use payload::{Field, resolve};
pub use redirect::{Destination, RedirectResolver, RedirectSource};
pub use types::*;
pub use validator::{Invalidity, SessionValidator};
