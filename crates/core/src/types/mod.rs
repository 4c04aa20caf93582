//! Core types for the Campus Console.
//!
//! This module provides the canonical session record and the role types it
//! is derived from.

pub mod group_mode;
pub mod role;
pub mod session;

pub use group_mode::GroupMode;
pub use role::{RoleProfile, RoleSet, normalize_roles};
pub use session::CanonicalSession;
