//! Errors raised while normalizing an authentication response.

use thiserror::Error;

/// The authentication server answered with a success status but the body
/// cannot be turned into a session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidResponse {
    /// The body is not a JSON object.
    #[error("invalid response: body is not a JSON object")]
    NotAnObject,
    /// The body has no `roles`, or they normalize to nothing.
    #[error("invalid response: missing or empty roles")]
    MissingRoles,
}
