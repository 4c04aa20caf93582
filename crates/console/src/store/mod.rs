//! Session persistence.
//!
//! The console keeps the logged-in user in two namespaces, mirroring the
//! browser's storage model:
//!
//! - **durable** - survives restarts ([`FileStore`] on disk)
//! - **tab-scoped** - lives as long as one browsing context (a temp
//!   directory, or a [`MemoryStore`] in tests)
//!
//! Both are plain string key-value stores behind [`KeyValueStore`].
//! [`SessionStore`] is the only writer: it owns the record layout, the
//! scalar mirrors and the validation rules.

mod file;
mod memory;
mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::SessionStore;

use thiserror::Error;

/// Storage keys shared with the other console screens.
pub mod keys {
    /// Full session record in the durable store.
    pub const AUTH: &str = "auth";
    /// Full session record in the tab store.
    pub const SESSION_USER: &str = "sessionUser";

    /// Mirror: `"true"` when charts are hidden (student accounts).
    pub const HIDE_CHARTS: &str = "hideCharts";
    /// Mirror: group mode (`single_college`, ...).
    pub const GROUP_MODE: &str = "groupMode";
    /// Mirror: `"true"` for group admins.
    pub const IS_GROUP_ADMIN: &str = "isGroupAdmin";
    /// Mirror: role a group admin acts on behalf of.
    pub const CHILD_USER_ROLE: &str = "childUserRole";
    /// Mirror: active college identifier.
    pub const ACTIVE_COLLEGE_ID: &str = "activeCollegeId";
    /// Mirror: active group identifier.
    pub const ACTIVE_GROUP_ID: &str = "activeGroupId";
    /// Mirror: college code.
    pub const COLLEGE_CODE: &str = "collegeCode";

    /// Every scalar mirror key.
    pub const MIRRORS: &[&str] = &[
        HIDE_CHARTS,
        GROUP_MODE,
        IS_GROUP_ADMIN,
        CHILD_USER_ROLE,
        ACTIVE_COLLEGE_ID,
        ACTIVE_GROUP_ID,
        COLLEGE_CODE,
    ];
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing files failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session record could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key cannot be stored by this backend.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    /// Another thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// A string key-value namespace.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Removes every key in the namespace.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn clear(&self) -> Result<(), StoreError>;
}
