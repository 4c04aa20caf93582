//! The session store: one canonical session over two namespaces.

use campus_console_core::{CanonicalSession, Invalidity, SessionValidator};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{FileStore, KeyValueStore, StoreError, keys};
use crate::config::ConsoleConfig;

/// Reads and writes the persisted session.
///
/// `save` replaces whatever was stored before: both namespaces are cleared,
/// the record is written to the durable (`auth`) and tab (`sessionUser`)
/// keys, then the scalar mirrors are written to the tab namespace. There is
/// no cross-tab locking; the last writer wins.
pub struct SessionStore {
    durable: Box<dyn KeyValueStore>,
    tab: Box<dyn KeyValueStore>,
    validator: SessionValidator,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store over the given durable and tab namespaces.
    #[must_use]
    pub fn new(
        durable: impl KeyValueStore + 'static,
        tab: impl KeyValueStore + 'static,
    ) -> Self {
        Self {
            durable: Box::new(durable),
            tab: Box::new(tab),
            validator: SessionValidator::default(),
        }
    }

    /// Create file-backed namespaces from the configured directories.
    #[must_use]
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(
            FileStore::new(&config.durable_store_dir),
            FileStore::new(&config.tab_store_dir),
        )
        .with_validator(config.validator())
    }

    #[must_use]
    pub const fn with_validator(mut self, validator: SessionValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Persist a freshly built session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either namespace cannot be written. Both
    /// namespaces are cleared again on failure so no partial session is
    /// left behind.
    pub fn save(&self, session: &CanonicalSession) -> Result<(), StoreError> {
        let record = serde_json::to_string(session)?;
        self.write(&record, session).inspect_err(|e| {
            warn!(error = %e, "failed to persist session, clearing stores");
            self.discard();
        })
    }

    fn write(&self, record: &str, session: &CanonicalSession) -> Result<(), StoreError> {
        self.clear()?;
        self.durable.set(keys::AUTH, record)?;
        self.tab.set(keys::SESSION_USER, record)?;
        for (key, value) in mirrors(session) {
            self.tab.set(key, &value)?;
        }
        Ok(())
    }

    /// Load the persisted session if it is still valid.
    ///
    /// A session that fails validation is destroyed and `None` is returned.
    #[must_use]
    pub fn load(&self) -> Option<CanonicalSession> {
        self.load_at(Utc::now())
    }

    /// [`load`](Self::load) evaluated at `now`.
    #[must_use]
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<CanonicalSession> {
        self.inspect(now)
            .inspect_err(|reason| {
                debug!(%reason, "discarding persisted session");
                self.discard();
            })
            .ok()
    }

    /// Whether a usable session is persisted. Never fails.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.check_at(now).is_ok()
    }

    /// Validate the persisted records at `now`.
    ///
    /// Unreadable backends count as missing records. A durable record that
    /// passes validation but is not a complete session is unreadable.
    ///
    /// # Errors
    ///
    /// Returns the reason the persisted session is unusable.
    pub fn check_at(&self, now: DateTime<Utc>) -> Result<(), Invalidity> {
        self.inspect(now).map(drop)
    }

    fn inspect(&self, now: DateTime<Utc>) -> Result<CanonicalSession, Invalidity> {
        let durable = read(self.durable.as_ref(), keys::AUTH);
        let tab = read(self.tab.as_ref(), keys::SESSION_USER);
        self.validator.check(durable.as_deref(), tab.as_deref(), now)?;

        let record = durable.ok_or(Invalidity::MissingDurableRecord)?;
        serde_json::from_str(&record).map_err(|_| Invalidity::UnreadableDurableRecord)
    }

    /// Read a scalar mirror from the tab namespace.
    #[must_use]
    pub fn mirror(&self, key: &str) -> Option<String> {
        read(self.tab.as_ref(), key)
    }

    /// Destroy the session in both namespaces.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either namespace cannot be cleared. The tab
    /// namespace is still cleared when the durable one fails.
    pub fn clear(&self) -> Result<(), StoreError> {
        let durable = self.durable.clear();
        let tab = self.tab.clear();
        durable.and(tab)
    }

    fn discard(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "failed to clear invalid session");
        }
    }
}

/// Read errors count as absent values.
fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store
        .get(key)
        .inspect_err(|e| debug!(key, error = %e, "session store read failed"))
        .ok()
        .flatten()
}

/// Scalar mirrors written next to the tab record. Absent optional values
/// are not written.
fn mirrors(session: &CanonicalSession) -> Vec<(&'static str, String)> {
    let mut entries = vec![
        (keys::HIDE_CHARTS, session.hide_charts.to_string()),
        (keys::GROUP_MODE, session.group_mode.to_string()),
        (keys::IS_GROUP_ADMIN, session.is_group_admin.to_string()),
    ];
    let optional = [
        (keys::CHILD_USER_ROLE, &session.child_user_role),
        (keys::ACTIVE_COLLEGE_ID, &session.active_college_id),
        (keys::ACTIVE_GROUP_ID, &session.active_group_id),
        (keys::COLLEGE_CODE, &session.college_code),
    ];
    entries.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|value| (key, value))),
    );
    entries
}
