//! Session store implementation
//!
//! Owns the identity → session mapping. The map itself sits behind a
//! short-lived `RwLock`; each session has its own async mutex, so work on
//! different identities never waits on the same lock while work on one
//! identity is serialized.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::state::{SeededSession, SessionSnapshot};
use crate::Error;

/// Shared handle to one identity's session
pub type SessionHandle = Arc<Mutex<SeededSession>>;

/// Identity-keyed session store
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create a store on the given clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Current time on the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Get the session for `identity`, creating it on first use
    pub fn handle(&self, identity: &str) -> Result<SessionHandle, Error> {
        if let Some(handle) = self.get(identity)? {
            return Ok(handle);
        }

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let handle = sessions
            .entry(identity.to_string())
            .or_insert_with(|| {
                debug!(identity = %identity, "creating session");
                Arc::new(Mutex::new(SeededSession::new(identity, self.clock.now())))
            })
            .clone();

        Ok(handle)
    }

    /// Get the session for `identity` if one exists
    pub fn get(&self, identity: &str) -> Result<Option<SessionHandle>, Error> {
        Ok(self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(identity)
            .cloned())
    }

    /// Snapshot of an existing session
    pub async fn snapshot(&self, identity: &str) -> Result<Option<SessionSnapshot>, Error> {
        match self.get(identity)? {
            Some(handle) => Ok(Some(handle.lock().await.snapshot())),
            None => Ok(None),
        }
    }

    /// Discard the session for `identity`; `false` when there was none
    pub fn reset(&self, identity: &str) -> Result<bool, Error> {
        let removed = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(identity)
            .is_some();

        if removed {
            debug!(identity = %identity, "session reset");
        }
        Ok(removed)
    }

    /// Discard every session
    pub fn clear(&self) -> Result<(), Error> {
        self.sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .clear();
        Ok(())
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
