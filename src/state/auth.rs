//! Authentication session store.
//!
//! ARCHITECTURE
//! ============
//! The session (bearer token, wallet address, user profile) is persisted
//! through a [`SessionStorage`] backend and hydrated once at startup. All
//! writes go through [`AuthStore::set_session`] and
//! [`AuthStore::clear_auth_data`]; resource units only read. A process-wide
//! instance is available via [`init_global`] / [`global`].
//!
//! ERROR HANDLING
//! ==============
//! A token that cannot be parsed is treated as expired. Expired sessions are
//! dropped during hydration rather than surfaced to callers.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::net::types::User;

// =============================================================================
// SESSION
// =============================================================================

/// Persisted authentication session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthSession {
    /// Wallet address of the session, falling back to the user profile's.
    #[must_use]
    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.wallet_address.as_deref()))
            .filter(|w| !w.is_empty())
    }
}

/// True when `token` is not a JWT with a future `exp` claim.
#[must_use]
pub fn is_token_expired(token: &str, now: OffsetDateTime) -> bool {
    #[derive(Deserialize)]
    struct Claims {
        exp: Option<f64>,
    }

    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return true;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return true;
    };
    #[allow(clippy::cast_precision_loss)]
    let now_secs = now.unix_timestamp() as f64;
    match serde_json::from_slice::<Claims>(&bytes) {
        Ok(Claims { exp: Some(exp) }) => exp <= now_secs,
        _ => true,
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Errors from a session storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage contents invalid: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value backend holding the serialized session.
pub trait SessionStorage: Send + Sync {
    /// Read the stored session, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Backend or decode failures.
    fn load(&self) -> Result<Option<AuthSession>, StorageError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Backend or encode failures.
    fn save(&self, session: &AuthSession) -> Result<(), StorageError>;

    /// Remove the stored session.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Session stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<AuthSession>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, session: &AuthSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session held in memory only.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<AuthSession>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new(session: Option<AuthSession>) -> Self {
        Self { slot: Mutex::new(session) }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<AuthSession>, StorageError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &AuthSession) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Hydrated session state with owner-exclusive writes.
pub struct AuthStore {
    storage: Box<dyn SessionStorage>,
    session: watch::Sender<Option<AuthSession>>,
}

impl AuthStore {
    /// Load the stored session, dropping it if its token has expired.
    pub fn hydrate(storage: impl SessionStorage + 'static) -> Self {
        Self::hydrate_at(storage, OffsetDateTime::now_utc())
    }

    /// [`AuthStore::hydrate`] with an explicit clock.
    pub fn hydrate_at(storage: impl SessionStorage + 'static, now: OffsetDateTime) -> Self {
        let loaded = match storage.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "session load failed; starting signed out");
                None
            }
        };
        let session = match loaded {
            Some(session) if is_token_expired(&session.token, now) => {
                info!("stored session expired; clearing");
                if let Err(e) = storage.clear() {
                    warn!(error = %e, "failed to clear expired session");
                }
                None
            }
            other => other,
        };
        debug!(signed_in = session.is_some(), "auth store hydrated");
        let (tx, _) = watch::channel(session);
        Self { storage: Box::new(storage), session: tx }
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.session.borrow().clone()
    }

    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        self.session.borrow().as_ref().map(|s| s.token.clone())
    }

    #[must_use]
    pub fn get_user(&self) -> Option<User> {
        self.session.borrow().as_ref().and_then(|s| s.user.clone())
    }

    #[must_use]
    pub fn wallet_address(&self) -> Option<String> {
        self.session.borrow().as_ref().and_then(|s| s.wallet_address().map(str::to_owned))
    }

    /// True when a session exists and its token has not expired.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .borrow()
            .as_ref()
            .is_some_and(|s| !is_token_expired(&s.token, OffsetDateTime::now_utc()))
    }

    /// Receiver notified whenever the session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.session.subscribe()
    }

    /// Persist and publish a new session.
    ///
    /// # Errors
    ///
    /// Storage failures; the in-memory session is left unchanged.
    pub fn set_session(&self, session: AuthSession) -> Result<(), StorageError> {
        self.storage.save(&session)?;
        info!(wallet = session.wallet_address().unwrap_or("-"), "session stored");
        self.session.send_replace(Some(session));
        Ok(())
    }

    /// Sign out: forget the session in memory and in storage.
    ///
    /// # Errors
    ///
    /// Storage failures; the in-memory session is cleared regardless.
    pub fn clear_auth_data(&self) -> Result<(), StorageError> {
        self.session.send_replace(None);
        info!("session cleared");
        self.storage.clear()
    }
}

static GLOBAL: OnceLock<AuthStore> = OnceLock::new();

/// Hydrate the process-wide store from `storage` on first call.
///
/// Later calls return the existing store and ignore `storage`.
pub fn init_global(storage: impl SessionStorage + 'static) -> &'static AuthStore {
    GLOBAL.get_or_init(|| AuthStore::hydrate(storage))
}

/// The process-wide store, if [`init_global`] has run.
#[must_use]
pub fn global() -> Option<&'static AuthStore> {
    GLOBAL.get()
}
