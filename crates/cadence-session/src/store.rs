use cadence_codec::{ObfuscationCodec, RecordFormat};
use cadence_storage::KeyValueStore;
use cadence_types::models::UserRecord;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::state::{SessionSnapshot, SessionState};

/// Bearer token, verbatim.
pub const TOKEN_KEY: &str = "token";
/// Obfuscated user record.
pub const USER_KEY: &str = "user";
/// Checksum of the plaintext user record.
pub const USER_CHECKSUM_KEY: &str = "user_checksum";

/// Single source of truth for the signed-in identity.
///
/// Mutations take `&mut self` and finish before returning; storage calls
/// are synchronous. Storage is best-effort: a failed write never undoes the
/// in-memory transition, it only means the session will not survive a
/// restart.
pub struct SessionStore<S> {
    storage: S,
    codec: ObfuscationCodec,
    tx: watch::Sender<SessionSnapshot>,
    restored: bool,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Logged out, `is_loading` set until [`restore`](Self::restore) runs.
    pub fn new(storage: S, codec: ObfuscationCodec) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            storage,
            codec,
            tx,
            restored: false,
        }
    }

    /// Rehydrate from storage. Runs once; later calls are ignored.
    ///
    /// Token and record must both be present and the record must decode and
    /// pass its checksum. Anything less clears every session key. Returns
    /// whether a session was restored.
    pub fn restore(&mut self) -> bool {
        if self.restored {
            warn!("Session restore already ran; ignoring");
            return self.is_authenticated();
        }
        self.restored = true;

        let token = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read stored token");
                None
            }
        };

        let user = match self.load_user() {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Discarding cached user record");
                None
            }
        };

        let state = match (user, token) {
            (Some(user), Some(token)) => {
                info!(username = %user.username, role = %user.role, "Session restored");
                SessionState::LoggedIn { user, token }
            }
            (user, token) => {
                if user.is_some() || token.is_some() {
                    warn!(
                        has_user = user.is_some(),
                        has_token = token.is_some(),
                        "Incomplete session in storage; clearing"
                    );
                }
                self.clear_persisted();
                SessionState::LoggedOut
            }
        };

        self.tx.send_modify(|snap| {
            snap.state = state;
            snap.is_loading = false;
        });
        self.is_authenticated()
    }

    /// Adopt an identity the server has already vouched for. Replaces any
    /// current one.
    pub fn login(&mut self, user: UserRecord, token: impl Into<String>) {
        let token = token.into();
        self.persist(&user, &token);

        info!(username = %user.username, role = %user.role, "Logged in");
        self.tx
            .send_modify(|snap| snap.state = SessionState::LoggedIn { user, token });
    }

    /// Forget the identity, in memory and in storage. Calling it while
    /// logged out changes nothing.
    pub fn logout(&mut self) {
        self.clear_persisted();

        let changed = self.tx.send_if_modified(|snap| {
            if !snap.state.is_logged_in() {
                return false;
            }
            snap.state = SessionState::LoggedOut;
            true
        });
        if changed {
            info!("Logged out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.tx.borrow().is_admin()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.tx.borrow().current_user().cloned()
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.tx.borrow().bearer_token().map(str::to_owned)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Tear down. Subscribers see the channel close; the storage handle is
    /// handed back untouched.
    pub fn dispose(self) -> S {
        let Self { storage, tx, .. } = self;
        drop(tx);
        debug!("Session store disposed");
        storage
    }

    fn load_user(&self) -> Result<Option<UserRecord>, SessionError> {
        let stored = self.storage.get(USER_KEY)?;
        let Some(decoded) = self.codec.decode::<Value>(stored.as_deref())? else {
            return Ok(None);
        };

        let checksum = self.storage.get(USER_CHECKSUM_KEY)?;
        if !self.codec.verify_integrity(&decoded.value, checksum.as_deref()) {
            return Err(SessionError::Integrity);
        }
        if decoded.format == RecordFormat::Plain {
            debug!("Cached user record was stored without obfuscation");
        }

        let user = serde_json::from_value(decoded.value).map_err(SessionError::Record)?;
        Ok(Some(user))
    }

    fn persist(&self, user: &UserRecord, token: &str) {
        if let Err(e) = self.storage.set(TOKEN_KEY, token) {
            warn!(error = %e, "Could not persist bearer token; session is memory-only");
            self.discard(TOKEN_KEY);
        }

        let encoded = match self.codec.encode(user) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Could not encode user record; session is memory-only");
                self.discard(USER_KEY);
                self.discard(USER_CHECKSUM_KEY);
                return;
            }
        };

        let written = self
            .storage
            .set(USER_KEY, &encoded.payload)
            .and_then(|_| self.storage.set(USER_CHECKSUM_KEY, &encoded.checksum));
        let Err(e) = written else {
            return;
        };

        warn!(error = %e, "Could not persist obfuscated user record; storing it plain");
        let plain = self
            .storage
            .remove(USER_CHECKSUM_KEY)
            .and_then(|_| self.storage.set(USER_KEY, &encoded.canonical));
        if let Err(e) = plain {
            warn!(error = %e, "Could not persist user record; session is memory-only");
            self.discard(USER_KEY);
            self.discard(USER_CHECKSUM_KEY);
        }
    }

    fn clear_persisted(&self) {
        self.discard(TOKEN_KEY);
        self.discard(USER_KEY);
        self.discard(USER_CHECKSUM_KEY);
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!(key, error = %e, "Could not remove session entry");
        }
    }
}
