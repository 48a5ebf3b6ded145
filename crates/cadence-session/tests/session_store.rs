use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use cadence_codec::ObfuscationCodec;
use cadence_session::{SessionStore, TOKEN_KEY, USER_CHECKSUM_KEY, USER_KEY};
use cadence_storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
use cadence_types::models::{Role, UserRecord};

fn ana() -> UserRecord {
    UserRecord::new("u1", "ana", Role::User)
}

fn boris() -> UserRecord {
    UserRecord::new("u2", "boris", Role::Admin).with_email("boris@example.com")
}

fn session_over(storage: Arc<MemoryStore>) -> SessionStore<Arc<MemoryStore>> {
    SessionStore::new(storage, ObfuscationCodec::default())
}

/// Wraps a memory store and refuses writes to the listed keys.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    read_only: Mutex<HashSet<String>>,
    unreadable: Mutex<HashSet<String>>,
}

impl FlakyStore {
    fn refuse_writes(&self, key: &str) {
        self.read_only.lock().unwrap().insert(key.to_string());
    }

    fn refuse_reads(&self, key: &str) {
        self.unreadable.lock().unwrap().insert(key.to_string());
    }

    fn allow_all(&self) {
        self.read_only.lock().unwrap().clear();
        self.unreadable.lock().unwrap().clear();
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unreadable.lock().unwrap().contains(key) {
            return Err(StorageError::Unavailable(format!("read of {key} refused")));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.lock().unwrap().contains(key) {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[test]
fn end_to_end_login_logout() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(storage.clone());

    assert!(session.is_loading());
    assert!(!session.restore());
    assert!(!session.is_loading());
    assert!(!session.is_authenticated());

    session.login(ana(), "tok123");
    assert!(session.is_authenticated());
    assert!(!session.is_admin());
    assert_eq!(session.bearer_token().as_deref(), Some("tok123"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));
    assert!(storage.get(USER_KEY).unwrap().is_some());
    assert!(storage.get(USER_CHECKSUM_KEY).unwrap().is_some());

    session.logout();
    assert!(!session.is_authenticated());
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_CHECKSUM_KEY).unwrap(), None);
}

#[test]
fn cached_record_is_obfuscated() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(storage.clone());
    session.restore();
    session.login(boris(), "tok-b");

    let stored = storage.get(USER_KEY).unwrap().unwrap();
    assert!(!stored.contains("boris"));
    assert!(!stored.contains("tok-b"));
}

#[test]
fn session_survives_restart() {
    let storage = Arc::new(MemoryStore::new());
    {
        let mut session = session_over(storage.clone());
        session.restore();
        session.login(boris(), "tok-b");
    }

    let mut session = session_over(storage);
    assert!(session.restore());
    assert_eq!(session.current_user(), Some(boris()));
    assert_eq!(session.bearer_token().as_deref(), Some("tok-b"));
    assert!(session.is_admin());
}

#[test]
fn session_survives_restart_on_sqlite() {
    let dir = std::env::temp_dir().join(format!("cadence_session_test_{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("profile.db");
    let _ = std::fs::remove_file(&path);

    {
        let mut session = SessionStore::new(SqliteStore::open(&path).unwrap(), ObfuscationCodec::default());
        session.restore();
        session.login(ana(), "tok123");
    }

    let mut session = SessionStore::new(SqliteStore::open(&path).unwrap(), ObfuscationCodec::default());
    assert!(session.restore());
    assert_eq!(session.current_user(), Some(ana()));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn logout_is_idempotent() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(storage.clone());
    session.restore();
    session.login(ana(), "tok123");

    session.logout();
    let once = (session.snapshot(), storage.keys().unwrap());
    session.logout();
    let twice = (session.snapshot(), storage.keys().unwrap());

    assert_eq!(once, twice);
    assert!(storage.is_empty().unwrap());
}

#[test]
fn logout_when_never_logged_in() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(storage.clone());
    session.restore();
    session.logout();
    assert!(!session.is_authenticated());
    assert!(storage.is_empty().unwrap());
}

#[test]
fn login_overwrites_previous_identity() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(storage.clone());
    session.restore();

    session.login(ana(), "tokenA");
    let ana_payload = storage.get(USER_KEY).unwrap().unwrap();
    session.login(boris(), "tokenB");

    assert_eq!(session.current_user(), Some(boris()));
    assert_eq!(session.bearer_token().as_deref(), Some("tokenB"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tokenB"));

    let stored = storage.get(USER_KEY).unwrap().unwrap();
    assert_ne!(stored, ana_payload);
    let decoded = ObfuscationCodec::default()
        .decode::<UserRecord>(Some(&stored))
        .unwrap()
        .unwrap();
    assert_eq!(decoded.value, boris());
}

#[test]
fn orphan_token_is_removed() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "tok123").unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(!session.is_authenticated());
    assert!(!session.is_loading());
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn orphan_record_is_removed() {
    let codec = ObfuscationCodec::default();
    let encoded = codec.encode(&ana()).unwrap();
    let storage = Arc::new(MemoryStore::new());
    storage.set(USER_KEY, &encoded.payload).unwrap();
    storage.set(USER_CHECKSUM_KEY, &encoded.checksum).unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(storage.is_empty().unwrap());
}

#[test]
fn empty_token_counts_as_missing() {
    let codec = ObfuscationCodec::default();
    let encoded = codec.encode(&ana()).unwrap();
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "").unwrap();
    storage.set(USER_KEY, &encoded.payload).unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(storage.is_empty().unwrap());
}

#[test]
fn corrupt_record_logs_out_and_purges() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "tok123").unwrap();
    storage.set(USER_KEY, "%%% definitely not a record %%%").unwrap();
    storage.set(USER_CHECKSUM_KEY, "MTIz").unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(!session.is_loading());
    assert!(storage.is_empty().unwrap());
}

#[test]
fn tampered_role_fails_integrity() {
    let storage = Arc::new(MemoryStore::new());
    {
        let mut session = session_over(storage.clone());
        session.restore();
        session.login(ana(), "tok123");
    }

    // Swap in a promoted record but leave the original checksum.
    let promoted = UserRecord::new("u1", "ana", Role::Admin);
    let forged = ObfuscationCodec::default().encode(&promoted).unwrap();
    storage.set(USER_KEY, &forged.payload).unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(!session.is_admin());
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_CHECKSUM_KEY).unwrap(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn single_byte_mutation_logs_out() {
    let storage = Arc::new(MemoryStore::new());
    {
        let mut session = session_over(storage.clone());
        session.restore();
        session.login(ana(), "tok123");
    }

    let mut bytes = storage.get(USER_KEY).unwrap().unwrap().into_bytes();
    bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
    storage.set(USER_KEY, &String::from_utf8(bytes).unwrap()).unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(storage.is_empty().unwrap());
}

#[test]
fn record_without_checksum_is_trusted() {
    let codec = ObfuscationCodec::default();
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "tok123").unwrap();
    storage
        .set(USER_KEY, &codec.encode(&ana()).unwrap().payload)
        .unwrap();

    let mut session = session_over(storage);
    assert!(session.restore());
    assert_eq!(session.current_user(), Some(ana()));
}

#[test]
fn plain_record_is_restored() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "tok123").unwrap();
    storage
        .set(USER_KEY, r#"{"id":"u1","username":"ana","role":"USER"}"#)
        .unwrap();

    let mut session = session_over(storage);
    assert!(session.restore());
    assert_eq!(session.current_user(), Some(ana()));
}

#[test]
fn web_client_record_is_restored() {
    // As written by the browser client, which cached the whole login
    // response including the token and name fields.
    let web = serde_json::json!({
        "token": "tok123",
        "id": "u1",
        "username": "ana",
        "email": "ana@example.com",
        "firstName": "Ana",
        "lastName": "Anić",
        "role": "USER"
    });
    let codec = ObfuscationCodec::default();
    let encoded = codec.encode(&web).unwrap();

    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "tok123").unwrap();
    storage.set(USER_KEY, &encoded.payload).unwrap();
    storage.set(USER_CHECKSUM_KEY, &encoded.checksum).unwrap();

    let mut session = session_over(storage);
    assert!(session.restore());
    let user = session.current_user().unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Ana"));
    assert_eq!(user.role, Role::User);
}

#[test]
fn non_user_json_is_rejected() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "tok123").unwrap();
    storage.set(USER_KEY, r#"["not", "a", "user"]"#).unwrap();

    let mut session = session_over(storage.clone());
    assert!(!session.restore());
    assert!(storage.is_empty().unwrap());
}

#[test]
fn role_check_is_case_sensitive() {
    let mut session = session_over(Arc::new(MemoryStore::new()));
    session.restore();
    assert!(!session.is_admin());

    session.login(UserRecord::new("u1", "ana", Role::from("admin")), "t");
    assert!(!session.is_admin());

    session.login(UserRecord::new("u1", "ana", Role::from("ADMIN")), "t");
    assert!(session.is_admin());

    session.logout();
    assert!(!session.is_admin());
}

#[test]
fn failed_record_write_falls_back_to_plain() {
    let storage = Arc::new(FlakyStore::default());
    storage.refuse_writes(USER_CHECKSUM_KEY);

    let mut session = SessionStore::new(storage.clone(), ObfuscationCodec::default());
    session.restore();
    session.login(ana(), "tok123");
    assert!(session.is_authenticated());

    let stored = storage.get(USER_KEY).unwrap().unwrap();
    assert_eq!(stored, r#"{"id":"u1","username":"ana","role":"USER"}"#);
    assert_eq!(storage.get(USER_CHECKSUM_KEY).unwrap(), None);

    storage.allow_all();
    let mut restarted = SessionStore::new(storage, ObfuscationCodec::default());
    assert!(restarted.restore());
    assert_eq!(restarted.current_user(), Some(ana()));
}

#[test]
fn unwritable_storage_keeps_memory_session() {
    let storage = Arc::new(FlakyStore::default());
    let mut session = SessionStore::new(storage.clone(), ObfuscationCodec::default());
    session.restore();
    session.login(ana(), "tokenA");

    for key in [TOKEN_KEY, USER_KEY, USER_CHECKSUM_KEY] {
        storage.refuse_writes(key);
    }
    session.login(boris(), "tokenB");

    assert_eq!(session.current_user(), Some(boris()));
    assert_eq!(session.bearer_token().as_deref(), Some("tokenB"));
    // Nothing of the previous identity is left behind.
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_CHECKSUM_KEY).unwrap(), None);
}

#[test]
fn unreadable_storage_restores_logged_out() {
    let storage = Arc::new(FlakyStore::default());
    storage.inner.set(TOKEN_KEY, "tok123").unwrap();
    storage.refuse_reads(USER_KEY);

    let mut session = SessionStore::new(storage.clone(), ObfuscationCodec::default());
    assert!(!session.restore());
    assert!(!session.is_loading());
    assert_eq!(storage.inner.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn codec_key_mismatch_logs_out() {
    let storage = Arc::new(MemoryStore::new());
    {
        let mut session = session_over(storage.clone());
        session.restore();
        session.login(ana(), "tok123");
    }

    let mut session = SessionStore::new(storage.clone(), ObfuscationCodec::new("rotated-key"));
    assert!(!session.restore());
    assert!(storage.is_empty().unwrap());
}
