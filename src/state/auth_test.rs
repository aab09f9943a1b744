use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_800_000_000).unwrap()
}

fn session(token: String) -> AuthSession {
    AuthSession {
        token,
        wallet_address: Some("0xabc".into()),
        user: Some(User {
            id: "u-1".into(),
            username: Some("alice".into()),
            email: None,
            wallet_address: Some("0xuser".into()),
            membership: Some("gold".into()),
        }),
    }
}

fn temp_path(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("nftstake-auth-{tag}-{}-{n}.json", std::process::id()))
}

// =============================================================
// token expiry
// =============================================================

#[test]
fn future_exp_is_not_expired() {
    let token = jwt(&serde_json::json!({ "exp": 1_800_000_600 }));
    assert!(!is_token_expired(&token, now()));
}

#[test]
fn past_exp_is_expired() {
    let token = jwt(&serde_json::json!({ "exp": 1_799_999_999 }));
    assert!(is_token_expired(&token, now()));
}

#[test]
fn malformed_tokens_are_expired() {
    assert!(is_token_expired("", now()));
    assert!(is_token_expired("not-a-jwt", now()));
    assert!(is_token_expired("a.!!!.c", now()));
    assert!(is_token_expired("a.b.c.d", now()));
    let no_json = format!("x.{}.y", URL_SAFE_NO_PAD.encode("plain text"));
    assert!(is_token_expired(&no_json, now()));
}

#[test]
fn missing_exp_is_expired() {
    let token = jwt(&serde_json::json!({ "sub": "u-1" }));
    assert!(is_token_expired(&token, now()));
}

#[test]
fn padded_payload_is_accepted() {
    let claims = serde_json::json!({ "exp": 1_800_000_600 }).to_string();
    let padded = base64::engine::general_purpose::URL_SAFE.encode(claims);
    assert!(!is_token_expired(&format!("h.{padded}.s"), now()));
}

// =============================================================
// AuthSession
// =============================================================

#[test]
fn wallet_address_falls_back_to_user_profile() {
    let mut s = session("t".into());
    assert_eq!(s.wallet_address(), Some("0xabc"));
    s.wallet_address = None;
    assert_eq!(s.wallet_address(), Some("0xuser"));
    s.user = None;
    assert_eq!(s.wallet_address(), None);
}

#[test]
fn session_serializes_camel_case() {
    let json = serde_json::to_value(session("t".into())).unwrap();
    assert_eq!(json["walletAddress"], "0xabc");
    assert_eq!(json["user"]["walletAddress"], "0xuser");
}

// =============================================================
// AuthStore hydration
// =============================================================

#[test]
fn hydrate_empty_storage_is_signed_out() {
    let store = AuthStore::hydrate_at(MemoryStorage::default(), now());
    assert!(store.session().is_none());
    assert!(store.get_token().is_none());
    assert!(store.get_user().is_none());
    assert!(!store.is_authenticated());
}

#[test]
fn hydrate_valid_session_exposes_token_user_and_wallet() {
    let token = jwt(&serde_json::json!({ "exp": 1_800_000_600 }));
    let store = AuthStore::hydrate_at(MemoryStorage::new(Some(session(token.clone()))), now());
    assert_eq!(store.get_token(), Some(token));
    assert_eq!(store.get_user().unwrap().username.as_deref(), Some("alice"));
    assert_eq!(store.wallet_address().as_deref(), Some("0xabc"));
}

#[test]
fn hydrate_expired_session_clears_storage() {
    let path = temp_path("expired");
    let storage = FileStorage::new(&path);
    storage.save(&session(jwt(&serde_json::json!({ "exp": 1 })))).unwrap();

    let store = AuthStore::hydrate_at(storage.clone(), now());
    assert!(store.session().is_none());
    assert!(!path.exists());
}

#[test]
fn hydrate_malformed_token_is_signed_out() {
    let store = AuthStore::hydrate_at(MemoryStorage::new(Some(session("garbage".into()))), now());
    assert!(store.session().is_none());
}

#[test]
fn hydrate_corrupt_file_is_signed_out() {
    let path = temp_path("corrupt");
    std::fs::write(&path, "{ not json").unwrap();
    let store = AuthStore::hydrate_at(FileStorage::new(&path), now());
    assert!(store.session().is_none());
    let _ = std::fs::remove_file(&path);
}

// =============================================================
// AuthStore writes
// =============================================================

#[test]
fn set_session_persists_and_notifies() {
    let path = temp_path("set");
    let store = AuthStore::hydrate_at(FileStorage::new(&path), now());
    let mut rx = store.subscribe();

    let s = session(jwt(&serde_json::json!({ "exp": 4_000_000_000_u64 })));
    store.set_session(s.clone()).unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_ref(), Some(&s));
    assert_eq!(FileStorage::new(&path).load().unwrap(), Some(s));
    assert!(store.is_authenticated());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn clear_auth_data_removes_file_and_session() {
    let path = temp_path("clear");
    let storage = FileStorage::new(&path);
    let store = AuthStore::hydrate_at(storage.clone(), now());
    store.set_session(session(jwt(&serde_json::json!({ "exp": 4_000_000_000_u64 })))).unwrap();
    assert!(path.exists());

    store.clear_auth_data().unwrap();
    assert!(store.session().is_none());
    assert!(!path.exists());
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn file_storage_missing_file_loads_none() {
    let storage = FileStorage::new(temp_path("missing"));
    assert_eq!(storage.load().unwrap(), None);
    storage.clear().unwrap();
}

#[test]
fn init_global_hydrates_once() {
    let first = init_global(MemoryStorage::default());
    let token = jwt(&serde_json::json!({ "exp": 4_000_000_000_u64 }));
    let second = init_global(MemoryStorage::new(Some(session(token))));
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(global().unwrap(), first));
    assert!(first.session().is_none());
}
