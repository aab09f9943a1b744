use super::*;
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// # Safety
/// Callers hold `env_guard()` so no other test mutates these vars concurrently.
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("NFTSTAKE_API_URL");
        std::env::remove_var("NFTSTAKE_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("NFTSTAKE_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("NFTSTAKE_AUTH_FILE");
        std::env::remove_var("NFTSTAKE_COUNTDOWN_TICK_SECS");
        std::env::remove_var("NFTSTAKE_PHASE_LOOKUP");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_guard();
    unsafe { clear_client_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.countdown_tick, Duration::from_secs(60));
    assert_eq!(cfg.phase_lookup, PhaseLookup::Direct);
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_guard();
    unsafe {
        clear_client_env();
        std::env::set_var("NFTSTAKE_API_URL", "https://api.example.test/v2/");
        std::env::set_var("NFTSTAKE_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("NFTSTAKE_CONNECT_TIMEOUT_SECS", "7");
        std::env::set_var("NFTSTAKE_AUTH_FILE", "/tmp/session.json");
        std::env::set_var("NFTSTAKE_COUNTDOWN_TICK_SECS", "1");
        std::env::set_var("NFTSTAKE_PHASE_LOOKUP", "scan");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://api.example.test/v2");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.auth_file, PathBuf::from("/tmp/session.json"));
    assert_eq!(cfg.countdown_tick, Duration::from_secs(1));
    assert_eq!(cfg.phase_lookup, PhaseLookup::Scan);

    unsafe { clear_client_env() };
}

#[test]
fn from_env_unparsable_timeout_uses_default() {
    let _guard = env_guard();
    unsafe {
        clear_client_env();
        std::env::set_var("NFTSTAKE_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_client_env() };
}

#[test]
fn from_env_zero_tick_errors() {
    let _guard = env_guard();
    unsafe {
        clear_client_env();
        std::env::set_var("NFTSTAKE_COUNTDOWN_TICK_SECS", "0");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("greater than 0"));

    unsafe { clear_client_env() };
}

#[test]
fn parse_phase_lookup_rejects_unknown() {
    let err = parse_phase_lookup(Some("cached")).unwrap_err().to_string();
    assert!(err.contains("unsupported phase lookup"));
    assert_eq!(parse_phase_lookup(None).unwrap(), PhaseLookup::Direct);
    assert_eq!(parse_phase_lookup(Some(" scan ")).unwrap(), PhaseLookup::Scan);
}
