//! Browser-only checks; run with `wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use checker_frontend_common::auth::SessionState;
use checker_frontend_common::{AuthConfig, LocalStore, PersistentStore};
use std::sync::Arc;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_store_round_trip() {
    let store = LocalStore;
    store.set("checker_test_key", "value");
    assert_eq!(store.get("checker_test_key").as_deref(), Some("value"));
    store.remove("checker_test_key");
    assert_eq!(store.get("checker_test_key"), None);
}

#[wasm_bindgen_test]
fn session_survives_reload() {
    let first = SessionState::hydrate(Arc::new(LocalStore));
    first.set_access_token("a1");
    first.set_refresh_token("r1");

    let reloaded = SessionState::hydrate(Arc::new(LocalStore));
    assert_eq!(reloaded.access_token().as_deref(), Some("a1"));
    assert_eq!(reloaded.refresh_token().as_deref(), Some("r1"));

    reloaded.clear();
    for key in AuthConfig::SESSION_KEYS {
        assert_eq!(LocalStore.get(key), None);
    }
}

#[wasm_bindgen_test]
fn oversized_write_is_dropped_without_panicking() {
    // well past the usual 5 MiB localStorage quota
    let huge = "x".repeat(16 * 1024 * 1024);
    LocalStore.set("checker_test_huge", &huge);
    assert_eq!(LocalStore.get("checker_test_huge"), None);
    LocalStore.remove("checker_test_huge");
}
