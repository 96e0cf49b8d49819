//! services/client/tests/session_tests.rs
//!
//! Session lifecycle tests against fake port implementations: login with and
//! without persistence, silent refresh, forced logout on refresh failure,
//! and the file-backed session store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use client_lib::adapters::FileSessionStore;
use client_lib::session::{SessionManager, TokenCell};
use lep_inspect_core::domain::{
    AiModel, BatchInit, BatchListQuery, BatchPage, BatchStatus, FileInit, ImageStats,
    PersistedSession, PhotoPage, TokenPair, UserProfile,
};
use lep_inspect_core::ports::{
    InspectionApi, PortError, PortResult, SessionStorage,
};

//=========================================================================================
// Fakes
//=========================================================================================

fn test_user() -> UserProfile {
    UserProfile {
        id: 7,
        email: "inspector@example.com".to_string(),
        first_name: "Anna".to_string(),
        last_name: "Petrova".to_string(),
    }
}

#[derive(Default)]
struct FakeApi {
    login_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    fail_login: AtomicBool,
    fail_refresh: AtomicBool,
    fail_whoami: AtomicBool,
    fail_logout: AtomicBool,
    issued: Mutex<Vec<TokenPair>>,
}

impl FakeApi {
    fn issue(&self, tag: &str) -> TokenPair {
        let pair = TokenPair {
            access: format!("access-{tag}"),
            refresh: format!("refresh-{tag}"),
        };
        self.issued.lock().unwrap().push(pair.clone());
        pair
    }
}

#[async_trait]
impl InspectionApi for FakeApi {
    async fn login(&self, _email: &str, _password: &str) -> PortResult<TokenPair> {
        let n = self.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(PortError::Unauthorized);
        }
        Ok(self.issue(&format!("login-{n}")))
    }

    async fn refresh(&self, _refresh_token: &str) -> PortResult<TokenPair> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(PortError::Unauthorized);
        }
        Ok(self.issue(&format!("refresh-{n}")))
    }

    async fn whoami(&self) -> PortResult<UserProfile> {
        if self.fail_whoami.load(Ordering::SeqCst) {
            return Err(PortError::Unauthorized);
        }
        Ok(test_user())
    }

    async fn logout(&self, _refresh_token: &str) -> PortResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(PortError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    async fn list_models(&self) -> PortResult<Vec<AiModel>> {
        Err(PortError::Malformed("list_models not wired".to_string()))
    }

    async fn list_batches(&self, _query: &BatchListQuery) -> PortResult<BatchPage> {
        Err(PortError::Malformed("list_batches not wired".to_string()))
    }

    async fn delete_batch(&self, _batch_id: u64) -> PortResult<()> {
        Err(PortError::Malformed("delete_batch not wired".to_string()))
    }

    async fn batch_status(&self, _batch_id: u64) -> PortResult<BatchStatus> {
        Err(PortError::Malformed("batch_status not wired".to_string()))
    }

    async fn init_batch(&self, _batch_name: &str, _files: &[FileInit]) -> PortResult<BatchInit> {
        Err(PortError::Malformed("init_batch not wired".to_string()))
    }

    async fn confirm_batch(&self, _batch_id: u64, _model_id: u64) -> PortResult<()> {
        Err(PortError::Malformed("confirm_batch not wired".to_string()))
    }

    async fn photo_page(&self, _path: &str) -> PortResult<PhotoPage> {
        Err(PortError::Malformed("photo_page not wired".to_string()))
    }

    async fn batch_stats(&self) -> PortResult<ImageStats> {
        Err(PortError::Malformed("batch_stats not wired".to_string()))
    }
}

#[derive(Default)]
struct MemoryStore {
    session: Mutex<Option<PersistedSession>>,
    save_calls: AtomicUsize,
    clear_calls: AtomicUsize,
}

impl SessionStorage for MemoryStore {
    fn load(&self) -> PortResult<Option<PersistedSession>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save(&self, session: &PersistedSession) -> PortResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

fn manager(api: &Arc<FakeApi>, store: &Arc<MemoryStore>) -> SessionManager {
    SessionManager::new(
        Arc::clone(api) as Arc<dyn InspectionApi>,
        Arc::clone(store) as Arc<dyn SessionStorage>,
        TokenCell::default(),
    )
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn login_with_remember_persists_the_session() {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    let user = session
        .login("inspector@example.com", "secret", true)
        .await
        .unwrap();
    assert_eq!(user, test_user());
    assert!(session.is_logged_in());
    assert_eq!(session.access_token().as_deref(), Some("access-login-0"));

    let persisted = store.session.lock().unwrap().clone().unwrap();
    assert_eq!(persisted.access_token, "access-login-0");
    assert_eq!(persisted.refresh_token, "refresh-login-0");
    assert_eq!(persisted.user, test_user());
}

#[tokio::test]
async fn login_without_remember_stays_memory_only() {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    session
        .login("inspector@example.com", "secret", false)
        .await
        .unwrap();
    assert!(session.is_logged_in());
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
    assert!(store.session.lock().unwrap().is_none());
}

#[tokio::test]
async fn failed_login_leaves_no_session() {
    let api = Arc::new(FakeApi::default());
    api.fail_login.store(true, Ordering::SeqCst);
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    let result = session.login("inspector@example.com", "wrong", true).await;
    assert!(matches!(result, Err(PortError::Unauthorized)));
    assert!(!session.is_logged_in());
    assert!(session.user().is_none());
}

#[tokio::test]
async fn whoami_failure_after_login_rolls_the_session_back() {
    let api = Arc::new(FakeApi::default());
    api.fail_whoami.store(true, Ordering::SeqCst);
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    let result = session.login("inspector@example.com", "secret", true).await;
    assert!(result.is_err());
    assert!(!session.is_logged_in());
    assert!(store.session.lock().unwrap().is_none());
}

#[tokio::test]
async fn refresh_rotates_tokens_and_re_persists() {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    session
        .login("inspector@example.com", "secret", true)
        .await
        .unwrap();
    session.refresh_once().await.unwrap();

    assert_eq!(session.access_token().as_deref(), Some("access-refresh-0"));
    let persisted = store.session.lock().unwrap().clone().unwrap();
    assert_eq!(persisted.refresh_token, "refresh-refresh-0");
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_failure_forces_a_full_local_logout() {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    session
        .login("inspector@example.com", "secret", true)
        .await
        .unwrap();
    api.fail_refresh.store(true, Ordering::SeqCst);

    let result = session.refresh_once().await;
    assert!(result.is_err());
    assert!(!session.is_logged_in());
    assert!(session.user().is_none());
    assert!(store.session.lock().unwrap().is_none());

    // With no refresh token left, further refresh passes are no-ops.
    session.refresh_once().await.unwrap();
    assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn logout_clears_locally_even_when_the_server_call_fails() {
    let api = Arc::new(FakeApi::default());
    api.fail_logout.store(true, Ordering::SeqCst);
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    session
        .login("inspector@example.com", "secret", true)
        .await
        .unwrap();
    session.logout().await;

    assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);
    assert!(!session.is_logged_in());
    assert!(store.session.lock().unwrap().is_none());
}

#[tokio::test]
async fn resume_restores_a_persisted_session() {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::default());
    *store.session.lock().unwrap() = Some(PersistedSession {
        access_token: "stored-access".to_string(),
        refresh_token: "stored-refresh".to_string(),
        user: test_user(),
    });
    let session = manager(&api, &store);

    assert!(session.resume().unwrap());
    assert!(session.is_logged_in());
    assert_eq!(session.access_token().as_deref(), Some("stored-access"));
    assert_eq!(session.user(), Some(test_user()));
}

#[tokio::test]
async fn resume_without_a_snapshot_is_a_clean_no_op() {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::default());
    let session = manager(&api, &store);

    assert!(!session.resume().unwrap());
    assert!(!session.is_logged_in());
}

//=========================================================================================
// File-backed store
//=========================================================================================

#[test]
fn file_store_round_trips_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    let store = FileSessionStore::new(&path);

    assert!(store.load().unwrap().is_none());

    let snapshot = PersistedSession {
        access_token: "a".to_string(),
        refresh_token: "r".to_string(),
        user: test_user(),
    };
    store.save(&snapshot).unwrap();
    assert!(path.exists());

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.access_token, "a");
    assert_eq!(loaded.refresh_token, "r");
    assert_eq!(loaded.user, test_user());

    store.clear().unwrap();
    assert!(!path.exists());
    // Clearing an already-empty store stays fine.
    store.clear().unwrap();
}

#[test]
fn file_store_rejects_a_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"{ not json").unwrap();
    let store = FileSessionStore::new(&path);
    assert!(matches!(store.load(), Err(PortError::Storage(_))));
}
