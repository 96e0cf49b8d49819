//! services/client/src/session.rs
//!
//! The session manager: the single owner of the authentication state.
//!
//! The access token is shared with the HTTP adapter through a read-only
//! `TokenCell` handle; only the manager mutates it (single-writer
//! discipline). Durable storage holds a cache of the session that survives
//! restarts; while the process is alive the manager is the source of truth.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lep_inspect_core::domain::{PersistedSession, UserProfile};
use lep_inspect_core::ports::{InspectionApi, PortResult, SessionStorage};

/// How often the background loop renews the token pair.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(25 * 60);

//=========================================================================================
// TokenCell (shared read handle)
//=========================================================================================

/// Shared handle to the current access token. Any component may read it;
/// only the session manager writes through it.
#[derive(Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    pub fn get(&self) -> Option<String> {
        self.inner.read().unwrap().clone()
    }

    pub(crate) fn set(&self, token: Option<String>) {
        *self.inner.write().unwrap() = token;
    }
}

//=========================================================================================
// SessionManager
//=========================================================================================

#[derive(Default)]
struct SessionInner {
    refresh_token: Option<String>,
    user: Option<UserProfile>,
    remember: bool,
}

pub struct SessionManager {
    api: Arc<dyn InspectionApi>,
    storage: Arc<dyn SessionStorage>,
    token: TokenCell,
    inner: Mutex<SessionInner>,
}

impl SessionManager {
    /// `token` is the same cell handed to the HTTP adapter, so a token
    /// installed here is immediately visible to every authenticated call.
    pub fn new(
        api: Arc<dyn InspectionApi>,
        storage: Arc<dyn SessionStorage>,
        token: TokenCell,
    ) -> Self {
        Self {
            api,
            storage,
            token,
            inner: Mutex::new(SessionInner::default()),
        }
    }

    /// Restores a previously persisted session, if any. Returns whether a
    /// session was resumed.
    pub fn resume(&self) -> PortResult<bool> {
        let Some(persisted) = self.storage.load()? else {
            return Ok(false);
        };
        self.token.set(Some(persisted.access_token));
        let mut inner = self.inner.lock().unwrap();
        inner.refresh_token = Some(persisted.refresh_token);
        inner.user = Some(persisted.user);
        inner.remember = true;
        Ok(true)
    }

    /// Logs in with credentials, installs the new token pair, and fetches
    /// the user profile. With `remember` the session is persisted; otherwise
    /// it stays memory-only.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> PortResult<UserProfile> {
        let pair = self.api.login(email, password).await?;
        self.token.set(Some(pair.access));
        {
            let mut inner = self.inner.lock().unwrap();
            inner.refresh_token = Some(pair.refresh);
            inner.user = None;
            inner.remember = remember;
        }

        // The adapter now sees the fresh token, so whoami authenticates.
        let user = match self.api.whoami().await {
            Ok(user) => user,
            Err(err) => {
                self.clear_local();
                return Err(err);
            }
        };
        self.inner.lock().unwrap().user = Some(user.clone());
        self.persist_if_remembered();
        info!(email, "logged in");
        Ok(user)
    }

    /// One pass of the silent-refresh protocol: renew both tokens, re-fetch
    /// the profile, re-persist. Any failure forces a full local logout; no
    /// retry is attempted.
    pub async fn refresh_once(&self) -> PortResult<()> {
        let refresh_token = self.inner.lock().unwrap().refresh_token.clone();
        let Some(refresh_token) = refresh_token else {
            return Ok(());
        };
        match self.try_refresh(&refresh_token).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "session refresh failed, logging out");
                self.clear_local();
                Err(err)
            }
        }
    }

    async fn try_refresh(&self, refresh_token: &str) -> PortResult<()> {
        let pair = self.api.refresh(refresh_token).await?;
        self.token.set(Some(pair.access));
        self.inner.lock().unwrap().refresh_token = Some(pair.refresh);
        let user = self.api.whoami().await?;
        self.inner.lock().unwrap().user = Some(user);
        self.persist_if_remembered();
        Ok(())
    }

    /// Logs out. The server-side invalidation is best-effort; local state is
    /// cleared unconditionally and immediately afterwards.
    pub async fn logout(&self) {
        let refresh_token = self.inner.lock().unwrap().refresh_token.clone();
        if let Some(refresh_token) = refresh_token {
            if let Err(err) = self.api.logout(&refresh_token).await {
                debug!(error = %err, "server-side logout failed, clearing locally anyway");
            }
        }
        self.clear_local();
        info!("logged out");
    }

    pub fn access_token(&self) -> Option<String> {
        self.token.get()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.lock().unwrap().user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }

    fn clear_local(&self) {
        self.token.set(None);
        *self.inner.lock().unwrap() = SessionInner::default();
        if let Err(err) = self.storage.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }
    }

    fn persist_if_remembered(&self) {
        let inner = self.inner.lock().unwrap();
        if !inner.remember {
            return;
        }
        let (Some(access), Some(refresh), Some(user)) = (
            self.token.get(),
            inner.refresh_token.clone(),
            inner.user.clone(),
        ) else {
            return;
        };
        let snapshot = PersistedSession {
            access_token: access,
            refresh_token: refresh,
            user,
        };
        // The persisted copy is only a cache; a failed write never fails the
        // live session.
        if let Err(err) = self.storage.save(&snapshot) {
            warn!(error = %err, "failed to persist session");
        }
    }

    /// Spawns the recurring silent-refresh task. The returned guard cancels
    /// the task when dropped, so tearing down the owner never leaks the
    /// timer.
    pub fn spawn_refresh_loop(self: &Arc<Self>) -> RefreshGuard {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            // The first tick of a tokio interval fires immediately; the
            // protocol wants the first refresh one full period after login.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = interval.tick() => {
                        // Failure already forced a logout; the loop keeps
                        // running and becomes a no-op without a refresh token.
                        let _ = manager.refresh_once().await;
                    }
                }
            }
        });
        RefreshGuard {
            cancel,
            _handle: handle,
        }
    }
}

/// Handle to the background refresh task.
pub struct RefreshGuard {
    cancel: CancellationToken,
    _handle: tokio::task::JoinHandle<()>,
}

impl RefreshGuard {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
