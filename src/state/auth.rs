// Session container
// Mirrors the credential store in memory so the UI can ask "who is signed
// in" without touching storage on every render.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ActionResult, InFlight};
use crate::auth::{AuthService, CredentialStore, Profile};

#[derive(Default)]
struct Session {
    profile: Option<Profile>,
    error: Option<String>,
}

pub struct AuthState {
    service: AuthService,
    credentials: Arc<dyn CredentialStore>,
    session: RwLock<Session>,
    in_flight: AtomicUsize,
    closed: AtomicBool,
}

impl AuthState {
    /// Build the container from whatever session the store already holds
    ///
    /// Token and profile must both be present; the token is trusted as-is
    /// and no network call is made.
    pub fn restore(service: AuthService, credentials: Arc<dyn CredentialStore>) -> Self {
        let profile = stored_session(credentials.as_ref());
        match &profile {
            Some(p) => tracing::info!(login = %p.login, "Restored session"),
            None => tracing::debug!("No stored session"),
        }

        Self {
            service,
            credentials,
            session: RwLock::new(Session {
                profile,
                ..Session::default()
            }),
            in_flight: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.profile.is_some()
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.session.read().await.profile.clone()
    }

    pub async fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.session.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.session.write().await.error = None;
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Log in; the service persists the token before this resolves
    pub async fn login(&self, login: &str, password: &str) -> ActionResult<Profile> {
        let _loading = InFlight::enter(&self.in_flight);
        self.begin().await;
        let result = self.service.login(login, password).await;
        self.finish(result).await
    }

    /// Create the account, then log straight in with the same credentials
    pub async fn register(&self, login: &str, password: &str) -> ActionResult<Profile> {
        let _loading = InFlight::enter(&self.in_flight);
        self.begin().await;
        let result = match self.service.register(login, password).await {
            Ok(_) => self.service.login(login, password).await,
            Err(e) => Err(e),
        };
        self.finish(result).await
    }

    /// Drop the session; storage failures are logged, never surfaced
    pub async fn logout(&self) {
        if let Err(e) = self.credentials.clear() {
            tracing::error!(error = %e, "Failed to clear stored credentials on logout");
        }

        let mut session = self.session.write().await;
        session.profile = None;
        session.error = None;
        tracing::info!("Logged out");
    }

    /// Re-read the store and forget the session if it was cleared
    /// underneath us (the HTTP client does this on a 401)
    ///
    /// Returns whether a session is still held.
    pub async fn sync_with_store(&self) -> bool {
        if stored_session(self.credentials.as_ref()).is_some() {
            return self.is_authenticated().await;
        }

        let mut session = self.session.write().await;
        if session.profile.take().is_some() {
            tracing::info!("Stored credentials are gone, session ended");
        }
        false
    }

    async fn begin(&self) {
        self.session.write().await.error = None;
    }

    async fn finish(&self, result: crate::error::Result<Profile>) -> ActionResult<Profile> {
        let mut session = self.session.write().await;
        if self.closed.load(Ordering::SeqCst) {
            return result.into();
        }

        match &result {
            Ok(profile) => session.profile = Some(profile.clone()),
            Err(e) => session.error = Some(e.to_string()),
        }
        result.into()
    }
}

fn stored_session(credentials: &dyn CredentialStore) -> Option<Profile> {
    let token = match credentials.token() {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored token");
            None
        }
    };
    let profile = match credentials.profile() {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored profile");
            None
        }
    };

    match (token, profile) {
        (Some(_), Some(profile)) => Some(profile),
        _ => None,
    }
}
