//! # Authentication Manager
//!
//! Orchestrates the login/registration/session lifecycle over the API
//! client, the credential cache and the network monitor.
//!
//! ## Login policy
//!
//! `login` walks a fixed decision ladder:
//!
//! 1. the built-in default account signs in offline, bypassing the network
//!    entirely
//! 2. a pair matching the remembered offline credentials signs in offline
//!    with the cached profile
//! 3. without connectivity, anything else fails as `NoConnectivity`
//! 4. otherwise the online call runs; only a successful online login
//!    persists the token, the profile and the offline pair
//!
//! A rejected online login (`InvalidCredentials`, `AccountNotFound`) is
//! surfaced as-is; there is no silent fallback to offline credentials.
//!
//! Registration, password reset, profile and subscription mutations have no
//! offline path; they require connectivity and surface the classified API
//! error. The orchestrator is the sole writer of the cached
//! token/profile/offline-pair triplet; the API client only reads the token
//! and clears it on 401.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::AuthManager;
//! use core_runtime::events::EventBus;
//! use core_runtime::CoreConfig;
//! # async fn example(config: CoreConfig) -> core_auth::Result<()> {
//! let events = EventBus::new(100);
//! let manager = AuthManager::from_config(&config, events).expect("config");
//!
//! let session = manager.login("ada@leafguard.com", "secret123").await?;
//! println!("remaining scans: {}", session.profile.remaining_free_scans);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use bridge_traits::network::NetworkMonitor;
use core_api::{
    ApiClient, ApiClientConfig, ApiError, CancellationSummary, ProfileUpdate, UserProfile,
};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::CoreConfig;

use crate::cache::CredentialCache;
use crate::error::{AuthError, Result};
use crate::types::{
    default_account_profile, AuthState, OfflineCredentials, Session, DEFAULT_ACCOUNT_EMAIL,
    DEFAULT_ACCOUNT_PASSWORD,
};

/// Authentication orchestrator: login state machine with offline fallback.
pub struct AuthManager {
    api: Arc<ApiClient>,
    cache: Arc<CredentialCache>,
    network: Arc<dyn NetworkMonitor>,
    events: EventBus,
    state: RwLock<AuthState>,
    session: RwLock<Option<Session>>,
}

impl AuthManager {
    /// Create a manager from explicitly constructed parts.
    pub fn new(
        api: Arc<ApiClient>,
        cache: Arc<CredentialCache>,
        network: Arc<dyn NetworkMonitor>,
        events: EventBus,
    ) -> Self {
        Self {
            api,
            cache,
            network,
            events,
            state: RwLock::new(AuthState::SignedOut),
            session: RwLock::new(None),
        }
    }

    /// Wire a manager from a validated [`CoreConfig`].
    ///
    /// Builds the credential cache over the config's secure store and an
    /// [`ApiClient`] over its transport, with the cache as token source.
    pub fn from_config(config: &CoreConfig, events: EventBus) -> core_runtime::Result<Self> {
        let cache = Arc::new(CredentialCache::new(config.secure_store.clone()));
        let api = ApiClient::new(
            config.http_client.clone(),
            cache.clone(),
            ApiClientConfig {
                base_url: config.api_base_url.clone(),
                request_timeout: config.request_timeout,
                ..Default::default()
            },
        )
        .map_err(|e| core_runtime::Error::Config(e.to_string()))?;

        Ok(Self::new(
            Arc::new(api),
            cache,
            config.network_monitor.clone(),
            events,
        ))
    }

    /// The shared API client, for calls that bypass the orchestrator
    /// (detection, scan history, catalog).
    pub fn api(&self) -> Arc<ApiClient> {
        self.api.clone()
    }

    /// Current authentication state.
    pub async fn state(&self) -> AuthState {
        *self.state.read().await
    }

    /// The active session, if any.
    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Sign in with email and password.
    ///
    /// See the module docs for the full decision ladder.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SignInInProgress`] - another sign-in is in flight
    /// - [`AuthError::NoConnectivity`] - offline and not a known pair
    /// - [`AuthError::ServerConnectionFailed`] - connected but the server
    ///   never answered
    /// - [`AuthError::Api`] - the server rejected the credentials
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let prev_state = self.begin_sign_in().await?;

        let result = self.login_ladder(email, password).await;
        self.finish_sign_in(result, prev_state).await
    }

    async fn login_ladder(&self, email: &str, password: &str) -> Result<Session> {
        let connected = self.network.is_connected().await;

        // Built-in demo account: always available, zero network calls.
        if email == DEFAULT_ACCOUNT_EMAIL && password == DEFAULT_ACCOUNT_PASSWORD {
            info!("Signing in with the built-in account");
            return Ok(Session::offline(default_account_profile()));
        }

        // A pair that logged in online before unlocks the cached profile.
        if let Some(credentials) = self.readable_offline_credentials().await {
            if credentials.matches(email, password) {
                if let Some(profile) = self.readable_stored_profile().await {
                    info!(user_id = %profile.id, "Signing in offline with remembered credentials");
                    return Ok(Session::offline(profile));
                }
            }
        }

        if !connected {
            warn!("Login attempted without connectivity");
            return Err(AuthError::NoConnectivity);
        }

        let auth = self.api.login(email, password).await.map_err(|e| match e {
            // The monitor said connected, yet nothing answered.
            ApiError::NetworkUnreachable => AuthError::ServerConnectionFailed,
            other => AuthError::Api(other),
        })?;

        let token = auth.token.clone().ok_or_else(|| {
            AuthError::Api(ApiError::Unknown("login response missing token".to_string()))
        })?;

        // Persist only after the online call succeeded; the offline pair is
        // never written for a failed login.
        self.cache.store_session(&token, &auth.profile).await?;
        self.cache
            .store_offline_credentials(&OfflineCredentials::new(email, password))
            .await?;

        info!(user_id = %auth.profile.id, "Online login succeeded");
        Ok(Session::online(auth.profile, token))
    }

    /// Create an account and sign in.
    ///
    /// No offline path: registration requires connectivity. The offline
    /// credential pair is not written here; only a login refreshes it.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Session> {
        let prev_state = self.begin_sign_in().await?;

        let result = self.register_inner(name, email, password, role).await;
        self.finish_sign_in(result, prev_state).await
    }

    async fn register_inner(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Session> {
        if !self.network.is_connected().await {
            return Err(AuthError::NoConnectivity);
        }

        let auth = self.api.register(name, email, password, role).await?;
        let token = auth.token.clone().ok_or_else(|| {
            AuthError::Api(ApiError::Unknown(
                "register response missing token".to_string(),
            ))
        })?;

        self.cache.store_session(&token, &auth.profile).await?;

        info!(user_id = %auth.profile.id, "Registration succeeded");
        Ok(Session::online(auth.profile, token))
    }

    /// Request a password reset email. Requires connectivity.
    ///
    /// Whether the account exists is deliberately not revealed.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        if !self.network.is_connected().await {
            return Err(AuthError::NoConnectivity);
        }

        self.api.forgot_password(email).await?;
        Ok(())
    }

    /// End the session: clear token and cached profile.
    ///
    /// The offline credential pair is deliberately kept, so the next login
    /// with the remembered pair still works offline.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.cache.clear_session().await?;

        let user_id = self
            .session
            .write()
            .await
            .take()
            .map(|s| s.profile.id)
            .unwrap_or_default();
        *self.state.write().await = AuthState::SignedOut;

        let _ = self
            .events
            .emit(CoreEvent::Auth(AuthEvent::SignedOut { user_id }));

        info!("Signed out");
        Ok(())
    }

    /// Rehydrate a session from the cache without touching the network.
    ///
    /// Returns `None` when no complete session (token and profile) is
    /// stored.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<Session>> {
        let token = match self.cache.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Unreadable stored token, starting signed out");
                None
            }
        };
        let profile = match self.cache.stored_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Unreadable stored profile, starting signed out");
                None
            }
        };

        match (token, profile) {
            (Some(token), Some(profile)) => {
                let session = Session::online(profile, token);
                *self.session.write().await = Some(session.clone());
                *self.state.write().await = AuthState::SignedIn;
                info!(user_id = %session.profile.id, "Session restored from cache");
                Ok(Some(session))
            }
            _ => Ok(None),
        }
    }

    /// Record the server-reported remaining scan count after a detection.
    ///
    /// Local-only: mutates the in-memory session and the cached profile,
    /// never the network.
    #[instrument(skip(self))]
    pub async fn update_remaining_scans(&self, remaining: u32) -> Result<UserProfile> {
        let profile = {
            let mut session = self.session.write().await;
            let session = session.as_mut().ok_or(AuthError::NotAuthenticated)?;
            session.profile.remaining_free_scans = remaining;
            session.profile.clone()
        };

        self.cache.store_profile(&profile).await?;

        let _ = self
            .events
            .emit(CoreEvent::Auth(AuthEvent::ScansUpdated { remaining }));
        Ok(profile)
    }

    /// Subscribe to a plan and absorb the server's updated profile.
    /// Requires connectivity.
    #[instrument(skip(self, payment_id))]
    pub async fn subscribe(&self, plan_id: &str, payment_id: &str) -> Result<UserProfile> {
        if !self.network.is_connected().await {
            return Err(AuthError::NoConnectivity);
        }

        let update = self.api.subscribe(plan_id, payment_id).await?;
        self.apply_profile(update.user).await
    }

    /// Cancel the active subscription and absorb the new state. Requires
    /// connectivity.
    #[instrument(skip(self))]
    pub async fn cancel_subscription(&self) -> Result<CancellationSummary> {
        if !self.network.is_connected().await {
            return Err(AuthError::NoConnectivity);
        }

        let summary = self.api.cancel_subscription().await?;

        let updated = {
            let mut session = self.session.write().await;
            session.as_mut().map(|session| {
                session.profile.is_subscribed = summary.is_subscribed;
                session.profile.remaining_free_scans = summary.remaining_free_scans;
                session.profile.clone()
            })
        };
        if let Some(profile) = updated {
            self.cache.store_profile(&profile).await?;
        }

        Ok(summary)
    }

    /// Update name/email/password server-side and absorb the result.
    /// Requires connectivity.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        if !self.network.is_connected().await {
            return Err(AuthError::NoConnectivity);
        }

        let profile = self.api.update_user_profile(update).await?;
        self.apply_profile(profile).await
    }

    /// Re-fetch the profile from the server and absorb it. Requires
    /// connectivity.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<UserProfile> {
        if !self.network.is_connected().await {
            return Err(AuthError::NoConnectivity);
        }

        let profile = self.api.user_profile().await?;
        self.apply_profile(profile).await
    }

    // ---- helpers ----------------------------------------------------------

    async fn begin_sign_in(&self) -> Result<AuthState> {
        let mut state = self.state.write().await;
        if state.is_in_progress() {
            warn!("Sign-in already in progress");
            return Err(AuthError::SignInInProgress);
        }
        let prev = *state;
        *state = AuthState::SigningIn;
        drop(state);

        let _ = self.events.emit(CoreEvent::Auth(AuthEvent::SigningIn));
        Ok(prev)
    }

    async fn finish_sign_in(
        &self,
        result: Result<Session>,
        prev_state: AuthState,
    ) -> Result<Session> {
        match result {
            Ok(session) => {
                let new_state = if session.is_offline() {
                    AuthState::SignedInOffline
                } else {
                    AuthState::SignedIn
                };
                *self.state.write().await = new_state;
                *self.session.write().await = Some(session.clone());

                let _ = self.events.emit(CoreEvent::Auth(AuthEvent::SignedIn {
                    user_id: session.profile.id.clone(),
                    offline: session.is_offline(),
                }));
                Ok(session)
            }
            Err(e) => {
                // A failed attempt never disturbs an existing session.
                *self.state.write().await = prev_state;

                let _ = self.events.emit(CoreEvent::Auth(AuthEvent::AuthError {
                    message: e.to_string(),
                    recoverable: e.is_recoverable(),
                }));
                Err(e)
            }
        }
    }

    async fn apply_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        {
            let mut session = self.session.write().await;
            if let Some(session) = session.as_mut() {
                session.profile = profile.clone();
            }
        }
        self.cache.store_profile(&profile).await?;
        Ok(profile)
    }

    async fn readable_offline_credentials(&self) -> Option<OfflineCredentials> {
        match self.cache.offline_credentials().await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable offline credentials");
                None
            }
        }
    }

    async fn readable_stored_profile(&self) -> Option<UserProfile> {
        match self.cache.stored_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored profile");
                None
            }
        }
    }
}
