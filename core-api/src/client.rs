//! # LeafGuard API Client
//!
//! The single point of outbound communication with the LeafGuard backend.
//!
//! ## Overview
//!
//! `ApiClient` wraps the raw [`HttpClient`] transport with the policy every
//! call shares:
//!
//! 1. attach the current bearer token (read from the [`TokenProvider`] at
//!    dispatch time; absence is not an error, some endpoints are public)
//! 2. execute the transport call
//! 3. on 401, invalidate the cached token before anything else
//! 4. classify the outcome into one [`ApiError`]
//! 5. retry only no-response failures and 5xx, up to [`MAX_RETRIES`]
//!    additional attempts with a fixed [`RETRY_DELAY`] between them
//!
//! The steps run in that fixed order around the transport call; retry state
//! is an immutable [`RequestContext`] value advanced by the loop. There is
//! no shared mutable request object and no interceptor chain.
//!
//! The client is constructed explicitly and shared by reference:
//!
//! ```ignore
//! use core_api::{ApiClient, ApiClientConfig, NoTokens};
//! use std::sync::Arc;
//!
//! let client = Arc::new(ApiClient::new(
//!     transport,
//!     Arc::new(NoTokens),
//!     ApiClientConfig::default(),
//! )?);
//! let healthy = client.health_check().await;
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

use crate::error::{classify_response, ApiError, Result};
use crate::multipart;
use crate::request::{RequestContext, MAX_RETRIES, RETRY_DELAY};
use crate::types::{
    AuthSession, CancelEnvelope, CancellationSummary, DetectionResult, DiseaseInfo, Envelope,
    NewScan, ProfileUpdate, SavedScan, SubscriptionPlan, SubscriptionStatus, SubscriptionUpdate,
    UserProfile,
};

/// Compiled-in default backend endpoint.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the bearer token attached to outgoing requests.
///
/// The client only ever reads the token and clears it on a 401; all other
/// writes belong to the auth orchestrator.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The currently cached token, if any.
    async fn token(&self) -> Option<String>;

    /// Drop the cached token. Called on every 401 response.
    async fn invalidate(&self);
}

/// Token source for clients that never authenticate (public endpoints,
/// tests).
pub struct NoTokens;

#[async_trait]
impl TokenProvider for NoTokens {
    async fn token(&self) -> Option<String> {
        None
    }

    async fn invalidate(&self) {}
}

/// Client construction settings.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Initial base URL; `None` uses [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    /// Per-request timeout handed to the transport.
    pub request_timeout: Duration,
    /// Retry budget per call (additional attempts after the first).
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
        }
    }
}

/// Typed client for the LeafGuard backend.
pub struct ApiClient {
    transport: Arc<dyn HttpClient>,
    tokens: Arc<dyn TokenProvider>,
    base_url: RwLock<String>,
    request_timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeRequest<'a> {
    plan_id: &'a str,
    payment_id: &'a str,
}

impl ApiClient {
    /// Create a client over the given transport and token source.
    ///
    /// # Errors
    ///
    /// Fails when `config.base_url` is not a valid URL.
    pub fn new(
        transport: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenProvider>,
        config: ApiClientConfig,
    ) -> Result<Self> {
        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_base_url(&base_url)?;

        Ok(Self {
            transport,
            tokens,
            base_url: RwLock::new(base_url.trim_end_matches('/').to_string()),
            request_timeout: config.request_timeout,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// The base URL used for subsequent calls.
    pub fn base_url(&self) -> String {
        self.base_url.read().expect("base_url lock poisoned").clone()
    }

    /// Point the client at a different deployment.
    ///
    /// Takes effect for subsequent calls only; in-flight requests keep the
    /// URL they were dispatched with.
    pub fn update_base_url(&self, url: &str) -> Result<()> {
        validate_base_url(url)?;
        *self.base_url.write().expect("base_url lock poisoned") = url.trim_end_matches('/').to_string();
        debug!(base_url = url, "Base URL updated");
        Ok(())
    }

    /// Restore the compiled-in default base URL.
    pub fn reset_base_url(&self) {
        *self.base_url.write().expect("base_url lock poisoned") = DEFAULT_BASE_URL.to_string();
        debug!("Base URL reset to default");
    }

    // ---- typed operations -------------------------------------------------

    /// Liveness probe. Never errors; any failure reads as "offline".
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> bool {
        let request = self.get("/health");
        match self.dispatch(request, self.context("/health")).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// Authenticate with email and password.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = self.post_json("/auth/login", &LoginRequest { email, password })?;
        let response = self
            .dispatch(request, self.context("/auth/login"))
            .await
            .map_err(|e| match e {
                // On this endpoint a 401 means the credentials, not the
                // session, were rejected.
                ApiError::SessionExpired => ApiError::InvalidCredentials,
                ApiError::NotFound(_) => ApiError::AccountNotFound,
                other => other,
            })?;

        let session: AuthSession = decode(&response)?;
        if session.token.is_none() {
            return Err(ApiError::Unknown("login response missing token".to_string()));
        }
        Ok(session)
    }

    /// Create an account and authenticate in one step.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<AuthSession> {
        let request = self.post_json(
            "/auth/register",
            &RegisterRequest {
                name,
                email,
                password,
                role,
            },
        )?;
        let response = self
            .dispatch(request, self.context("/auth/register"))
            .await
            .map_err(|e| match e {
                ApiError::Validation { status: 409, .. } => ApiError::EmailAlreadyExists,
                ApiError::Validation {
                    status: 400,
                    message,
                } => {
                    if message.to_lowercase().contains("already exists") {
                        ApiError::EmailAlreadyExists
                    } else {
                        ApiError::InvalidInput(message)
                    }
                }
                other => other,
            })?;

        let session: AuthSession = decode(&response)?;
        if session.token.is_none() {
            return Err(ApiError::Unknown(
                "register response missing token".to_string(),
            ));
        }
        Ok(session)
    }

    /// Request a password reset email.
    ///
    /// Account existence is deliberately not revealed: a 404 reads the same
    /// as success.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = self.post_json("/auth/forgot-password", &ForgotPasswordRequest { email })?;
        match self
            .dispatch(request, self.context("/auth/forgot-password"))
            .await
        {
            Ok(_) => Ok(()),
            Err(ApiError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Submit a plant image for disease identification.
    ///
    /// A 403 means the free scan quota is exhausted and surfaces as
    /// [`ApiError::InsufficientScans`].
    #[instrument(skip(self, image), fields(image_len = image.len()))]
    pub async fn detect_disease(&self, image: Bytes) -> Result<DetectionResult> {
        if image.is_empty() {
            return Err(ApiError::InvalidInput("image payload is empty".to_string()));
        }

        let part = multipart::file_part("image", "plant.jpg", "image/jpeg", &image);
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint_url("/plants/predict"))
            .header("Content-Type", part.content_type)
            .body(part.body)
            .timeout(self.request_timeout);

        let response = self
            .dispatch(request, self.context("/plants/predict"))
            .await
            .map_err(|e| match e {
                ApiError::Validation { status: 403, .. } => ApiError::InsufficientScans,
                other => other,
            })?;

        let envelope: Envelope<DetectionResult> = decode(&response)?;
        Ok(envelope.data)
    }

    /// Save a detection to the user's scan history.
    #[instrument(skip(self, scan))]
    pub async fn save_scan(&self, scan: &NewScan) -> Result<SavedScan> {
        let request = self.post_json("/plants/scans", scan)?;
        let response = self.dispatch(request, self.context("/plants/scans")).await?;
        decode(&response)
    }

    /// List the user's recent scans.
    #[instrument(skip(self))]
    pub async fn recent_scans(&self) -> Result<Vec<SavedScan>> {
        let request = self.get("/plants/scans");
        let response = self.dispatch(request, self.context("/plants/scans")).await?;
        let envelope: Envelope<Vec<SavedScan>> = decode(&response)?;
        Ok(envelope.data)
    }

    /// Fetch the static disease catalog.
    #[instrument(skip(self))]
    pub async fn diseases(&self) -> Result<Vec<DiseaseInfo>> {
        let request = self.get("/plants/diseases");
        let response = self
            .dispatch(request, self.context("/plants/diseases"))
            .await?;
        let envelope: Envelope<Vec<DiseaseInfo>> = decode(&response)?;
        Ok(envelope.data)
    }

    /// List the available subscription plans.
    #[instrument(skip(self))]
    pub async fn subscription_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let request = self.get("/subscriptions/plans");
        let response = self
            .dispatch(request, self.context("/subscriptions/plans"))
            .await?;
        let envelope: Envelope<Vec<SubscriptionPlan>> = decode(&response)?;
        Ok(envelope.data)
    }

    /// Subscribe the authenticated user to a plan.
    #[instrument(skip(self, payment_id))]
    pub async fn subscribe(&self, plan_id: &str, payment_id: &str) -> Result<SubscriptionUpdate> {
        let request = self.post_json(
            "/subscriptions/subscribe",
            &SubscribeRequest {
                plan_id,
                payment_id,
            },
        )?;
        let response = self
            .dispatch(request, self.context("/subscriptions/subscribe"))
            .await?;
        let envelope: Envelope<SubscriptionUpdate> = decode(&response)?;
        Ok(envelope.data)
    }

    /// Fetch the current subscription state.
    #[instrument(skip(self))]
    pub async fn subscription_status(&self) -> Result<SubscriptionStatus> {
        let request = self.get("/subscriptions/status");
        let response = self
            .dispatch(request, self.context("/subscriptions/status"))
            .await?;
        let envelope: Envelope<SubscriptionStatus> = decode(&response)?;
        Ok(envelope.data)
    }

    /// Cancel the active subscription.
    #[instrument(skip(self))]
    pub async fn cancel_subscription(&self) -> Result<CancellationSummary> {
        let request = HttpRequest::new(
            HttpMethod::Post,
            self.endpoint_url("/subscriptions/cancel"),
        )
        .timeout(self.request_timeout);
        let response = self
            .dispatch(request, self.context("/subscriptions/cancel"))
            .await?;
        let envelope: CancelEnvelope = decode(&response)?;
        Ok(CancellationSummary {
            message: envelope.message,
            is_subscribed: envelope.data.is_subscribed,
            remaining_free_scans: envelope.data.remaining_free_scans,
        })
    }

    /// Fetch the authenticated user's profile.
    #[instrument(skip(self))]
    pub async fn user_profile(&self) -> Result<UserProfile> {
        let request = self.get("/users");
        let response = self.dispatch(request, self.context("/users")).await?;
        decode(&response)
    }

    /// Update the authenticated user's profile.
    #[instrument(skip(self, update))]
    pub async fn update_user_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let request = self.put_json("/users", update)?;
        let response = self.dispatch(request, self.context("/users")).await?;
        decode(&response)
    }

    /// Full scan history for the authenticated user.
    #[instrument(skip(self))]
    pub async fn user_scans(&self) -> Result<Vec<SavedScan>> {
        let request = self.get("/users/scans");
        let response = self.dispatch(request, self.context("/users/scans")).await?;
        let envelope: Envelope<Vec<SavedScan>> = decode(&response)?;
        Ok(envelope.data)
    }

    // ---- dispatch pipeline ------------------------------------------------

    fn context(&self, endpoint: &'static str) -> RequestContext {
        RequestContext::new(endpoint, self.max_retries)
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.endpoint_url(path)).timeout(self.request_timeout)
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest> {
        HttpRequest::new(HttpMethod::Post, self.endpoint_url(path))
            .json(body)
            .map(|r| r.timeout(self.request_timeout))
            .map_err(|e| ApiError::Unknown(e.to_string()))
    }

    fn put_json<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest> {
        HttpRequest::new(HttpMethod::Put, self.endpoint_url(path))
            .json(body)
            .map(|r| r.timeout(self.request_timeout))
            .map_err(|e| ApiError::Unknown(e.to_string()))
    }

    /// Run one call through the shared pipeline.
    ///
    /// Returns the response only on 2xx; every other outcome is classified.
    async fn dispatch(&self, request: HttpRequest, ctx: RequestContext) -> Result<HttpResponse> {
        let mut ctx = ctx;

        loop {
            let attempt_request = attach_auth(request.clone(), self.tokens.token().await);

            match self.transport.execute(attempt_request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    // The 401 side effect applies to every endpoint.
                    if response.status == 401 {
                        self.tokens.invalidate().await;
                    }

                    let error = classify_response(&response);
                    if error.is_retryable() && ctx.can_retry() {
                        warn!(
                            endpoint = ctx.endpoint,
                            status = response.status,
                            attempt = ctx.attempt + 1,
                            "Server error, retrying"
                        );
                        ctx = ctx.next_attempt();
                        sleep(self.retry_delay).await;
                        continue;
                    }
                    return Err(error);
                }
                Err(e) if e.is_transport() => {
                    if ctx.can_retry() {
                        warn!(
                            endpoint = ctx.endpoint,
                            error = %e,
                            attempt = ctx.attempt + 1,
                            "No response, retrying"
                        );
                        ctx = ctx.next_attempt();
                        sleep(self.retry_delay).await;
                        continue;
                    }
                    return Err(ApiError::NetworkUnreachable);
                }
                Err(e) => return Err(ApiError::Unknown(e.to_string())),
            }
        }
    }
}

/// Attach the bearer token, when one is cached, to a request attempt.
fn attach_auth(request: HttpRequest, token: Option<String>) -> HttpRequest {
    match token {
        Some(token) => request.bearer_token(token),
        None => request,
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    response
        .json()
        .map_err(|e| ApiError::Unknown(e.to_string()))
}

fn validate_base_url(url: &str) -> Result<()> {
    Url::parse(url).map_err(|e| ApiError::InvalidInput(format!("invalid base URL: {}", e)))?;
    Ok(())
}
