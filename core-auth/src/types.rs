//! Session and credential types for the auth orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_api::UserProfile;

/// Sentinel token carried by offline sessions. It is never sent to the
/// server as a real bearer credential.
pub const OFFLINE_TOKEN: &str = "offline_token";

/// Built-in always-available account: email.
pub const DEFAULT_ACCOUNT_EMAIL: &str = "user@leafguard.com";

/// Built-in always-available account: password.
pub const DEFAULT_ACCOUNT_PASSWORD: &str = "password";

/// The fixed profile used when signing in with the built-in account.
pub fn default_account_profile() -> UserProfile {
    UserProfile {
        id: "offline_user".to_string(),
        name: "Default User".to_string(),
        email: DEFAULT_ACCOUNT_EMAIL.to_string(),
        role: "user".to_string(),
        is_subscribed: false,
        remaining_free_scans: 3,
    }
}

/// How a session was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    /// Token was issued by the server during this app run.
    Online,
    /// Session came from the built-in account or the cached offline pair.
    Offline,
}

/// An established user session.
///
/// Invariant: `token` and `profile` are always both present. Offline
/// sessions carry the [`OFFLINE_TOKEN`] sentinel instead of a server-issued
/// bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub profile: UserProfile,
    pub token: String,
    pub kind: SessionKind,
}

impl Session {
    pub fn online(profile: UserProfile, token: String) -> Self {
        Self {
            profile,
            token,
            kind: SessionKind::Online,
        }
    }

    pub fn offline(profile: UserProfile) -> Self {
        Self {
            profile,
            token: OFFLINE_TOKEN.to_string(),
            kind: SessionKind::Offline,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.kind == SessionKind::Offline
    }
}

// The token must never leak through Debug output.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("profile", &self.profile)
            .field("token", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Credentials remembered after a successful online login, authorizing a
/// later offline login with the same pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineCredentials {
    pub email: String,
    pub password: String,
}

impl OfflineCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Whether the given pair matches the remembered one.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

// Never expose the password through Debug output.
impl fmt::Debug for OfflineCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authentication state of the orchestrator.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> SigningIn -> SignedIn
///                  |
///                  +------> SignedInOffline
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    /// No session exists
    #[default]
    SignedOut,
    /// A login or registration attempt is in flight
    SigningIn,
    /// Authenticated against the server
    SignedIn,
    /// Authenticated through an offline fallback path
    SignedInOffline,
}

impl AuthState {
    /// Whether a session exists (online or offline).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn | AuthState::SignedInOffline)
    }

    /// Whether a sign-in attempt is in flight.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AuthState::SigningIn)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::SigningIn => write!(f, "Signing In..."),
            AuthState::SignedIn => write!(f, "Signed In"),
            AuthState::SignedInOffline => write!(f, "Signed In (Offline)"),
        }
    }
}
