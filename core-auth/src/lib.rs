//! # Authentication Module
//!
//! Login, registration and session lifecycle for the LeafGuard client core,
//! with a deterministic offline fallback policy.
//!
//! ## Overview
//!
//! - [`AuthManager`] - the orchestrator state machine
//! - [`CredentialCache`] - persisted token / profile / offline pair
//! - [`Session`] / [`AuthState`] - session model
//!
//! ## Features
//!
//! - Built-in always-available default account (offline demo path)
//! - Offline login with credentials remembered from a successful online
//!   login
//! - Coarse credential persistence via platform secure stores
//! - Auth state event emission

pub mod cache;
pub mod error;
pub mod manager;
pub mod types;

pub use cache::CredentialCache;
pub use error::{AuthError, Result};
pub use manager::AuthManager;
pub use types::{
    default_account_profile, AuthState, OfflineCredentials, Session, SessionKind,
    DEFAULT_ACCOUNT_EMAIL, DEFAULT_ACCOUNT_PASSWORD, OFFLINE_TOKEN,
};
