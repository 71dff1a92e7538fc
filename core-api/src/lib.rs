//! # LeafGuard API Access Layer
//!
//! Typed client for the LeafGuard backend with the cross-cutting policy
//! every call shares: bearer attachment, bounded retry with a fixed delay,
//! and classification of every failure into one [`ApiError`] variant.
//!
//! ## Overview
//!
//! - [`ApiClient`] - the shared client; construct once, inject everywhere
//! - [`TokenProvider`] - read/invalidate seam to the credential cache
//! - [`ApiError`] - the classified failure taxonomy
//! - [`RequestContext`] - immutable per-call retry state
//!
//! Transport is abstracted behind `bridge_traits::HttpClient`, so the same
//! client runs over reqwest on desktop or a platform-native HTTP stack on
//! mobile.

pub mod client;
pub mod error;
pub mod multipart;
pub mod request;
pub mod types;

pub use client::{
    ApiClient, ApiClientConfig, NoTokens, TokenProvider, DEFAULT_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{ApiError, Result};
pub use request::{RequestContext, MAX_RETRIES, RETRY_DELAY};
pub use types::{
    AuthSession, CancellationSummary, DetectionResult, DiseaseInfo, NewScan, ProfileUpdate,
    SavedScan, SubscriptionPlan, SubscriptionStatus, SubscriptionUpdate, UserProfile,
};
