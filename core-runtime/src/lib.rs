//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the LeafGuard client core:
//! - Logging and tracing bootstrap
//! - Configuration management with fail-fast capability validation
//! - Event bus for session lifecycle notifications
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other core crates depend
//! on. It establishes the logging conventions and event broadcasting
//! mechanism used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
