//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the session core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other members depend on. It
//! establishes the logging conventions, the fail-fast configuration contract,
//! and the event broadcasting mechanism used to make session and navigation
//! transitions observable.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
