//! # External Client Traits
//!
//! Contracts for the external services the session core depends on. The core
//! never talks to an identity backend or a profile database directly; it only
//! sees the traits defined here, implemented by a host-specific adapter.
//!
//! ## Overview
//!
//! This crate defines the seam between the session/authorization core and the
//! services it treats as opaque collaborators:
//!
//! - [`IdentityProvider`](identity::IdentityProvider): session retrieval,
//!   credential sign-in, sign-out, and an ordered change-notification
//!   subscription
//! - [`ProfileStore`](profile::ProfileStore): single-row profile lookup
//!   keyed by user id
//!
//! Plus the wire-level types those services exchange: [`UserId`],
//! [`Session`], [`SessionChange`], and [`ProfileRecord`].
//!
//! ## Error Handling
//!
//! All client traits use [`BridgeError`](error::BridgeError) for consistent
//! error handling. Adapter implementations should:
//!
//! - Convert backend-specific errors to `BridgeError`
//! - Preserve the backend's human-readable message for credential failures
//!   (the core surfaces it to callers unchanged)
//! - Report a *missing* profile row as `Ok(None)`, never as an error
//!
//! ## Thread Safety
//!
//! All client traits require `Send + Sync` bounds so they can be shared as
//! `Arc<dyn Trait>` across async tasks.

pub mod error;
pub mod identity;
pub mod profile;

pub use error::{BridgeError, Result};
pub use identity::{IdentityProvider, Session, SessionChange, UserId};
pub use profile::{ProfileRecord, ProfileStore};
