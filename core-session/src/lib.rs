//! # Session Module
//!
//! Process-wide, reactive view of "who is currently signed in and what role
//! they hold", kept synchronized with the external identity provider's
//! session lifecycle.
//!
//! ## Overview
//!
//! This crate holds the two core pieces of the authentication layer:
//!
//! - [`SessionState`](state::SessionState): the single authoritative,
//!   observable record of `{user_id, profile, loading}`. Updated by the
//!   initial session load, by provider change notifications, and by the
//!   facade's sign-in/out operations; observed by everything else through a
//!   watch channel (push-based, no polling).
//! - [`AuthFacade`](facade::AuthFacade): the public sign-in, sign-out, and
//!   status-query surface composing with `SessionState`.
//!
//! ## Correctness properties
//!
//! - A profile is present only while a session is present, and always for the
//!   same user id (a profile fetch started under a since-superseded identity
//!   is discarded, never applied).
//! - Session retrieval failures are treated as "no session", never fail-open
//!   to an authenticated state.
//! - Clearing the session clears the profile in the same update step; there
//!   is no observable window where a stale privilege lingers.

pub mod error;
pub mod facade;
pub mod state;
#[cfg(test)]
mod test_util;
pub mod types;

pub use error::{AuthError, Result};
pub use facade::AuthFacade;
pub use state::SessionState;
pub use types::{Profile, SessionSnapshot, ADMIN_ROLE};
