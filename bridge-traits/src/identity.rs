//! Identity Provider Abstraction
//!
//! Defines the contract with the external identity backend: who is signed in,
//! credential sign-in/out, and the change-notification subscription that
//! drives the session synchronization loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;

/// Opaque stable identifier for an authenticated principal.
///
/// Unique per principal as reported by the identity provider. The core never
/// interprets the value; it only compares it for equality when deciding
/// whether asynchronous results still apply to the current identity.
///
/// # Examples
///
/// ```
/// use bridge_traits::UserId;
///
/// let user_id = UserId::new();
///
/// let id_str = "550e8400-e29b-41d4-a716-446655440000";
/// let parsed = UserId::from_string(id_str).unwrap();
/// assert_eq!(parsed.to_string(), id_str);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from its string representation.
    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The provider-confirmed fact that a principal is currently signed in.
///
/// Created or replaced whenever the identity provider reports a session;
/// absent when unauthenticated. The session core owns the only authoritative
/// copy of this value; readers go through the session state, never through
/// a cached clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated principal.
    pub user_id: UserId,
    /// When the provider expects the session's token to expire, if reported.
    /// Carried opaquely for host display; refresh is the provider's concern.
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Session {
    /// Create a session for the given user with no expiry information.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            expires_at: None,
        }
    }
}

/// A session lifecycle transition reported by the identity provider.
///
/// Fired whenever the underlying session is established, refreshed, or
/// cleared, on the provider's own timeline. Subscribers must apply changes in
/// the order they are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SessionChange {
    /// A session was established (initial sign-in or cross-tab sign-in).
    SignedIn(Session),
    /// The session's token was refreshed; the identity is unchanged but the
    /// session payload (e.g. expiry) may differ.
    TokenRefreshed(Session),
    /// The session was cleared.
    SignedOut,
}

impl SessionChange {
    /// The session carried by this change, if any.
    ///
    /// `None` exactly when the change reports a cleared session.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionChange::SignedIn(session) | SessionChange::TokenRefreshed(session) => {
                Some(session)
            }
            SessionChange::SignedOut => None,
        }
    }
}

/// Identity provider client.
///
/// Abstracts the external identity backend (hosted auth service, test
/// double). The core treats it as an opaque service: it never validates
/// credentials or refreshes tokens itself.
///
/// # Contract
///
/// - `get_session` returns the *current* session as the provider knows it;
///   `Ok(None)` when unauthenticated.
/// - `sign_in_with_password` returns the established session on success and
///   `BridgeError::InvalidCredentials` with the backend's message on a
///   rejected credential pair.
/// - `subscribe` returns an independent receiver delivering every subsequent
///   [`SessionChange`] in observation order. No ordering guarantee exists
///   between delivered changes and concurrently in-flight `get_session`
///   calls; consumers apply whichever update they observe last per identity.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::IdentityProvider;
///
/// async fn who_is_signed_in(provider: &dyn IdentityProvider) {
///     match provider.get_session().await {
///         Ok(Some(session)) => println!("signed in as {}", session.user_id),
///         Ok(None) => println!("not signed in"),
///         Err(err) => println!("provider unreachable: {err}"),
///     }
/// }
/// ```
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Retrieve the current session, or `None` when unauthenticated.
    async fn get_session(&self) -> Result<Option<Session>>;

    /// Attempt a credential sign-in.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Sign out the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to session lifecycle changes.
    ///
    /// Each call creates an independent receiver; past changes are not
    /// replayed.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}
