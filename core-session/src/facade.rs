//! Auth Facade
//!
//! The public sign-in, sign-out, and status-query surface. Wraps the identity
//! provider client and composes with [`SessionState`]: successful operations
//! run the same session-apply-then-profile-fetch sequence the synchronization
//! engine uses, failed ones leave the state untouched and return the error to
//! the caller instead of throwing it into global state.

use bridge_traits::error::BridgeError;
use bridge_traits::{Session, UserId};
use core_runtime::events::{AuthEvent, CoreEvent};
use tracing::{info, instrument, warn};

use crate::error::{AuthError, Result};
use crate::state::SessionState;
use crate::types::SessionSnapshot;

/// Public authentication operations over a [`SessionState`] handle.
///
/// Cheap to clone; all clones act on the same state.
///
/// # Example
///
/// ```ignore
/// let auth = AuthFacade::new(state.clone());
///
/// match auth.sign_in("member@example.com", "secret").await {
///     Ok(session) => {
///         // The profile fetch was attempted before sign_in returned,
///         // so the role is readable synchronously here.
///         println!("admin: {}", auth.is_admin());
///     }
///     Err(err) => eprintln!("sign-in rejected: {err}"),
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AuthFacade {
    state: SessionState,
}

impl AuthFacade {
    /// Creates a facade over the given session state handle.
    pub fn new(state: SessionState) -> Self {
        Self { state }
    }

    /// Attempts a credential sign-in.
    ///
    /// On success the session is applied and the profile fetch is *attempted*
    /// (success or failure) before this returns, so the caller can read an
    /// up-to-date role synchronously afterwards. On failure the session state
    /// is left unchanged and the provider's error message is returned
    /// unchanged.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .state
            .identity()
            .sign_in_with_password(email, password)
            .await
            .map_err(|err| {
                warn!(error = %err, "sign-in rejected");
                match err {
                    BridgeError::InvalidCredentials { message } => {
                        AuthError::Credentials { message }
                    }
                    other => AuthError::SessionRetrieval(other.to_string()),
                }
            })?;

        info!(user_id = %session.user_id, "sign-in succeeded");
        let _ = self.state.events().emit(CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: session.user_id.to_string(),
        }));

        // Runs the apply-session-then-fetch-profile sequence; a failed fetch
        // is observable on the event bus but does not fail the sign-in.
        self.state.apply_session(Some(session.clone())).await;

        Ok(session)
    }

    /// Signs out the current principal.
    ///
    /// On success both user id and profile are cleared synchronously; the
    /// caller never observes a window where a signed-out user still appears
    /// authenticated. On failure the state is left unchanged.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let prior = self.state.snapshot().user_id;

        self.state.identity().sign_out().await.map_err(|err| {
            warn!(error = %err, "sign-out failed, state unchanged");
            AuthError::SignOutFailed(err.to_string())
        })?;

        // Do not wait for the provider's change notification.
        self.state.clear();

        info!("signed out");
        let _ = self
            .state
            .events()
            .emit(CoreEvent::Auth(AuthEvent::SignedOut {
                user_id: prior.map(|id| id.to_string()),
            }));

        Ok(())
    }

    /// Whether a principal is currently signed in. Pure read, no I/O.
    pub fn is_authenticated(&self) -> bool {
        self.state.snapshot().is_authenticated()
    }

    /// Whether the current principal holds the admin role. Pure read; false
    /// whenever the profile is absent.
    pub fn is_admin(&self) -> bool {
        self.state.snapshot().is_admin()
    }

    /// The current user id, if signed in. Pure read.
    pub fn current_user(&self) -> Option<UserId> {
        self.state.snapshot().user_id
    }

    /// The full current snapshot. Pure read.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{MockIdentity, MockProfiles};
    use bridge_traits::{IdentityProvider, ProfileRecord, ProfileStore};
    use core_runtime::events::EventBus;
    use std::sync::Arc;

    fn facade_with(
        identity: &Arc<MockIdentity>,
        profiles: &Arc<MockProfiles>,
    ) -> (AuthFacade, SessionState) {
        let state = SessionState::new(
            identity.clone() as Arc<dyn IdentityProvider>,
            profiles.clone() as Arc<dyn ProfileStore>,
            EventBus::new(16),
        );
        (AuthFacade::new(state.clone()), state)
    }

    #[tokio::test]
    async fn sign_in_makes_role_synchronously_readable() {
        let user = UserId::new();
        let identity = MockIdentity::new();
        identity.accept_credentials("admin@example.com", "secret", Session::new(user));
        let profiles = MockProfiles::new();
        profiles.insert(ProfileRecord::with_role(user, "admin"));

        let (auth, state) = facade_with(&identity, &profiles);
        state.initialize().await.unwrap();
        assert!(!auth.is_authenticated());

        let session = auth.sign_in("admin@example.com", "secret").await.unwrap();
        assert_eq!(session.user_id, user);

        // No further awaits needed: role is already current.
        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
        assert_eq!(auth.current_user(), Some(user));
    }

    #[tokio::test]
    async fn rejected_credentials_leave_state_unchanged_and_keep_message() {
        let identity = MockIdentity::new();
        let profiles = MockProfiles::new();

        let (auth, state) = facade_with(&identity, &profiles);
        state.initialize().await.unwrap();

        let err = auth
            .sign_in("nobody@example.com", "wrong")
            .await
            .unwrap_err();

        match err {
            AuthError::Credentials { message } => {
                // The provider's wording, unchanged.
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("expected Credentials error, got {other:?}"),
        }
        assert!(!auth.is_authenticated());
        assert!(!auth.is_admin());
    }

    #[tokio::test]
    async fn sign_in_succeeds_even_when_profile_fetch_fails() {
        let user = UserId::new();
        let identity = MockIdentity::new();
        identity.accept_credentials("member@example.com", "secret", Session::new(user));
        let profiles = MockProfiles::new();
        profiles.fail_fetches(true);

        let (auth, state) = facade_with(&identity, &profiles);
        state.initialize().await.unwrap();

        auth.sign_in("member@example.com", "secret").await.unwrap();

        assert!(auth.is_authenticated());
        // Fetch failed: no profile, never admin.
        assert!(!auth.is_admin());
    }

    #[tokio::test]
    async fn sign_out_is_synchronous() {
        let user = UserId::new();
        let identity = MockIdentity::with_session(Session::new(user));
        let profiles = MockProfiles::new();
        profiles.insert(ProfileRecord::with_role(user, "admin"));

        let (auth, state) = facade_with(&identity, &profiles);
        state.initialize().await.unwrap();
        assert!(auth.is_admin());

        auth.sign_out().await.unwrap();

        // Immediately after sign_out resolves, with no yield in between.
        assert!(!auth.is_authenticated());
        assert!(!auth.is_admin());
        assert!(auth.snapshot().profile.is_none());
    }

    #[tokio::test]
    async fn failed_sign_out_leaves_state_unchanged() {
        let user = UserId::new();
        let identity = MockIdentity::with_session(Session::new(user));
        identity.fail_sign_out(true);
        let profiles = MockProfiles::new();
        profiles.insert(ProfileRecord::with_role(user, "admin"));

        let (auth, state) = facade_with(&identity, &profiles);
        state.initialize().await.unwrap();

        let result = auth.sign_out().await;
        assert!(matches!(result, Err(AuthError::SignOutFailed(_))));

        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
    }

    #[tokio::test]
    async fn status_queries_do_not_require_initialization() {
        let identity = MockIdentity::new();
        let profiles = MockProfiles::new();

        let (auth, _state) = facade_with(&identity, &profiles);

        // Pure reads work on the pending snapshot too.
        assert!(!auth.is_authenticated());
        assert!(!auth.is_admin());
        assert!(auth.snapshot().loading);
    }
}
