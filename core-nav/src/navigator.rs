//! Navigation driver
//!
//! Runs a guard evaluation for a requested path and resolves the decision
//! into the single concrete outcome the host should act on.

use tracing::{debug, instrument};

use crate::decision::GuardDecision;
use crate::guard::NavigationGuard;

/// The resolved result of one navigation attempt.
///
/// Exactly one outcome is produced per attempt.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavOutcome {
    /// The requested path was entered.
    Entered { path: String },
    /// Navigation was diverted to another path. `return_to` carries the
    /// originally requested path when the host should come back to it after
    /// signing in.
    Redirected {
        path: String,
        return_to: Option<String>,
    },
    /// Navigation was refused and the current location kept.
    Stayed,
}

/// Drives guard evaluation and decision resolution for the host router.
#[derive(Debug, Clone)]
pub struct Navigator {
    guard: NavigationGuard,
}

impl Navigator {
    pub fn new(guard: NavigationGuard) -> Self {
        Self { guard }
    }

    /// The guard backing this navigator.
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Evaluates a navigation from `from` to `to` and resolves it.
    ///
    /// Redirect targets are resolved against the guard's route table, so a
    /// host that remapped the home or login path sees its own paths here.
    #[instrument(skip(self))]
    pub async fn navigate(&self, to: &str, from: &str) -> NavOutcome {
        let decision = self.guard.evaluate(to, from).await;
        debug!(?decision, "guard decision resolved");
        match decision {
            GuardDecision::Allow => NavOutcome::Entered {
                path: to.to_string(),
            },
            GuardDecision::Redirect { target, return_to } => NavOutcome::Redirected {
                path: self.guard.table().path_of(target).to_string(),
                return_to,
            },
            GuardDecision::Deny => NavOutcome::Stayed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{RouteName, RouteTable};
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        IdentityProvider, ProfileRecord, ProfileStore, Session, SessionChange, UserId,
    };
    use core_runtime::events::EventBus;
    use std::sync::Arc;
    use tokio::sync::broadcast;

    struct FixedIdentity(Option<Session>);

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn get_session(&self) -> BridgeResult<Option<Session>> {
            Ok(self.0.clone())
        }

        async fn sign_in_with_password(&self, _: &str, _: &str) -> BridgeResult<Session> {
            unimplemented!("not exercised")
        }

        async fn sign_out(&self) -> BridgeResult<()> {
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
            broadcast::channel(1).1
        }
    }

    struct FixedProfiles(Option<ProfileRecord>);

    #[async_trait]
    impl ProfileStore for FixedProfiles {
        async fn fetch_profile(&self, _: UserId) -> BridgeResult<Option<ProfileRecord>> {
            Ok(self.0.clone())
        }
    }

    fn navigator(
        session: Option<Session>,
        profile: Option<ProfileRecord>,
        table: RouteTable,
    ) -> Navigator {
        Navigator::new(NavigationGuard::new(
            Arc::new(FixedIdentity(session)),
            Arc::new(FixedProfiles(profile)),
            EventBus::new(16),
            table,
        ))
    }

    #[tokio::test]
    async fn public_route_is_entered() {
        let nav = navigator(None, None, RouteTable::standard());

        let outcome = nav.navigate("/events", "/").await;

        assert_eq!(
            outcome,
            NavOutcome::Entered {
                path: "/events".to_string()
            }
        );
    }

    #[tokio::test]
    async fn signed_out_admin_attempt_redirects_to_login() {
        let nav = navigator(None, None, RouteTable::standard());

        let outcome = nav.navigate("/admin/events", "/events").await;

        assert_eq!(
            outcome,
            NavOutcome::Redirected {
                path: "/login".to_string(),
                return_to: Some("/admin/events".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn non_admin_attempt_redirects_home() {
        let user = UserId::new();
        let nav = navigator(
            Some(Session::new(user)),
            Some(ProfileRecord::with_role(user, "member")),
            RouteTable::standard(),
        );

        let outcome = nav.navigate("/admin/events", "/events").await;

        assert_eq!(
            outcome,
            NavOutcome::Redirected {
                path: "/".to_string(),
                return_to: None,
            }
        );
    }

    #[tokio::test]
    async fn denied_attempt_stays_put() {
        let user = UserId::new();
        let nav = navigator(
            Some(Session::new(user)),
            Some(ProfileRecord::with_role(user, "member")),
            RouteTable::standard(),
        );

        let outcome = nav.navigate("/admin/events", "/").await;

        assert_eq!(outcome, NavOutcome::Stayed);
    }

    #[tokio::test]
    async fn redirect_paths_follow_table_overrides() {
        let table = RouteTable::standard().with_path(RouteName::Login, "/auth/sign-in");
        let nav = navigator(None, None, table);

        let outcome = nav.navigate("/admin/events", "/").await;

        assert_eq!(
            outcome,
            NavOutcome::Redirected {
                path: "/auth/sign-in".to_string(),
                return_to: Some("/admin/events".to_string()),
            }
        );
    }
}
