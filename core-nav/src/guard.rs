//! Navigation Guard
//!
//! Decides, for a requested navigation to a protected destination, whether to
//! allow it, redirect it, or deny it in place.
//!
//! Both policies consult the external clients *fresh* rather than trusting
//! possibly-stale session state: navigation can happen before the state's
//! initial resolution completes, or in another tab entirely, and an admin
//! check must not grant access off a cached role after a demotion.
//!
//! ## Failure policy
//!
//! Guards have no caller to report errors to, so every client failure is
//! converted into the fail-closed decision: an unreachable identity provider
//! reads as "no session", an unreachable profile store reads as
//! "non-privileged".

use std::sync::Arc;

use bridge_traits::{IdentityProvider, ProfileStore, Session};
use core_runtime::events::{CoreEvent, EventBus, NavEvent, NoticeEvent, NoticeKind};
use core_session::Profile;
use tracing::{debug, instrument, warn};

use crate::decision::GuardDecision;
use crate::routes::{RouteName, RouteTable};

/// Notice shown (by the host) when an admin route rejects a non-admin.
const ADMIN_REQUIRED_NOTICE: &str = "Admin access is required to view this page";

/// Guard policies over fresh reads of the external clients.
///
/// A guard evaluation is one-shot: `Pending → {Allow, Redirect, Deny}`,
/// terminal per navigation attempt, and never mutates session state.
#[derive(Clone)]
pub struct NavigationGuard {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    events: EventBus,
    table: RouteTable,
}

impl NavigationGuard {
    /// Creates a guard over the given clients and route declarations.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        events: EventBus,
        table: RouteTable,
    ) -> Self {
        Self {
            identity,
            profiles,
            events,
            table,
        }
    }

    /// The route declarations this guard consults.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Applies the access policy declared for `to`.
    ///
    /// Paths not present in the table are public.
    pub async fn evaluate(&self, to: &str, from: &str) -> GuardDecision {
        match self.table.find_by_path(to).map(|route| route.access) {
            Some(crate::routes::Access::RequireAdmin) => self.require_admin(to, from).await,
            Some(crate::routes::Access::RequireAuth) => self.require_auth(to, from).await,
            Some(crate::routes::Access::Public) | None => GuardDecision::Allow,
        }
    }

    /// Authentication guard: requires a current session.
    ///
    /// Re-queries the identity provider directly. Without a session the
    /// decision redirects to the login route, carrying the requested path so
    /// the caller can return there after signing in.
    #[instrument(skip(self))]
    pub async fn require_auth(&self, to: &str, from: &str) -> GuardDecision {
        match self.fresh_session().await {
            Some(_) => {
                let _ = self.events.emit(CoreEvent::Nav(NavEvent::Allowed {
                    to: to.to_string(),
                }));
                GuardDecision::Allow
            }
            None => {
                debug!(to, "no session, redirecting to login");
                let login = self.table.path_of(RouteName::Login).to_string();
                let _ = self.events.emit(CoreEvent::Nav(NavEvent::Redirected {
                    from: from.to_string(),
                    to: to.to_string(),
                    target: login,
                }));
                GuardDecision::redirect_with_return(RouteName::Login, to)
            }
        }
    }

    /// Authorization guard: requires a current session holding the admin
    /// role.
    ///
    /// The role is read fresh from the profile store. A rejected non-admin is
    /// redirected home, unless the attempt already originated at home, in
    /// which case the decision degrades to a deny-in-place so a repeated
    /// attempt cannot produce a redirect cycle.
    #[instrument(skip(self))]
    pub async fn require_admin(&self, to: &str, from: &str) -> GuardDecision {
        let Some(session) = self.fresh_session().await else {
            debug!(to, "no session, redirecting to login");
            let login = self.table.path_of(RouteName::Login).to_string();
            let _ = self.events.emit(CoreEvent::Nav(NavEvent::Redirected {
                from: from.to_string(),
                to: to.to_string(),
                target: login,
            }));
            return GuardDecision::redirect_with_return(RouteName::Login, to);
        };

        let is_admin = match self.profiles.fetch_profile(session.user_id).await {
            Ok(Some(record)) => Profile::from(record).is_admin(),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "profile fetch failed, refusing elevated access");
                false
            }
        };

        if is_admin {
            let _ = self.events.emit(CoreEvent::Nav(NavEvent::Allowed {
                to: to.to_string(),
            }));
            return GuardDecision::Allow;
        }

        let _ = self.events.emit(CoreEvent::Notice(NoticeEvent {
            message: ADMIN_REQUIRED_NOTICE.to_string(),
            kind: NoticeKind::Warning,
        }));

        let home = self.table.path_of(RouteName::Home);
        if from == home {
            debug!(to, from, "non-admin already at home, denying in place");
            let _ = self.events.emit(CoreEvent::Nav(NavEvent::Denied {
                from: from.to_string(),
                to: to.to_string(),
            }));
            GuardDecision::Deny
        } else {
            debug!(to, from, "non-admin, redirecting home");
            let _ = self.events.emit(CoreEvent::Nav(NavEvent::Redirected {
                from: from.to_string(),
                to: to.to_string(),
                target: home.to_string(),
            }));
            GuardDecision::redirect(RouteName::Home)
        }
    }

    /// Fresh session read; provider errors read as "no session".
    async fn fresh_session(&self) -> Option<Session> {
        match self.identity.get_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "session retrieval failed, treating as signed out");
                None
            }
        }
    }
}

impl std::fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("routes", &self.table.routes().len())
            .finish()
    }
}
