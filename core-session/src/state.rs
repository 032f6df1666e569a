//! Session State Synchronization Engine
//!
//! `SessionState` is the single authoritative in-memory record of
//! `{user_id, profile, loading}`, observable by all readers without an
//! explicit fetch. It is kept in a `tokio::sync::watch` channel: readers take
//! a cheap snapshot or subscribe for change notification, and every mutation
//! funnels through the sender's internal lock, which gives the update
//! ordering the rest of the core relies on.
//!
//! ## Synchronization sequence
//!
//! Every session transition (the initial load, a provider change
//! notification, a facade sign-in) runs the same sequence: apply the user
//! id (clearing a stale profile in the same step), then fetch the profile
//! and apply the result *only if the triggering user id is still current*.
//! That last check is what prevents a fetch started under one identity from
//! overwriting state that belongs to a newer one.
//!
//! ## Failure policy
//!
//! Session retrieval errors are treated as "no session" (fail-closed).
//! Profile fetch errors keep the prior profile value; they are logged,
//! emitted on the event bus, and returned to direct callers, but background
//! synchronization never propagates them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_traits::{IdentityProvider, ProfileStore, Session, SessionChange, UserId};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Result};
use crate::types::{Profile, SessionSnapshot};

/// Cheaply cloneable handle to the process-wide session state.
///
/// All clones observe and mutate the same underlying snapshot. Constructed
/// once during bootstrap and passed by handle to the facade and the
/// navigation layer; [`SessionState::initialize`] must be called exactly once
/// before guard or facade results are considered final.
///
/// # Example
///
/// ```ignore
/// let state = SessionState::new(identity, profiles, event_bus);
/// state.initialize().await?;
///
/// let snapshot = state.snapshot();
/// if snapshot.is_authenticated() {
///     println!("signed in as {}", snapshot.user_id.unwrap());
/// }
/// ```
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<Inner>,
}

struct Inner {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    events: EventBus,
    tx: watch::Sender<SessionSnapshot>,
    initialized: AtomicBool,
}

impl SessionState {
    /// Creates session state in the pending (loading) condition.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        events: EventBus,
    ) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::pending());
        Self {
            inner: Arc::new(Inner {
                identity,
                profiles,
                events,
                tx,
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Runs the initial session/profile resolution and starts the listener
    /// task that keeps the state synchronized with provider notifications.
    ///
    /// Sequence: query the provider for the current session (errors are
    /// treated as "no session"), apply the user id, fetch and apply the
    /// profile, then clear the loading flag unconditionally, regardless of
    /// profile-fetch success. Later transitions never touch the loading flag
    /// again.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyInitialized` when called more than once per
    /// process lifetime.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return Err(AuthError::AlreadyInitialized);
        }

        // Subscribe before the initial query so no change notification can
        // slip between the two.
        let changes = self.inner.identity.subscribe();

        let session = self.fetch_session_fail_closed().await;
        self.apply_session(session).await;

        // Initial resolution is complete even if the profile fetch failed.
        self.inner.tx.send_modify(|snap| snap.loading = false);
        info!("session state initialized");

        let state = self.clone();
        tokio::spawn(async move { state.listen(changes).await });

        Ok(())
    }

    /// Current snapshot. Pure read, no I/O, no suspension.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    ///
    /// Updates are delivered in the order they were applied.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Whether the initial session/profile resolution is still in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.tx.borrow().loading
    }

    /// Waits for the next snapshot update and returns it.
    ///
    /// One-shot convenience over [`subscribe`](Self::subscribe); callers that
    /// observe a sequence of transitions should hold their own receiver
    /// instead.
    pub async fn changed(&self) -> SessionSnapshot {
        let mut rx = self.inner.tx.subscribe();
        // The sender lives inside self, so the channel cannot be closed here.
        let _ = rx.changed().await;
        let snapshot = rx.borrow().clone();
        snapshot
    }

    /// Re-fetches the profile for the current user id.
    ///
    /// A no-op producing a cleared profile when no user is signed in.
    /// Idempotent: repeated calls with an unchanged user id converge to the
    /// same observable profile. Fetch failures keep the prior value and are
    /// returned to the caller.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<()> {
        let Some(user_id) = self.snapshot().user_id else {
            // No identity: converge to a cleared profile.
            self.inner.tx.send_if_modified(|snap| {
                if snap.user_id.is_none() && snap.profile.is_some() {
                    snap.profile = None;
                    true
                } else {
                    false
                }
            });
            return Ok(());
        };

        self.fetch_and_apply(user_id).await
    }

    /// Applies a session transition: updates the user id and runs the profile
    /// fetch for the new identity.
    ///
    /// A cleared or switched identity clears the profile synchronously in the
    /// same update step, so no reader can observe the old profile against the
    /// new user id.
    pub(crate) async fn apply_session(&self, session: Option<Session>) {
        let user_id = session.map(|s| s.user_id);

        self.inner.tx.send_modify(|snap| {
            snap.user_id = user_id;
            if snap.profile.as_ref().map(|p| p.id) != user_id {
                snap.profile = None;
            }
        });

        if let Some(user_id) = user_id {
            // Background path: the failure is already logged and emitted.
            if let Err(err) = self.fetch_and_apply(user_id).await {
                debug!(%user_id, error = %err, "profile not refreshed during session apply");
            }
        }
    }

    /// Synchronously clears both user id and profile.
    ///
    /// Used by sign-out, which must be reflected immediately rather than
    /// waiting for the provider's change notification to arrive.
    pub(crate) fn clear(&self) {
        self.inner.tx.send_modify(|snap| {
            snap.user_id = None;
            snap.profile = None;
        });
    }

    pub(crate) fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Queries the provider for the current session, mapping errors to "no
    /// session". Never fails open to an authenticated state.
    async fn fetch_session_fail_closed(&self) -> Option<Session> {
        match self.inner.identity.get_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "session retrieval failed, treating as signed out");
                let _ = self
                    .inner
                    .events
                    .emit(CoreEvent::Auth(AuthEvent::SessionUnavailable {
                        message: err.to_string(),
                    }));
                None
            }
        }
    }

    /// Fetches the profile for `user_id` and applies the result, unless the
    /// current identity has moved on in the meantime.
    ///
    /// Results are applied keyed by identity, never by completion time: a
    /// fetch that resolves after its triggering user id was superseded is
    /// discarded without effect.
    async fn fetch_and_apply(&self, user_id: UserId) -> Result<()> {
        let record = match self.inner.profiles.fetch_profile(user_id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(%user_id, error = %err, "profile fetch failed, keeping prior value");
                let _ = self
                    .inner
                    .events
                    .emit(CoreEvent::Auth(AuthEvent::ProfileFetchFailed {
                        user_id: user_id.to_string(),
                        message: err.to_string(),
                    }));
                return Err(AuthError::ProfileFetch(err.to_string()));
            }
        };

        // A missing row is an ordinary user, not an error.
        let profile = record.map(Profile::from);
        let role = profile.as_ref().and_then(|p| p.role.clone());

        let mut stale = false;
        self.inner.tx.send_if_modified(|snap| {
            if snap.user_id != Some(user_id) {
                stale = true;
                return false;
            }
            snap.profile = profile.clone();
            true
        });

        if stale {
            debug!(%user_id, "discarding profile fetch for superseded identity");
        } else {
            let _ = self
                .inner
                .events
                .emit(CoreEvent::Auth(AuthEvent::ProfileLoaded {
                    user_id: user_id.to_string(),
                    role,
                }));
        }

        Ok(())
    }

    /// Consumes provider change notifications, one at a time and in order.
    async fn listen(self, mut changes: broadcast::Receiver<SessionChange>) {
        loop {
            match changes.recv().await {
                Ok(change) => self.handle_change(change).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "session change stream lagged, re-syncing from provider");
                    // The retained backlog is already superseded by whatever
                    // the provider reports now; replaying it after the
                    // re-sync would apply old sessions out of order.
                    Self::drain_changes(&mut changes);
                    let session = self.fetch_session_fail_closed().await;
                    self.apply_session(session).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("session change stream closed, listener exiting");
                    break;
                }
            }
        }
    }

    /// Discards every change notification currently buffered in `changes`.
    fn drain_changes(changes: &mut broadcast::Receiver<SessionChange>) {
        loop {
            match changes.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
    }

    async fn handle_change(&self, change: SessionChange) {
        let event = match &change {
            SessionChange::SignedIn(session) => AuthEvent::SignedIn {
                user_id: session.user_id.to_string(),
            },
            SessionChange::TokenRefreshed(session) => AuthEvent::SessionRefreshed {
                user_id: session.user_id.to_string(),
            },
            SessionChange::SignedOut => AuthEvent::SignedOut {
                user_id: self.snapshot().user_id.map(|id| id.to_string()),
            },
        };
        let _ = self.inner.events.emit(CoreEvent::Auth(event));

        self.apply_session(change.session().cloned()).await;
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.tx.borrow();
        f.debug_struct("SessionState")
            .field("user_id", &snapshot.user_id)
            .field("has_profile", &snapshot.profile.is_some())
            .field("loading", &snapshot.loading)
            .finish()
    }
}
