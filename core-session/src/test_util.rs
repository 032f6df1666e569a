//! In-memory test doubles for the identity provider and profile store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    IdentityProvider, ProfileRecord, ProfileStore, Session, SessionChange, UserId,
};
use tokio::sync::{broadcast, watch, Semaphore};

use crate::types::SessionSnapshot;

/// Scriptable identity provider double.
pub(crate) struct MockIdentity {
    session: Mutex<Option<Session>>,
    fail_get: AtomicBool,
    fail_sign_out: AtomicBool,
    accepted: Mutex<HashMap<String, (String, Session)>>,
    changes: broadcast::Sender<SessionChange>,
}

impl MockIdentity {
    pub(crate) fn new() -> Arc<Self> {
        let (changes, _) = broadcast::channel(16);
        Arc::new(Self {
            session: Mutex::new(None),
            fail_get: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            accepted: Mutex::new(HashMap::new()),
            changes,
        })
    }

    pub(crate) fn with_session(session: Session) -> Arc<Self> {
        let mock = Self::new();
        *mock.session.lock().unwrap() = Some(session);
        mock
    }

    pub(crate) fn fail_session_retrieval(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Registers a credential pair the provider will accept.
    pub(crate) fn accept_credentials(&self, email: &str, password: &str, session: Session) {
        self.accepted
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), session));
    }

    /// Emits a change notification, keeping the provider's own session view
    /// consistent with what it announces.
    pub(crate) fn emit(&self, change: SessionChange) {
        *self.session.lock().unwrap() = change.session().cloned();
        let _ = self.changes.send(change);
    }

    /// Replaces the provider's session view without announcing a change, as
    /// when the matching notification was lost to a lagged subscriber.
    pub(crate) fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap() = session;
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn get_session(&self) -> BridgeResult<Option<Session>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "identity backend unreachable".to_string(),
            ));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BridgeResult<Session> {
        let session = {
            let accepted = self.accepted.lock().unwrap();
            match accepted.get(email) {
                Some((expected, session)) if expected == password => session.clone(),
                _ => {
                    return Err(BridgeError::InvalidCredentials {
                        message: "Invalid login credentials".to_string(),
                    })
                }
            }
        };
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> BridgeResult<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "sign-out request failed".to_string(),
            ));
        }
        self.session.lock().unwrap().take();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}

/// Scriptable profile store double with per-user fetch gating.
pub(crate) struct MockProfiles {
    rows: Mutex<HashMap<UserId, ProfileRecord>>,
    fail: AtomicBool,
    fetches: AtomicUsize,
    gates: Mutex<HashMap<UserId, Arc<Semaphore>>>,
}

impl MockProfiles {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            gates: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn insert(&self, record: ProfileRecord) {
        self.rows.lock().unwrap().insert(record.id, record);
    }

    pub(crate) fn fail_fetches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Makes the next fetches for `user_id` wait until a permit is added to
    /// the returned semaphore. Lets a test hold a fetch in flight while the
    /// identity moves on.
    pub(crate) fn gate(&self, user_id: UserId) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(user_id, gate.clone());
        gate
    }
}

#[async_trait]
impl ProfileStore for MockProfiles {
    async fn fetch_profile(&self, user_id: UserId) -> BridgeResult<Option<ProfileRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let gate = self.gates.lock().unwrap().get(&user_id).cloned();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;
            permit.forget();
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "profile store unreachable".to_string(),
            ));
        }
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }
}

/// Waits until the watched snapshot satisfies `pred`, failing the test after
/// a bounded delay.
pub(crate) async fn wait_for<F>(rx: &mut watch::Receiver<SessionSnapshot>, pred: F)
where
    F: Fn(&SessionSnapshot) -> bool,
{
    let deadline = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if pred(&rx.borrow()) {
                return;
            }
            rx.changed().await.expect("session state dropped");
        }
    });
    deadline.await.expect("timed out waiting for snapshot");
}
