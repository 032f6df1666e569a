//! Session-level view types.

use bridge_traits::{ProfileRecord, UserId};
use serde::{Deserialize, Serialize};

/// The only role tag that grants elevated access.
pub const ADMIN_ROLE: &str = "admin";

/// Application-level metadata about a principal, fetched separately from the
/// session.
///
/// An absent role means an ordinary user; it is never an error and never
/// grants privilege.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Equals the owning session's user id.
    pub id: UserId,
    /// Role tag; `None` means non-privileged.
    pub role: Option<String>,
    /// Optional display name for host UI.
    pub display_name: Option<String>,
}

impl Profile {
    /// Whether this profile holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            role: record.role,
            display_name: record.display_name,
        }
    }
}

/// One observable state of the session layer.
///
/// Invariant: `profile` is `Some` only while `user_id` is `Some`, and
/// `profile.id == user_id` whenever both are present. All mutation paths in
/// [`SessionState`](crate::state::SessionState) preserve this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The authenticated principal, or `None` when signed out.
    pub user_id: Option<UserId>,
    /// The principal's profile, once fetched.
    pub profile: Option<Profile>,
    /// True until the initial session/profile resolution completes; never set
    /// back to true afterwards. Per-action loading state is the caller's
    /// concern.
    pub loading: bool,
}

impl SessionSnapshot {
    /// The state before the initial session check has completed.
    pub fn pending() -> Self {
        Self {
            user_id: None,
            profile: None,
            loading: true,
        }
    }

    /// Whether a principal is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether the current principal holds the admin role.
    ///
    /// False whenever the profile is absent; a missing profile is never
    /// treated as admin.
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(Profile::is_admin)
    }
}
