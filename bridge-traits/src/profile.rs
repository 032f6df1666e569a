//! Profile Store Abstraction
//!
//! Defines the contract with the external data store holding application-level
//! profile rows, fetched separately from the identity provider's session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::UserId;

/// A profile row as stored by the data store.
///
/// Keyed by `id` equal to the owning session's user id. `role` is a plain
/// string tag; an absent role (or an absent row entirely) means an ordinary,
/// non-privileged user, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Equals the owning principal's user id.
    pub id: UserId,
    /// Role tag; `None` means non-privileged.
    pub role: Option<String>,
    /// Optional display name for host UI.
    pub display_name: Option<String>,
}

impl ProfileRecord {
    /// Create a record with no role and no display name.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            role: None,
            display_name: None,
        }
    }

    /// Create a record carrying the given role tag.
    pub fn with_role(id: UserId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: Some(role.into()),
            display_name: None,
        }
    }
}

/// Profile store client.
///
/// Abstracts row lookup by key against the application's data store. The
/// core treats it as an opaque service exposing at most one record per user.
///
/// # Contract
///
/// - A missing row is `Ok(None)`, not an error; the caller treats it as an
///   ordinary user with no privileges.
/// - `Err` means the store was unreachable or the lookup itself failed; the
///   caller must fail closed (no privilege granted off an error).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row for `user_id`, if one exists.
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<ProfileRecord>>;
}
