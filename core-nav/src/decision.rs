//! Guard decision type.

use serde::{Deserialize, Serialize};

use crate::routes::RouteName;

/// Outcome of a single navigation guard evaluation.
///
/// Computed per navigation attempt and never persisted; a guard produces
/// exactly one decision per attempt and no retry is automatic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision")]
pub enum GuardDecision {
    /// Proceed to the requested destination.
    Allow,
    /// Send the navigation to `target` instead.
    Redirect {
        /// The route to redirect to.
        target: RouteName,
        /// The originally requested path, when the caller should return to it
        /// after resolving the redirect (e.g. after signing in).
        return_to: Option<String>,
    },
    /// Stay in place; no navigation event is fired.
    Deny,
}

impl GuardDecision {
    /// Whether the navigation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Shorthand for a redirect without a return path.
    pub fn redirect(target: RouteName) -> Self {
        GuardDecision::Redirect {
            target,
            return_to: None,
        }
    }

    /// Shorthand for a redirect carrying the originally requested path.
    pub fn redirect_with_return(target: RouteName, return_to: impl Into<String>) -> Self {
        GuardDecision::Redirect {
            target,
            return_to: Some(return_to.into()),
        }
    }
}
