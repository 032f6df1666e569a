//! # Event Bus System
//!
//! Provides an event-driven architecture for the session core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between the core modules and host UI layers through typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     emit      ┌───────────┐
//! │ Session State ├──────────────>│           │
//! └───────────────┘               │ EventBus  │
//!                                 │ (broadcast│   subscribe    ┌────────────┐
//! ┌───────────────┐     emit      │  channel) ├───────────────>│ Subscriber │
//! │ Nav Guard     ├──────────────>│           │                └────────────┘
//! └───────────────┘               └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, NoticeEvent, NoticeKind};
//!
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! let event = CoreEvent::Notice(NoticeEvent {
//!     message: "Admin access required".to_string(),
//!     kind: NoticeKind::Warning,
//! });
//! event_bus.emit(event).ok();
//! ```
//!
//! ## Error Handling
//!
//! The bus uses `tokio::sync::broadcast`, which can produce two errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped (shutdown).

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the main event type published and received through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Session and authentication transitions
    Auth(AuthEvent),
    /// Navigation guard outcomes
    Nav(NavEvent),
    /// User-visible notices for a host toast/banner layer
    Notice(NoticeEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Nav(e) => e.description(),
            CoreEvent::Notice(_) => "User-visible notice",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::ProfileFetchFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::SessionUnavailable { .. }) => EventSeverity::Error,
            CoreEvent::Notice(NoticeEvent {
                kind: NoticeKind::Error,
                ..
            }) => EventSeverity::Error,
            CoreEvent::Notice(NoticeEvent {
                kind: NoticeKind::Warning,
                ..
            }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SignedIn { .. })
            | CoreEvent::Auth(AuthEvent::SignedOut { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Events related to session and profile synchronization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A principal signed in (credential sign-in or provider notification).
    SignedIn {
        /// The signed-in user id.
        user_id: String,
    },
    /// The current principal signed out or the provider cleared the session.
    SignedOut {
        /// The user id that was signed out, if it was known.
        user_id: Option<String>,
    },
    /// The provider refreshed the session without an identity change.
    SessionRefreshed {
        /// The user id whose session was refreshed.
        user_id: String,
    },
    /// The profile row for the current principal was loaded.
    ProfileLoaded {
        /// The owning user id.
        user_id: String,
        /// Role tag on the loaded profile, if any.
        role: Option<String>,
    },
    /// A profile fetch failed; the prior profile value was kept.
    ProfileFetchFailed {
        /// The user id the fetch was for.
        user_id: String,
        /// Human-readable failure message.
        message: String,
    },
    /// Session retrieval failed; treated as "no session" (fail-closed).
    SessionUnavailable {
        /// Human-readable failure message.
        message: String,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SignedIn { .. } => "User signed in",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::SessionRefreshed { .. } => "Session refreshed",
            AuthEvent::ProfileLoaded { .. } => "Profile loaded",
            AuthEvent::ProfileFetchFailed { .. } => "Profile fetch failed",
            AuthEvent::SessionUnavailable { .. } => "Session retrieval failed",
        }
    }
}

// ============================================================================
// Navigation Events
// ============================================================================

/// Events describing navigation guard outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NavEvent {
    /// A guarded navigation was allowed.
    Allowed {
        /// The requested destination path.
        to: String,
    },
    /// A navigation was redirected.
    Redirected {
        /// The origin path.
        from: String,
        /// The requested destination path.
        to: String,
        /// The redirect target path.
        target: String,
    },
    /// A navigation was denied in place (no redirect fired).
    Denied {
        /// The origin path.
        from: String,
        /// The requested destination path.
        to: String,
    },
}

impl NavEvent {
    fn description(&self) -> &str {
        match self {
            NavEvent::Allowed { .. } => "Navigation allowed",
            NavEvent::Redirected { .. } => "Navigation redirected",
            NavEvent::Denied { .. } => "Navigation denied",
        }
    }
}

// ============================================================================
// Notice Events
// ============================================================================

/// Kind of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    /// Positive confirmation
    Success,
    /// Recoverable problem the user should see
    Warning,
    /// Hard failure the user should see
    Error,
}

/// A user-visible notice for a host toast/banner layer to display.
///
/// The core only emits these; rendering and dismissal timing are host
/// concerns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeEvent {
    /// The message to display.
    pub message: String,
    /// The notice kind.
    pub kind: NoticeKind,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, CoreEvent, AuthEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let event_bus = EventBus::new(100);
/// let mut subscriber = event_bus.subscribe();
///
/// let event = CoreEvent::Auth(AuthEvent::SignedIn {
///     user_id: "user-123".to_string(),
/// });
/// event_bus.emit(event).ok();
/// # }
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it will
    /// receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, CoreEvent};
///
/// let event_bus = EventBus::new(100);
/// let stream = EventStream::new(event_bus.subscribe());
///
/// // Only notice events
/// let mut notice_stream = stream.filter(|event| {
///     matches!(event, CoreEvent::Notice(_))
/// });
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events and `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Auth(AuthEvent::SignedOut { user_id: None });

        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_event_emission_with_subscribers() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: "user-1".to_string(),
        });

        let result = bus.emit(event.clone());
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Nav(NavEvent::Redirected {
            from: "/events".to_string(),
            to: "/admin/events".to_string(),
            target: "/".to_string(),
        });

        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Notice(_)));

        // Filtered out
        let nav_event = CoreEvent::Nav(NavEvent::Allowed {
            to: "/events".to_string(),
        });
        bus.emit(nav_event).ok();

        // Passes through
        let notice = CoreEvent::Notice(NoticeEvent {
            message: "Admin access required".to_string(),
            kind: NoticeKind::Warning,
        });
        bus.emit(notice.clone()).ok();

        let received = stream.recv().await.unwrap();
        assert_eq!(received, notice);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2); // Very small buffer
        let mut sub = bus.subscribe();

        for i in 0..5 {
            let event = CoreEvent::Auth(AuthEvent::SessionRefreshed {
                user_id: format!("user-{}", i),
            });
            bus.emit(event).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn test_event_severity() {
        let error_event = CoreEvent::Auth(AuthEvent::ProfileFetchFailed {
            user_id: "user-1".to_string(),
            message: "store unreachable".to_string(),
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);

        let info_event = CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: "user-1".to_string(),
        });
        assert_eq!(info_event.severity(), EventSeverity::Info);

        let debug_event = CoreEvent::Nav(NavEvent::Allowed {
            to: "/events".to_string(),
        });
        assert_eq!(debug_event.severity(), EventSeverity::Debug);
    }

    #[tokio::test]
    async fn test_event_description() {
        let event = CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: "user-1".to_string(),
        });
        assert_eq!(event.description(), "User signed in");
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = CoreEvent::Nav(NavEvent::Denied {
            from: "/".to_string(),
            to: "/admin/events".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("/admin/events"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());

        assert!(stream.try_recv().is_none());
    }
}
