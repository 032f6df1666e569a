//! # Core Configuration Module
//!
//! Provides configuration management for the session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] holding the external client handles and settings the core
//! needs. It enforces fail-fast validation so a missing required client is
//! reported at startup with an actionable message instead of surfacing later
//! as a runtime failure.
//!
//! ## Required Dependencies
//!
//! - `IdentityProvider`: session retrieval, credential sign-in/out,
//!   change notifications
//! - `ProfileStore`: profile row lookup by user id
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .identity_provider(Arc::new(MyIdentityProvider))
//!     .profile_store(Arc::new(MyProfileStore))
//!     .home_path("/")
//!     .login_path("/login")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{IdentityProvider, ProfileStore};
use std::sync::Arc;

/// Default path non-admins are sent to when an admin route rejects them.
pub const DEFAULT_HOME_PATH: &str = "/";

/// Default path unauthenticated users are sent to.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Core configuration for the session core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Identity provider client (required)
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Profile store client (required)
    pub profile_store: Arc<dyn ProfileStore>,

    /// Buffer size for the core event bus
    pub event_buffer: usize,

    /// Redirect target for rejected admin navigations
    pub home_path: String,

    /// Redirect target for unauthenticated navigations
    pub login_path: String,
}

impl CoreConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("event_buffer", &self.event_buffer)
            .field("home_path", &self.home_path)
            .field("login_path", &self.login_path)
            .finish()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    profile_store: Option<Arc<dyn ProfileStore>>,
    event_buffer: Option<usize>,
    home_path: Option<String>,
    login_path: Option<String>,
}

impl CoreConfigBuilder {
    /// Set the identity provider client (required).
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    /// Set the profile store client (required).
    pub fn profile_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profile_store = Some(store);
        self
    }

    /// Set the event bus buffer size.
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Set the home path used as the non-admin redirect target.
    pub fn home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = Some(path.into());
        self
    }

    /// Set the login path used as the unauthenticated redirect target.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapabilityMissing` with an actionable message when a
    /// required client handle was not provided, and `Error::Config` for
    /// invalid settings.
    pub fn build(self) -> Result<CoreConfig> {
        let identity_provider =
            self.identity_provider
                .ok_or_else(|| Error::CapabilityMissing {
                    capability: "IdentityProvider".to_string(),
                    message: "No identity provider client was provided. \
                              Inject the host adapter for your auth backend."
                        .to_string(),
                })?;

        let profile_store = self.profile_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "ProfileStore".to_string(),
            message: "No profile store client was provided. \
                      Inject the host adapter for your data store."
                .to_string(),
        })?;

        let event_buffer = self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        if event_buffer == 0 {
            return Err(Error::Config(
                "event_buffer must be greater than zero".to_string(),
            ));
        }

        Ok(CoreConfig {
            identity_provider,
            profile_store,
            event_buffer,
            home_path: self.home_path.unwrap_or_else(|| DEFAULT_HOME_PATH.into()),
            login_path: self.login_path.unwrap_or_else(|| DEFAULT_LOGIN_PATH.into()),
        })
    }
}
