//! Core service façade and bootstrap helper.
//!
//! This crate wires host-provided client implementations (identity provider,
//! profile store) into the shared core: it builds the event bus, resolves the
//! initial session, and hands the host the auth facade and navigator it
//! drives its UI and router with.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{IdentityProvider, ProfileStore};
use core_nav::{NavigationGuard, Navigator, RouteName, RouteTable};
use core_runtime::config::{CoreConfig, CoreConfigBuilder};
use core_runtime::events::EventBus;
use core_session::{AuthFacade, SessionState};
use tracing::{info, instrument};

/// Aggregated handle to the client dependencies the core requires.
pub struct CoreDependencies {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub profile_store: Arc<dyn ProfileStore>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit client handles.
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        profile_store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            identity_provider,
            profile_store,
        }
    }

    /// Starts a configuration builder preloaded with these clients.
    ///
    /// Remaining settings (paths, event buffer) keep their defaults unless
    /// set before `build()`.
    pub fn into_config_builder(self) -> CoreConfigBuilder {
        CoreConfig::builder()
            .identity_provider(self.identity_provider)
            .profile_store(self.profile_store)
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    events: EventBus,
    session: SessionState,
    auth: AuthFacade,
    navigator: Navigator,
}

impl CoreService {
    /// Builds the core from a validated configuration and runs the initial
    /// session resolution.
    ///
    /// Returns once the session and profile are resolved (or their failures
    /// have been absorbed) and the change listener is running, so the first
    /// snapshot hosts observe already has the loading flag cleared.
    #[instrument(skip(config))]
    pub async fn initialize(config: CoreConfig) -> Result<CoreService> {
        let events = EventBus::new(config.event_buffer);

        let session = SessionState::new(
            Arc::clone(&config.identity_provider),
            Arc::clone(&config.profile_store),
            events.clone(),
        );
        session.initialize().await?;

        let auth = AuthFacade::new(session.clone());

        let table = RouteTable::standard()
            .with_path(RouteName::Home, config.home_path.clone())
            .with_path(RouteName::Login, config.login_path.clone());
        let guard = NavigationGuard::new(
            Arc::clone(&config.identity_provider),
            Arc::clone(&config.profile_store),
            events.clone(),
            table,
        );
        let navigator = Navigator::new(guard);

        info!(
            home = %config.home_path,
            login = %config.login_path,
            "core service initialized"
        );

        Ok(CoreService {
            events,
            session,
            auth,
            navigator,
        })
    }

    /// Sign-in/sign-out operations and snapshot reads.
    pub fn auth(&self) -> &AuthFacade {
        &self.auth
    }

    /// Route-guard evaluation for the host router.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// The reactive session state backing the facade.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The event bus all core events flow through.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("session", &self.session.snapshot())
            .finish()
    }
}
