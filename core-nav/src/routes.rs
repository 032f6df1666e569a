//! Route table declarations.
//!
//! The application's views, their paths, and the access policy each one
//! carries. The guard consults this table to decide which policy applies to a
//! requested path; the navigator uses it to resolve redirect targets.

use serde::{Deserialize, Serialize};

/// Named routes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteName {
    Home,
    Login,
    Events,
    AdminEvents,
    AdminCancellations,
}

/// Access policy for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    /// Reachable by anyone.
    Public,
    /// Requires a current session.
    RequireAuth,
    /// Requires a current session holding the admin role.
    RequireAdmin,
}

/// A single route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: RouteName,
    pub path: String,
    pub access: Access,
}

impl Route {
    pub fn new(name: RouteName, path: impl Into<String>, access: Access) -> Self {
        Self {
            name,
            path: path.into(),
            access,
        }
    }
}

/// The application's route declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Builds a table from explicit declarations.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The standard application routes.
    pub fn standard() -> Self {
        Self::new(vec![
            Route::new(RouteName::Home, "/", Access::Public),
            Route::new(RouteName::Login, "/login", Access::Public),
            Route::new(RouteName::Events, "/events", Access::Public),
            Route::new(RouteName::AdminEvents, "/admin/events", Access::RequireAdmin),
            Route::new(
                RouteName::AdminCancellations,
                "/admin/cancellations",
                Access::RequireAdmin,
            ),
        ])
    }

    /// Overrides the path of a named route.
    pub fn with_path(mut self, name: RouteName, path: impl Into<String>) -> Self {
        let path = path.into();
        if let Some(route) = self.routes.iter_mut().find(|r| r.name == name) {
            route.path = path;
        }
        self
    }

    /// Looks a route up by exact path.
    pub fn find_by_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    /// Looks a route up by name.
    pub fn find(&self, name: RouteName) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// The path of a named route.
    ///
    /// Falls back to the home path ("/") for a name missing from the table,
    /// so a redirect can always be resolved to somewhere safe.
    pub fn path_of(&self, name: RouteName) -> &str {
        self.find(name).map(|r| r.path.as_str()).unwrap_or("/")
    }

    /// All declared routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_declares_admin_routes_as_protected() {
        let table = RouteTable::standard();

        let admin = table.find_by_path("/admin/events").unwrap();
        assert_eq!(admin.name, RouteName::AdminEvents);
        assert_eq!(admin.access, Access::RequireAdmin);

        let cancellations = table.find_by_path("/admin/cancellations").unwrap();
        assert_eq!(cancellations.access, Access::RequireAdmin);
    }

    #[test]
    fn standard_table_keeps_public_views_public() {
        let table = RouteTable::standard();
        assert_eq!(table.find_by_path("/").unwrap().access, Access::Public);
        assert_eq!(
            table.find_by_path("/events").unwrap().access,
            Access::Public
        );
    }

    #[test]
    fn unknown_path_is_not_declared() {
        let table = RouteTable::standard();
        assert!(table.find_by_path("/nowhere").is_none());
    }

    #[test]
    fn with_path_overrides_a_single_route() {
        let table = RouteTable::standard().with_path(RouteName::Login, "/signin");
        assert_eq!(table.path_of(RouteName::Login), "/signin");
        assert_eq!(table.path_of(RouteName::Home), "/");
    }
}
