use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::auth::Role;

/// Every screen the client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Users,
    Subscriptions,
    Flags,
    Feedback,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Users,
        Route::Subscriptions,
        Route::Flags,
        Route::Feedback,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Users => "/admin/users",
            Route::Subscriptions => "/admin/subscriptions",
            Route::Flags => "/admin/flags",
            Route::Feedback => "/feedback",
        }
    }

    /// Where a signed-in user lands by default
    pub fn home_for(role: Role) -> Route {
        match role {
            Role::Admin => Route::Dashboard,
            Role::User => Route::Feedback,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Remembers every navigation; used by tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Route> {
        self.visits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.visits().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route);
        self.visits.lock().unwrap_or_else(|e| e.into_inner()).push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_distinct() {
        let mut paths: Vec<_> = Route::ALL.iter().map(|r| r.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Route::ALL.len());
    }

    #[test]
    fn home_depends_on_role() {
        assert_eq!(Route::home_for(Role::Admin), Route::Dashboard);
        assert_eq!(Route::home_for(Role::User), Route::Feedback);
    }
}
