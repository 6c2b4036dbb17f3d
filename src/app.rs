//! Application context, routes and the route guard
//!
//! [`AppContext`] is built once at startup and passed to every view. It
//! owns the API client, the auth provider and the [`Navigator`], and wires
//! the client's session-expired hook so that a 401 from any request drops
//! the user back to [`Route::Login`].

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::api::ApiClient;
use crate::auth::{AuthProvider, AuthState};
use crate::config::Config;
use crate::error::Result;
use crate::storage::{self, CredentialStore};

pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    Summarize,
    Chat,
    History,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Summarize => "/summarize",
            Self::Chat => "/chat",
            Self::History => "/history",
        }
    }

    /// Unknown paths resolve to the landing page.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/summarize" | "/home" => Self::Summarize,
            "/chat" => Self::Chat,
            "/history" => Self::History,
            _ => Self::Landing,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Summarize | Self::Chat | Self::History)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decide which route to show for a requested one
///
/// Returns `None` while the initial auth check is still running.
pub fn guard(requested: Route, state: &AuthState) -> Option<Route> {
    match state {
        AuthState::Checking => None,
        AuthState::Unauthenticated if requested.is_protected() => Some(Route::Login),
        AuthState::Authenticated(_) if matches!(requested, Route::Login | Route::Register) => {
            Some(Route::Summarize)
        }
        _ => Some(requested),
    }
}

#[derive(Debug, Clone)]
struct NavState {
    route: Route,
    notice: Option<String>,
}

/// Current route plus a one-shot notice for the next screen
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct Navigator {
    inner: Arc<RwLock<NavState>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            inner: Arc::new(RwLock::new(NavState {
                route: initial,
                notice: None,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut NavState) -> R) -> R {
        match self.inner.write() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn current(&self) -> Route {
        self.with_state(|s| s.route)
    }

    pub fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "Navigate");
        self.with_state(|s| s.route = route);
    }

    pub fn navigate_with_notice(&self, route: Route, notice: impl Into<String>) {
        let notice = notice.into();
        self.with_state(|s| {
            s.route = route;
            s.notice = Some(notice);
        });
    }

    pub fn take_notice(&self) -> Option<String> {
        self.with_state(|s| s.notice.take())
    }
}

/// Everything a view needs, created at startup and torn down at exit
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub api: ApiClient,
    pub auth: AuthProvider,
    pub navigator: Navigator,
}

impl AppContext {
    /// Open the configured credential store and restore any session
    pub async fn init(config: Config) -> Result<Self> {
        let store = storage::open_store(&config.storage)?;
        Self::init_with_store(config, store).await
    }

    pub async fn init_with_store(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let api = ApiClient::from_config(&config.api, store)?;
        let auth = AuthProvider::new(api.clone());
        let navigator = Navigator::new(Route::Landing);

        let hook_auth = auth.clone();
        let hook_nav = navigator.clone();
        api.on_session_expired(Arc::new(move || {
            let was_signed_in = hook_auth.is_authenticated();
            hook_auth.mark_signed_out();
            if was_signed_in {
                hook_nav.navigate_with_notice(Route::Login, SESSION_EXPIRED_NOTICE);
            } else {
                hook_nav.navigate(Route::Login);
            }
        }));

        auth.init().await;

        Ok(Self {
            config,
            api,
            auth,
            navigator,
        })
    }

    /// Navigate to `requested` through the route guard
    ///
    /// Returns the route actually shown.
    pub fn enter(&self, requested: Route) -> Route {
        let target = guard(requested, &self.auth.state()).unwrap_or(Route::Landing);
        if target != requested {
            tracing::debug!(requested = %requested, target = %target, "Route guard redirect");
        }
        self.navigator.navigate(target);
        target
    }

    /// Release the session-expired hook (it holds clones of auth/navigator)
    pub fn shutdown(self) {
        self.api.clear_session_expired_hook();
        tracing::debug!("Application context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_user as user;

    #[test]
    fn test_guard_redirects_protected_routes_when_logged_out() {
        for route in [Route::Summarize, Route::Chat, Route::History] {
            assert_eq!(guard(route, &AuthState::Unauthenticated), Some(Route::Login));
        }
        assert_eq!(guard(Route::Landing, &AuthState::Unauthenticated), Some(Route::Landing));
        assert_eq!(guard(Route::Register, &AuthState::Unauthenticated), Some(Route::Register));
    }

    #[test]
    fn test_guard_waits_while_checking() {
        assert_eq!(guard(Route::Chat, &AuthState::Checking), None);
    }

    #[test]
    fn test_guard_authenticated() {
        let state = AuthState::Authenticated(user());
        assert_eq!(guard(Route::Chat, &state), Some(Route::Chat));
        assert_eq!(guard(Route::Login, &state), Some(Route::Summarize));
        assert_eq!(guard(Route::Register, &state), Some(Route::Summarize));
    }

    #[test]
    fn test_route_paths_roundtrip() {
        for route in [
            Route::Landing,
            Route::Login,
            Route::Register,
            Route::Summarize,
            Route::Chat,
            Route::History,
        ] {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::from_path("/home"), Route::Summarize);
        assert_eq!(Route::from_path("/nowhere"), Route::Landing);
    }

    #[test]
    fn test_navigator_notice_is_one_shot() {
        let nav = Navigator::new(Route::Landing);
        nav.navigate_with_notice(Route::Login, "Registered");
        assert_eq!(nav.current(), Route::Login);
        assert_eq!(nav.take_notice().as_deref(), Some("Registered"));
        assert!(nav.take_notice().is_none());
    }
}
