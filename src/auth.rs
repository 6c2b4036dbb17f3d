//! Authentication state
//!
//! [`AuthProvider`] owns the signed-in user for the lifetime of the
//! application context. It starts in [`AuthState::Checking`], settles after
//! [`AuthProvider::init`], and moves between `Unauthenticated` and
//! `Authenticated` on login, logout, and 401 responses.

use std::sync::{Arc, RwLock};

use crate::api::types::{LoginRequest, RegisterRequest, User, VerifyResponse};
use crate::api::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Initial token check has not finished
    Checking,
    Unauthenticated,
    Authenticated(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Login/logout/register operations over the API client
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct AuthProvider {
    api: ApiClient,
    state: Arc<RwLock<AuthState>>,
}

impl AuthProvider {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AuthState::Checking)),
        }
    }

    pub fn state(&self) -> AuthState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_state(&self, next: AuthState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    /// Restore the session from a stored token
    ///
    /// With a token, the profile is fetched from `/auth/me`; on any failure
    /// the stored credentials are cleared and the state settles as
    /// unauthenticated.
    pub async fn init(&self) -> AuthState {
        let token = match self.api.store().token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read stored token: {}", e);
                None
            }
        };

        if token.is_none() {
            self.set_state(AuthState::Unauthenticated);
            return self.state();
        }

        match self.api.current_user().await {
            Ok(user) => {
                if let Err(e) = self.api.store().set_user(&user) {
                    tracing::warn!("Could not cache user profile: {}", e);
                }
                tracing::info!(user = %user.username, "Restored session");
                self.set_state(AuthState::Authenticated(user));
            }
            Err(e) => {
                tracing::warn!("Auth check failed: {}", e);
                if let Err(e) = self.api.store().clear() {
                    tracing::warn!("Could not clear stored credentials: {}", e);
                }
                self.set_state(AuthState::Unauthenticated);
            }
        }
        self.state()
    }

    /// Exchange credentials for a token, then fetch and cache the user
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let token = self.api.login(request).await?;
        self.api.store().set_token(&token.access_token)?;

        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(e) => {
                self.api.store().clear()?;
                self.set_state(AuthState::Unauthenticated);
                return Err(e);
            }
        };
        self.api.store().set_user(&user)?;
        tracing::info!(user = %user.username, "Logged in");
        self.set_state(AuthState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Create an account; does not sign in
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let user = self.api.register(request).await?;
        tracing::info!(user = %user.username, "Registered account");
        Ok(user)
    }

    /// Clear token and user immediately
    pub fn logout(&self) -> Result<()> {
        self.set_state(AuthState::Unauthenticated);
        self.api.store().clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Ask the server whether the stored token is still valid
    pub async fn verify(&self) -> Result<VerifyResponse> {
        self.api.verify_token().await
    }

    /// Drop to unauthenticated after the server rejected the token
    ///
    /// Credentials are already cleared by the API client at this point.
    pub fn mark_signed_out(&self) {
        self.set_state(AuthState::Unauthenticated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_utils::offline_api;

    fn provider_with_store(store: MemoryStore) -> AuthProvider {
        AuthProvider::new(offline_api(Arc::new(store)))
    }

    #[test]
    fn test_starts_checking() {
        let auth = provider_with_store(MemoryStore::new());
        assert_eq!(auth.state(), AuthState::Checking);
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_init_without_token_is_unauthenticated_without_network() {
        let auth = provider_with_store(MemoryStore::new());
        assert_eq!(auth.init().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_init_with_unreachable_server_clears_token() {
        let auth = provider_with_store(MemoryStore::with_token("tok"));
        assert_eq!(auth.init().await, AuthState::Unauthenticated);
        assert!(auth.api.store().token().unwrap().is_none());
    }

    #[test]
    fn test_logout_clears_everything() {
        let auth = provider_with_store(MemoryStore::with_token("tok"));
        auth.logout().unwrap();
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert!(auth.api.store().token().unwrap().is_none());
    }
}
