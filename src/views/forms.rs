//! Login and registration forms

use crate::api::types::{LoginRequest, RegisterRequest, User};
use crate::app::{Navigator, Route};
use crate::auth::AuthProvider;
use crate::error::Result;
use crate::validation;
use crate::views::inline_error;

pub const REGISTERED_NOTICE: &str = "Registration successful! Please sign in.";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&self) -> Result<()> {
        validation::require(&self.username, "Username")?;
        validation::require(&self.password, "Password")
    }

    /// Sign in and move to the summarize page
    pub async fn submit(&mut self, auth: &AuthProvider, navigator: &Navigator) -> Result<User> {
        self.error = None;
        if let Err(e) = self.validate() {
            self.error = inline_error(&e, "Invalid input");
            return Err(e);
        }

        let request = LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        };
        match auth.login(&request).await {
            Ok(user) => {
                self.password.clear();
                navigator.navigate(Route::Summarize);
                Ok(user)
            }
            Err(e) => {
                self.error = Some(crate::error::display_message(&e, "Login failed"));
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
    error: Option<String>,
}

impl RegisterForm {
    /// An empty `full_name` is sent as absent
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        full_name: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            full_name: full_name.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&self) -> Result<()> {
        validation::validate_email(&self.email)?;
        validation::validate_username(self.username.trim())?;
        validation::validate_password(&self.password, &self.confirm_password)
    }

    fn request(&self) -> RegisterRequest {
        let full_name = self.full_name.trim();
        RegisterRequest {
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            full_name: (!full_name.is_empty()).then(|| full_name.to_string()),
        }
    }

    /// Create the account, then send the user to the login page
    pub async fn submit(&mut self, auth: &AuthProvider, navigator: &Navigator) -> Result<User> {
        self.error = None;
        if let Err(e) = self.validate() {
            self.error = inline_error(&e, "Invalid input");
            return Err(e);
        }

        match auth.register(&self.request()).await {
            Ok(user) => {
                navigator.navigate_with_notice(Route::Login, REGISTERED_NOTICE);
                Ok(user)
            }
            Err(e) => {
                self.error = Some(crate::error::display_message(&e, "Registration failed"));
                Err(e)
            }
        }
    }
}
