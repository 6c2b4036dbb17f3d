//! Client-side field validation for the login, register and summarize forms
//!
//! A failed check yields [`SynopsisError::Validation`] and no request is
//! sent.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, SynopsisError};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username regex"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    SynopsisError::Validation(message.into()).into()
}

pub fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    require(username, "Username")?;
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(invalid(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username_pattern().is_match(username) {
        return Err(invalid(
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    require(email, "Email")?;
    if !email_pattern().is_match(email.trim()) {
        return Err(invalid("Please enter a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(invalid("Passwords do not match"));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(invalid(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

/// Text to summarize must contain something besides whitespace
pub fn validate_summary_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(invalid("Please enter the text to summarize"));
    }
    Ok(())
}

/// URL to summarize: non-empty, absolute, http(s)
pub fn validate_summary_url(raw: &str) -> Result<url::Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("Please enter the URL to summarize"));
    }
    let parsed = url::Url::parse(raw).map_err(|_| invalid(format!("Invalid URL: {}", raw)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("Only http and https URLs can be summarized"));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("a-b").is_ok());
        assert!(message(validate_username("ab")).contains("between 3 and 50"));
        assert!(validate_username(&"x".repeat(51)).is_err());
        assert!(message(validate_username("bad name")).contains("letters, digits"));
        assert!(message(validate_username("   ")).contains("required"));
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("alice example.com").is_err());
    }

    #[test]
    fn test_password_mismatch_checked_first() {
        assert_eq!(message(validate_password("abc", "abd")), "Passwords do not match");
        assert_eq!(
            message(validate_password("abc", "abc")),
            "Password must be at least 6 characters"
        );
        assert!(validate_password("secret1", "secret1").is_ok());
    }

    #[test]
    fn test_summary_text_whitespace_is_empty() {
        assert!(validate_summary_text(" \n\t ").is_err());
        assert!(validate_summary_text("The quick brown fox").is_ok());
    }

    #[test]
    fn test_summary_url_rules() {
        assert!(validate_summary_url("  ").is_err());
        assert!(validate_summary_url("example.com/article").is_err());
        assert!(validate_summary_url("ftp://example.com/file").is_err());
        let url = validate_summary_url(" https://example.com/article ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/article");
    }

    #[test]
    fn test_errors_are_validation_variant() {
        let err = validate_summary_text("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SynopsisError>(),
            Some(SynopsisError::Validation(_))
        ));
    }
}
