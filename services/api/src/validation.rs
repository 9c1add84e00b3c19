//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate a URL slug
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug is required".to_string());
    }

    if slug.len() > 100 {
        return Err("Slug must be at most 100 characters long".to_string());
    }

    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = SLUG_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("Failed to compile slug regex")
    });

    if !regex.is_match(slug) {
        return Err("Slug may only contain lowercase letters, digits, and hyphens".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_upper || !has_lower || !has_digit {
        return Err(
            "Password must contain uppercase and lowercase letters and a digit".to_string(),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("spring-gala-2026").is_ok());
        assert!(validate_slug("about").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Has-Capitals").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug("with space").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Correct1horse").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("nodigitshere").is_err());
    }
}
