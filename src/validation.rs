use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{MAX_RATING, MIN_RATING};

/// Minimum username length
pub const MIN_USERNAME_LEN: usize = 3;
/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

#[allow(clippy::expect_used)]
fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is valid"))
}

/// Validation utilities for console input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a username entered at login
    pub fn validate_login_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Username cannot be empty."));
        }

        Ok(())
    }

    /// Validate a username chosen at registration
    pub fn validate_new_username(name: &str) -> Result<()> {
        Self::validate_login_name(name)?;

        if name.chars().count() < MIN_USERNAME_LEN {
            return Err(anyhow!("Username must be at least {MIN_USERNAME_LEN} characters long."));
        }

        if !username_pattern().is_match(name) {
            return Err(anyhow!("Username can only contain letters, numbers, and underscores."));
        }

        Ok(())
    }

    /// Validate a password entered at login
    pub fn validate_password(password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(anyhow!("Password cannot be empty."));
        }

        Ok(())
    }

    /// Validate a password chosen at registration
    pub fn validate_new_password(password: &str) -> Result<()> {
        Self::validate_password(password)?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(anyhow!("Password must be at least {MIN_PASSWORD_LEN} characters long."));
        }

        Ok(())
    }

    /// Validate a movie title to search for
    pub fn validate_movie_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Please enter a valid movie name."));
        }

        Ok(())
    }

    /// Validate a rating value
    pub fn validate_rating(rate: f64) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&rate) {
            return Err(anyhow!("Rating must be between {MIN_RATING:.1} and {MAX_RATING:.1}"));
        }

        Ok(())
    }

    /// Parse and validate a rating typed by the user
    pub fn parse_rating(input: &str) -> Result<f64> {
        let rate: f64 = input
            .trim()
            .parse()
            .map_err(|_| anyhow!("Please enter a valid number."))?;
        Self::validate_rating(rate)?;
        Ok(rate)
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_string()
    }
}
