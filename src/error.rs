//! Error types for the movie-tracker library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur in the movie-tracker application.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Password hashing or verification failed
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input rejected before reaching a store
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Operation not allowed in the current session state
    #[error("Session error: {0}")]
    Session(String),

    /// Operation needs a logged-in user
    #[error("You must be logged in to do that")]
    NotAuthenticated,
}

/// Convenience type alias for Result with `TrackerError`
pub type Result<T> = std::result::Result<T, TrackerError>;
