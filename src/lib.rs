//! Movie Tracker - search, rate and list movies from the terminal
//!
//! A Rust library and CLI for looking movies up in OMDb and keeping
//! per-user ratings, favorites and watch lists in a local SQLite file.
//!
//! # Features
//!
//! - Register and log in with bcrypt-hashed passwords
//! - Search OMDb by title, as a guest or logged in
//! - Rate movies (0.0 - 10.0), one rating per user and movie
//! - Keep favorites and to-watch lists without duplicates

/// Configuration management
pub mod config;
/// Interactive console front end
pub mod console;
/// User registration and login
pub mod credentials;
/// Database handle and migrations
pub mod db;
/// Error types
pub mod error;
/// Ratings and named movie lists
pub mod lists;
/// Logging setup and utilities
pub mod logging;
/// Movie lookup client
pub mod lookup;
/// Typed menu commands
pub mod menu;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Database schema definitions
pub mod schema;
/// Session state machine
pub mod session;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::Database;
pub use error::{Result, TrackerError};
pub use lookup::{MovieLookup, OmdbClient, SearchOutcome};
pub use models::{MovieRecord, Rating};
pub use session::SessionController;
