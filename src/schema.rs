//! Database schema definitions
//!
//! This module provides constants for table and column names used with rusqlite.
//! The tables themselves are created by the embedded migration in `migrations/`.

/// Users table schema
pub mod users {
    /// Table name
    pub const TABLE: &str = "users";
    /// Primary key column
    pub const ID: &str = "id";
    /// Unique login name column
    pub const NAME: &str = "name";
    /// bcrypt hash column (salt embedded)
    pub const PASSWORD_HASH: &str = "password_hash";
}

/// Ratings table schema
pub mod ratings {
    /// Table name
    pub const TABLE: &str = "ratings";
    /// Foreign key to users table
    pub const USER_ID: &str = "user_id";
    /// Movie title column
    pub const MOVIE_NAME: &str = "movie_name";
    /// Score column (0.0 - 10.0)
    pub const RATE: &str = "rate";
}

/// Named movie lists table schema
pub mod lists {
    /// Table name
    pub const TABLE: &str = "lists";
    /// Foreign key to users table
    pub const USER_ID: &str = "user_id";
    /// List name column ("favorites", "to_watch", ...)
    pub const LIST_NAME: &str = "list_name";
    /// Movie title column
    pub const MOVIE_NAME: &str = "movie_name";
}
