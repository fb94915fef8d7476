//! Credential store: registered users and their password hashes.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::metrics;
use crate::models::{RegisterOutcome, User};
use crate::schema::users;

/// Users table access with bcrypt hashing
pub struct CredentialStore<'db> {
    db: &'db Database,
    cost: u32,
}

impl<'db> CredentialStore<'db> {
    /// Create a store using `bcrypt::DEFAULT_COST`
    #[must_use]
    pub const fn new(db: &'db Database) -> Self {
        Self::with_cost(db, bcrypt::DEFAULT_COST)
    }

    /// Create a store with an explicit bcrypt cost (4..=31)
    #[must_use]
    pub const fn with_cost(db: &'db Database, cost: u32) -> Self {
        Self { db, cost }
    }

    /// Register a new user
    ///
    /// Only the bcrypt hash is written. The lookup up front skips hashing for
    /// names already taken; the unique `name` column and the conflict clause
    /// on the insert are what keep a name from being registered twice.
    pub fn register(&self, username: &str, password: &str, confirm_password: &str) -> Result<RegisterOutcome> {
        if password != confirm_password {
            debug!(username, "Registration rejected: passwords differ");
            return Ok(RegisterOutcome::PasswordMismatch);
        }

        if self.find_user(username)?.is_some() {
            info!(username, "Registration rejected: name taken");
            metrics::record_store_operation("register", RegisterOutcome::UsernameTaken.as_str());
            return Ok(RegisterOutcome::UsernameTaken);
        }

        let password_hash = bcrypt::hash(password, self.cost)?;

        let conn = self.db.connection();
        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}) VALUES (?1, ?2) ON CONFLICT({}) DO NOTHING",
                users::TABLE,
                users::NAME,
                users::PASSWORD_HASH,
                users::NAME
            ),
            params![username, password_hash],
        )?;
        let outcome = if inserted == 0 {
            RegisterOutcome::UsernameTaken
        } else {
            RegisterOutcome::Registered(conn.last_insert_rowid())
        };

        info!(username, outcome = outcome.as_str(), "Registration finished");
        metrics::record_store_operation("register", outcome.as_str());
        Ok(outcome)
    }

    /// Check a username/password pair
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let Some(user) = self.find_user(username)? else {
            debug!(username, "Login failed: unknown user");
            metrics::record_login(false);
            return Ok(false);
        };

        let valid = match bcrypt::verify(password, &user.password_hash) {
            Ok(valid) => valid,
            Err(err) => {
                warn!(username, error = %err, "Stored password hash is unreadable");
                false
            },
        };

        metrics::record_login(valid);
        Ok(valid)
    }

    /// Resolve a username to its user id
    pub fn lookup_user_id(&self, username: &str) -> Result<Option<i64>> {
        let id = self
            .db
            .connection()
            .query_row(
                &format!("SELECT {} FROM {} WHERE {} = ?1", users::ID, users::TABLE, users::NAME),
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Get a user by exact name
    pub fn find_user(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .db
            .connection()
            .query_row(
                &format!(
                    "SELECT {}, {}, {} FROM {} WHERE {} = ?1",
                    users::ID,
                    users::NAME,
                    users::PASSWORD_HASH,
                    users::TABLE,
                    users::NAME
                ),
                params![username],
                map_user,
            )
            .optional()?;
        Ok(user)
    }
}

/// Map a database row to a User
fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(users::ID)?,
        name: row.get(users::NAME)?,
        password_hash: row.get(users::PASSWORD_HASH)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_register_and_authenticate() {
        let db = Database::open_in_memory().unwrap();
        let store = CredentialStore::with_cost(&db, TEST_COST);

        let outcome = store.register("alice", "secret1", "secret1").unwrap();
        assert!(matches!(outcome, RegisterOutcome::Registered(_)));
        assert!(store.authenticate("alice", "secret1").unwrap());
        assert!(!store.authenticate("alice", "wrong").unwrap());
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let db = Database::open_in_memory().unwrap();
        let store = CredentialStore::with_cost(&db, TEST_COST);
        store.register("alice", "secret1", "secret1").unwrap();

        let user = store.find_user("alice").unwrap().unwrap();
        assert_ne!(user.password_hash, "secret1");
        assert!(user.password_hash.starts_with("$2"));
    }

    #[test]
    fn test_unreadable_hash_fails_login() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute(
                "INSERT INTO users (name, password_hash) VALUES ('mallory', 'not-a-hash')",
                [],
            )
            .unwrap();
        let store = CredentialStore::with_cost(&db, TEST_COST);

        assert!(!store.authenticate("mallory", "not-a-hash").unwrap());
    }

    #[test]
    fn test_lookup_user_id_matches_registration() {
        let db = Database::open_in_memory().unwrap();
        let store = CredentialStore::with_cost(&db, TEST_COST);

        let RegisterOutcome::Registered(id) = store.register("bob", "hunter22", "hunter22").unwrap() else {
            panic!("registration should succeed");
        };
        assert_eq!(store.lookup_user_id("bob").unwrap(), Some(id));
        assert_eq!(store.lookup_user_id("Bob").unwrap(), None);
    }

    #[test]
    fn test_duplicate_registration_keeps_first_row() {
        let db = Database::open_in_memory().unwrap();
        let store = CredentialStore::with_cost(&db, TEST_COST);

        let RegisterOutcome::Registered(id) = store.register("carol", "first-pass", "first-pass").unwrap() else {
            panic!("registration should succeed");
        };
        let first = store.find_user("carol").unwrap().unwrap();

        assert_eq!(
            store.register("carol", "second-pass", "second-pass").unwrap(),
            RegisterOutcome::UsernameTaken
        );
        let kept = store.find_user("carol").unwrap().unwrap();
        assert_eq!(kept.id, id);
        assert_eq!(kept.password_hash, first.password_hash);
        assert!(!store.authenticate("carol", "second-pass").unwrap());
    }
}
