//! Ratings and named movie lists, keyed by user.

use rusqlite::params;
use tracing::{debug, info};

use crate::credentials::CredentialStore;
use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::logging::OperationTimer;
use crate::metrics;
use crate::models::{ListInsertOutcome, Rating, RatingOutcome, MAX_RATING, MIN_RATING};
use crate::schema::{lists, ratings};

/// Per-user ratings and list membership
pub struct ListStore<'db> {
    db: &'db Database,
}

impl<'db> ListStore<'db> {
    /// Create a store over an open database
    #[must_use]
    pub const fn new(db: &'db Database) -> Self {
        Self { db }
    }

    fn user_id(&self, username: &str) -> Result<Option<i64>> {
        CredentialStore::new(self.db).lookup_user_id(username)
    }

    /// Insert a rating, or overwrite the existing one for the same movie
    ///
    /// Rates outside 0.0 - 10.0, NaN included, are rejected before the user
    /// is resolved.
    pub fn upsert_rating(&self, username: &str, movie_name: &str, rate: f64) -> Result<RatingOutcome> {
        if !(MIN_RATING..=MAX_RATING).contains(&rate) {
            return Err(TrackerError::Validation(format!(
                "rating {rate} is outside {MIN_RATING:.1} - {MAX_RATING:.1}"
            )));
        }

        let timer = OperationTimer::new("upsert_rating");

        let Some(user_id) = self.user_id(username)? else {
            debug!(username, "Rating rejected: unknown user");
            metrics::record_store_operation("upsert_rating", RatingOutcome::UnknownUser.as_str());
            return Ok(RatingOutcome::UnknownUser);
        };

        self.db.connection().execute(
            &format!(
                "INSERT INTO {table} ({user}, {movie}, {rate}) VALUES (?1, ?2, ?3) \
                 ON CONFLICT({user}, {movie}) DO UPDATE SET {rate} = excluded.{rate}",
                table = ratings::TABLE,
                user = ratings::USER_ID,
                movie = ratings::MOVIE_NAME,
                rate = ratings::RATE
            ),
            params![user_id, movie_name, rate],
        )?;

        timer.finish();
        info!(username, movie_name, rate, "Rating saved");
        metrics::record_store_operation("upsert_rating", RatingOutcome::Saved.as_str());
        Ok(RatingOutcome::Saved)
    }

    /// Add a movie to one of the user's named lists
    pub fn add_to_list(&self, username: &str, list_name: &str, movie_name: &str) -> Result<ListInsertOutcome> {
        let timer = OperationTimer::new("add_to_list");

        let Some(user_id) = self.user_id(username)? else {
            debug!(username, list_name, "List insert rejected: unknown user");
            metrics::record_store_operation("add_to_list", ListInsertOutcome::UnknownUser.as_str());
            return Ok(ListInsertOutcome::UnknownUser);
        };

        let inserted = self.db.connection().execute(
            &format!(
                "INSERT OR IGNORE INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                lists::TABLE,
                lists::USER_ID,
                lists::LIST_NAME,
                lists::MOVIE_NAME
            ),
            params![user_id, list_name, movie_name],
        )?;

        let outcome = if inserted == 0 {
            ListInsertOutcome::AlreadyPresent
        } else {
            ListInsertOutcome::Added
        };

        timer.finish();
        info!(username, list_name, movie_name, outcome = outcome.as_str(), "List updated");
        metrics::record_store_operation("add_to_list", outcome.as_str());
        Ok(outcome)
    }

    /// All ratings of a user, oldest first. Empty for unknown users.
    pub fn get_ratings(&self, username: &str) -> Result<Vec<Rating>> {
        let Some(user_id) = self.user_id(username)? else {
            return Ok(Vec::new());
        };

        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, {} FROM {} WHERE {} = ?1 ORDER BY rowid ASC",
            ratings::MOVIE_NAME,
            ratings::RATE,
            ratings::TABLE,
            ratings::USER_ID
        ))?;
        let rating_iter = stmt.query_map(params![user_id], |row| {
            Ok(Rating {
                movie_name: row.get(0)?,
                rate: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for rating in rating_iter {
            results.push(rating?);
        }

        Ok(results)
    }

    /// Movies on one of the user's lists, in the order they were added
    pub fn get_list(&self, username: &str, list_name: &str) -> Result<Vec<String>> {
        let Some(user_id) = self.user_id(username)? else {
            return Ok(Vec::new());
        };

        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} = ?1 AND {} = ?2 ORDER BY rowid ASC",
            lists::MOVIE_NAME,
            lists::TABLE,
            lists::USER_ID,
            lists::LIST_NAME
        ))?;
        let movie_iter = stmt.query_map(params![user_id, list_name], |row| row.get::<_, String>(0))?;

        let mut results = Vec::new();
        for movie in movie_iter {
            results.push(movie?);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FAVORITES, TO_WATCH};

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        CredentialStore::with_cost(&db, 4)
            .register("alice", "secret1", "secret1")
            .unwrap();
        db
    }

    #[test]
    fn test_upsert_overwrites_existing_rating() {
        let db = seeded();
        let store = ListStore::new(&db);

        assert_eq!(store.upsert_rating("alice", "Movie X", 7.0).unwrap(), RatingOutcome::Saved);
        assert_eq!(store.upsert_rating("alice", "Movie X", 9.0).unwrap(), RatingOutcome::Saved);

        let ratings = store.get_ratings("alice").unwrap();
        assert_eq!(
            ratings,
            vec![Rating {
                movie_name: "Movie X".to_string(),
                rate: 9.0
            }]
        );
    }

    #[test]
    fn test_upsert_rejects_out_of_range_rates() {
        let db = seeded();
        let store = ListStore::new(&db);

        for rate in [-0.1, 10.01, 42.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(store.upsert_rating("alice", "Heat", rate), Err(TrackerError::Validation(_))),
                "rate {rate}"
            );
        }
        assert_eq!(store.upsert_rating("alice", "Heat", 0.0).unwrap(), RatingOutcome::Saved);
        assert_eq!(store.upsert_rating("alice", "Heat", 10.0).unwrap(), RatingOutcome::Saved);
        assert_eq!(store.get_ratings("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_lists_are_independent() {
        let db = seeded();
        let store = ListStore::new(&db);

        assert_eq!(store.add_to_list("alice", FAVORITES, "Heat").unwrap(), ListInsertOutcome::Added);
        assert_eq!(store.add_to_list("alice", TO_WATCH, "Heat").unwrap(), ListInsertOutcome::Added);
        assert_eq!(store.add_to_list("alice", TO_WATCH, "Ran").unwrap(), ListInsertOutcome::Added);

        assert_eq!(store.get_list("alice", FAVORITES).unwrap(), vec!["Heat"]);
        assert_eq!(store.get_list("alice", TO_WATCH).unwrap(), vec!["Heat", "Ran"]);
    }

    #[test]
    fn test_unknown_user_mutations_are_tagged() {
        let db = seeded();
        let store = ListStore::new(&db);

        assert_eq!(store.upsert_rating("nobody", "Heat", 5.0).unwrap(), RatingOutcome::UnknownUser);
        assert_eq!(
            store.add_to_list("nobody", FAVORITES, "Heat").unwrap(),
            ListInsertOutcome::UnknownUser
        );
    }
}
