//! Session controller
//!
//! Holds the logged-in user for the lifetime of one run and routes requests
//! to the credential store, the list store and the movie lookup. The session
//! is either [`SessionState::Anonymous`] or [`SessionState::Authenticated`];
//! only `login` and `logout` move between the two.

use tracing::info;

use crate::credentials::CredentialStore;
use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::lists::ListStore;
use crate::lookup::{LookupError, MovieLookup, SearchOutcome};
use crate::models::{ListInsertOutcome, Rating, RatingOutcome, RegisterOutcome};
use crate::validation::InputValidator;

/// Who, if anyone, is logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No user logged in
    Anonymous,
    /// A user passed authentication
    Authenticated {
        /// Name the user logged in with
        username: String,
    },
}

/// Routes requests for one interactive session
pub struct SessionController<'db, L> {
    credentials: CredentialStore<'db>,
    lists: ListStore<'db>,
    lookup: L,
    state: SessionState,
}

impl<'db, L: MovieLookup> SessionController<'db, L> {
    /// Start an anonymous session; `bcrypt_cost` applies to new registrations
    #[must_use]
    pub fn new(db: &'db Database, lookup: L, bcrypt_cost: u32) -> Self {
        Self {
            credentials: CredentialStore::with_cost(db, bcrypt_cost),
            lists: ListStore::new(db),
            lookup,
            state: SessionState::Anonymous,
        }
    }

    /// Current login state
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name of the logged-in user, if any
    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::Authenticated { username } => Some(username),
        }
    }

    /// Look a movie up. Allowed in both states; never touches the database.
    pub async fn search(&self, title: &str) -> std::result::Result<SearchOutcome, LookupError> {
        self.lookup.search(title.trim()).await
    }

    /// Authenticate and, on success, become [`SessionState::Authenticated`]
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        if let Some(current) = self.current_user() {
            return Err(TrackerError::Session(format!("already logged in as {current}")));
        }

        let username = username.trim();
        if !self.credentials.authenticate(username, password)? {
            info!(username, "Login failed");
            return Ok(false);
        }

        info!(username, "Logged in");
        self.state = SessionState::Authenticated {
            username: username.to_string(),
        };
        Ok(true)
    }

    /// Return to [`SessionState::Anonymous`], yielding the user that was logged in
    pub fn logout(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, SessionState::Anonymous) {
            SessionState::Anonymous => None,
            SessionState::Authenticated { username } => {
                info!(username = username.as_str(), "Logged out");
                Some(username)
            },
        }
    }

    /// Create an account. Does not log the new user in.
    pub fn register(&self, username: &str, password: &str, confirm_password: &str) -> Result<RegisterOutcome> {
        self.credentials.register(username.trim(), password, confirm_password)
    }

    /// Rate a movie as the logged-in user
    pub fn rate(&self, movie_name: &str, rate: f64) -> Result<RatingOutcome> {
        let username = self.require_user()?;
        InputValidator::validate_rating(rate).map_err(|e| TrackerError::Validation(e.to_string()))?;
        self.lists.upsert_rating(username, movie_name, rate)
    }

    /// Put a movie on one of the logged-in user's lists
    pub fn add_to_list(&self, list_name: &str, movie_name: &str) -> Result<ListInsertOutcome> {
        let username = self.require_user()?;
        if list_name.trim().is_empty() {
            return Err(TrackerError::Validation("list name cannot be empty".to_string()));
        }
        self.lists.add_to_list(username, list_name, movie_name)
    }

    /// The logged-in user's ratings
    pub fn ratings(&self) -> Result<Vec<Rating>> {
        let username = self.require_user()?;
        self.lists.get_ratings(username)
    }

    /// Movies on one of the logged-in user's lists
    pub fn list(&self, list_name: &str) -> Result<Vec<String>> {
        let username = self.require_user()?;
        self.lists.get_list(username, list_name)
    }

    fn require_user(&self) -> Result<&str> {
        self.current_user().ok_or(TrackerError::NotAuthenticated)
    }
}
