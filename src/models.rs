//! Data models for users, ratings, lists and looked-up movies
//!
//! This module contains the records read from and written to the local
//! database, the typed outcomes returned by the stores, and the movie record
//! returned by the lookup service.

use serde::{Deserialize, Deserializer, Serialize};

/// Name of the built-in favorites list
pub const FAVORITES: &str = "favorites";
/// Name of the built-in watch list
pub const TO_WATCH: &str = "to_watch";

/// Lowest accepted rating
pub const MIN_RATING: f64 = 0.0;
/// Highest accepted rating
pub const MAX_RATING: f64 = 10.0;

/// Database representation of a registered user
#[derive(Debug, Clone)]
pub struct User {
    /// Database primary key
    pub id: i64,
    /// Unique login name
    pub name: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

/// A user's score for one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Movie title as returned by the lookup service
    pub movie_name: String,
    /// Score between 0.0 and 10.0
    pub rate: f64,
}

/// Result of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// User created with the given id
    Registered(i64),
    /// A user with that name already exists
    UsernameTaken,
    /// Password and confirmation differ
    PasswordMismatch,
}

impl RegisterOutcome {
    /// Label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered(_) => "registered",
            Self::UsernameTaken => "username_taken",
            Self::PasswordMismatch => "password_mismatch",
        }
    }
}

/// Result of a rating upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOutcome {
    /// Rating inserted or overwritten
    Saved,
    /// Username did not resolve to a user
    UnknownUser,
}

impl RatingOutcome {
    /// Label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::UnknownUser => "unknown_user",
        }
    }
}

/// Result of adding a movie to a named list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListInsertOutcome {
    /// Movie appended to the list
    Added,
    /// Movie was already on the list, nothing changed
    AlreadyPresent,
    /// Username did not resolve to a user
    UnknownUser,
}

impl ListInsertOutcome {
    /// Label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::AlreadyPresent => "already_present",
            Self::UnknownUser => "unknown_user",
        }
    }
}

/// Movie details returned by the lookup service
///
/// OMDb reports missing values as `"N/A"`; those become `None` here so the
/// rest of the application never has to check for the placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Title, also the key used when rating or listing the movie
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year (may be a range for series, e.g. "2008-2013")
    #[serde(rename = "Year", default, deserialize_with = "not_available_as_none")]
    pub year: Option<String>,
    /// Rating classification such as "PG-13"
    #[serde(rename = "Rated", default, deserialize_with = "not_available_as_none")]
    pub rated: Option<String>,
    /// Release date
    #[serde(rename = "Released", default, deserialize_with = "not_available_as_none")]
    pub released: Option<String>,
    /// Runtime, e.g. "148 min"
    #[serde(rename = "Runtime", default, deserialize_with = "not_available_as_none")]
    pub runtime: Option<String>,
    /// Comma separated genres
    #[serde(rename = "Genre", default, deserialize_with = "not_available_as_none")]
    pub genre: Option<String>,
    /// Director(s)
    #[serde(rename = "Director", default, deserialize_with = "not_available_as_none")]
    pub director: Option<String>,
    /// Writer(s)
    #[serde(rename = "Writer", default, deserialize_with = "not_available_as_none")]
    pub writer: Option<String>,
    /// Main cast
    #[serde(rename = "Actors", default, deserialize_with = "not_available_as_none")]
    pub actors: Option<String>,
    /// Short plot summary
    #[serde(rename = "Plot", default, deserialize_with = "not_available_as_none")]
    pub plot: Option<String>,
    /// Spoken language(s)
    #[serde(rename = "Language", default, deserialize_with = "not_available_as_none")]
    pub language: Option<String>,
    /// Production country
    #[serde(rename = "Country", default, deserialize_with = "not_available_as_none")]
    pub country: Option<String>,
    /// Awards summary
    #[serde(rename = "Awards", default, deserialize_with = "not_available_as_none")]
    pub awards: Option<String>,
    /// Aggregate IMDb rating
    #[serde(rename = "imdbRating", default, deserialize_with = "not_available_as_none")]
    pub imdb_rating: Option<String>,
    /// IMDb vote count
    #[serde(rename = "imdbVotes", default, deserialize_with = "not_available_as_none")]
    pub imdb_votes: Option<String>,
}

impl MovieRecord {
    /// Create a record with only a title set
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            year: None,
            rated: None,
            released: None,
            runtime: None,
            genre: None,
            director: None,
            writer: None,
            actors: None,
            plot: None,
            language: None,
            country: None,
            awards: None,
            imdb_rating: None,
            imdb_votes: None,
        }
    }

    /// Labelled detail fields in display order
    #[must_use]
    pub fn details(&self) -> [(&'static str, Option<&str>); 15] {
        [
            ("Title", Some(self.title.as_str())),
            ("Year", self.year.as_deref()),
            ("Rated", self.rated.as_deref()),
            ("Released", self.released.as_deref()),
            ("Runtime", self.runtime.as_deref()),
            ("Genre", self.genre.as_deref()),
            ("Director", self.director.as_deref()),
            ("Writer", self.writer.as_deref()),
            ("Actors", self.actors.as_deref()),
            ("Plot", self.plot.as_deref()),
            ("Language", self.language.as_deref()),
            ("Country", self.country.as_deref()),
            ("Awards", self.awards.as_deref()),
            ("IMDb Rating", self.imdb_rating.as_deref()),
            ("IMDb Votes", self.imdb_votes.as_deref()),
        ]
    }
}

fn not_available_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "N/A"))
}
