//! Console front end
//!
//! Prompts, rendering and the interactive loop that drives a
//! [`SessionController`]. Input reads and lookups race Ctrl-C so an
//! interrupt ends the loop cleanly instead of killing the process with the
//! database still open.

use std::fmt::Display;
use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::lookup::{MovieLookup, SearchOutcome};
use crate::menu::{AccountCommand, ListView, MainCommand, Menu, MovieAction};
use crate::models::{ListInsertOutcome, MovieRecord, Rating, RatingOutcome, RegisterOutcome, FAVORITES, TO_WATCH};
use crate::session::SessionController;
use crate::validation::InputValidator;

const RULE_WIDTH: usize = 60;
const LIST_RULE_WIDTH: usize = 50;

/// Why reading from the console stopped
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Ctrl-C while waiting for input
    #[error("interrupted")]
    Interrupted,

    /// Input reached end of file
    #[error("input closed")]
    Closed,

    /// Reading or writing the terminal failed
    #[error("console I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Pending Ctrl-C notification
type Interrupt = Pin<Box<dyn Future<Output = io::Result<()>>>>;

/// Line-oriented console over any async reader and blocking writer
pub struct Console<R, W> {
    input: Lines<R>,
    output: W,
    // Lives as long as the console so a Ctrl-C between awaits (during a
    // bcrypt hash, say) is still seen at the next await
    interrupt: Interrupt,
}

impl Console<BufReader<Stdin>, io::Stdout> {
    /// Console over the process's stdin and stdout
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    /// Console over `input`, writing prompts and results to `output`
    pub fn new(input: R, output: W) -> Self {
        Self::with_interrupt(input, output, tokio::signal::ctrl_c())
    }

    /// Like [`Console::new`], but stop when `interrupt` completes instead of on Ctrl-C
    pub fn with_interrupt(input: R, output: W, interrupt: impl Future<Output = io::Result<()>> + 'static) -> Self {
        Self {
            input: input.lines(),
            output,
            interrupt: Box::pin(interrupt),
        }
    }

    /// Give back the writer, e.g. to inspect captured output
    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, text: impl Display) -> Result<(), ConsoleError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    async fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let line = tokio::select! {
            line = self.input.next_line() => line?,
            signal = &mut self.interrupt => {
                signal?;
                return Err(ConsoleError::Interrupted);
            },
        };

        line.ok_or(ConsoleError::Closed)
    }

    /// Run `task` unless Ctrl-C arrives first
    async fn interruptible<F: Future>(&mut self, task: F) -> Result<F::Output, ConsoleError> {
        tokio::select! {
            output = task => Ok(output),
            signal = &mut self.interrupt => {
                signal?;
                Err(ConsoleError::Interrupted)
            },
        }
    }

    async fn pause(&mut self) -> Result<(), ConsoleError> {
        self.read_line("Press Enter to continue...").await.map(|_| ())
    }

    /// Read a menu selection, re-prompting until it is valid
    async fn choose<M: Menu>(&mut self) -> Result<M, ConsoleError> {
        loop {
            let line = self.read_line("Your choice: ").await?;
            match line.trim().parse::<u32>() {
                Ok(choice) => match M::from_choice(choice) {
                    Some(command) => return Ok(command),
                    None => self.say(format!("Invalid choice. Please pick 1-{}.", M::ENTRIES.len()))?,
                },
                Err(_) => self.say("Please enter a valid number.")?,
            }
        }
    }

    async fn read_movie_name(&mut self) -> Result<String, ConsoleError> {
        loop {
            let name = InputValidator::sanitize_text(&self.read_line("Movie name: ").await?);
            match InputValidator::validate_movie_name(&name) {
                Ok(()) => return Ok(name),
                Err(e) => self.say(e)?,
            }
        }
    }

    async fn read_credentials(&mut self) -> Result<(String, String), ConsoleError> {
        loop {
            let username = InputValidator::sanitize_text(&self.read_line("Username: ").await?);
            if let Err(e) = InputValidator::validate_login_name(&username) {
                self.say(e)?;
                continue;
            }

            let password = self.read_line("Password: ").await?;
            if let Err(e) = InputValidator::validate_password(&password) {
                self.say(e)?;
                continue;
            }

            return Ok((username, password));
        }
    }

    async fn read_new_user(&mut self) -> Result<(String, String, String), ConsoleError> {
        loop {
            let username = InputValidator::sanitize_text(&self.read_line("Username: ").await?);
            if let Err(e) = InputValidator::validate_new_username(&username) {
                self.say(e)?;
                continue;
            }

            let password = self.read_line("Password: ").await?;
            if let Err(e) = InputValidator::validate_new_password(&password) {
                self.say(e)?;
                continue;
            }

            let confirm_password = self.read_line("Confirm Password: ").await?;
            if password != confirm_password {
                self.say("Passwords do not match.")?;
                continue;
            }

            return Ok((username, password, confirm_password));
        }
    }

    async fn read_rating(&mut self) -> Result<f64, ConsoleError> {
        loop {
            let line = self.read_line("Enter your rating (0.0 - 10.0): ").await?;
            match InputValidator::parse_rating(&line) {
                Ok(rate) => return Ok(rate),
                Err(e) => self.say(e)?,
            }
        }
    }
}

/// Render the detail block for one movie
#[must_use]
pub fn render_movie(movie: &MovieRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut text = format!(
        "{rule}\n🎬 {} ({})\n{rule}\n",
        movie.title,
        movie.year.as_deref().unwrap_or("N/A")
    );
    for (label, value) in movie.details() {
        text.push_str(&format!("{label:<12}: {}\n", value.unwrap_or("N/A")));
    }
    text.push_str(&rule);
    text
}

/// Render a user's ratings table
#[must_use]
pub fn render_ratings(ratings: &[Rating]) -> String {
    if ratings.is_empty() {
        return "You haven't rated any movies yet.".to_string();
    }

    let rule = "=".repeat(LIST_RULE_WIDTH);
    let mut text = format!("\n{rule}\nYour Movie Ratings\n{rule}\n");
    for rating in ratings {
        text.push_str(&format!("{:<30} : {}/10.0\n", rating.movie_name, format_rate(rating.rate)));
    }
    text.push_str(&rule);
    text
}

/// Render one of a user's named lists
#[must_use]
pub fn render_list(list_name: &str, movies: &[String]) -> String {
    let label = list_label(list_name);
    if movies.is_empty() {
        return format!("Your {label} is empty.");
    }

    let rule = "=".repeat(LIST_RULE_WIDTH);
    let mut text = format!("\n{rule}\nYour {}\n{rule}\n", title_case(label));
    for (i, movie) in movies.iter().enumerate() {
        text.push_str(&format!("{}. {movie}\n", i + 1));
    }
    text.push_str(&rule);
    text
}

/// A rate exactly as stored, with at least one decimal place
fn format_rate(rate: f64) -> String {
    let text = rate.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

fn list_label(list_name: &str) -> &str {
    match list_name {
        FAVORITES => "favorites list",
        TO_WATCH => "watchlist",
        other => other,
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// What ended a turn of the loop
enum Stop {
    Console(ConsoleError),
    Tracker(TrackerError),
}

impl From<ConsoleError> for Stop {
    fn from(err: ConsoleError) -> Self {
        Self::Console(err)
    }
}

impl From<TrackerError> for Stop {
    fn from(err: TrackerError) -> Self {
        Self::Tracker(err)
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Run the interactive loop until the user exits, input ends or Ctrl-C
///
/// Store failures are fatal and returned; lookup failures are shown and the
/// session carries on.
pub async fn run<L, R, W>(session: &mut SessionController<'_, L>, console: &mut Console<R, W>) -> Result<(), TrackerError>
where
    L: MovieLookup,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let turn = if session.current_user().is_some() {
            account_turn(session, console).await
        } else {
            main_turn(session, console).await
        };

        match turn {
            Ok(Flow::Continue) => {},
            Ok(Flow::Exit) => return Ok(()),
            Err(Stop::Console(ConsoleError::Io(err))) => return Err(TrackerError::Io(err)),
            Err(Stop::Console(reason)) => {
                info!(%reason, "Console loop stopped");
                // Best effort, the terminal may already be gone
                let _ = console.say("\nGoodbye!");
                return Ok(());
            },
            Err(Stop::Tracker(err)) => return Err(err),
        }
    }
}

async fn main_turn<L, R, W>(session: &mut SessionController<'_, L>, console: &mut Console<R, W>) -> Result<Flow, Stop>
where
    L: MovieLookup,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say(format!("{0} Welcome to Movie Tracker {0}", "=".repeat(10)))?;
    console.say(MainCommand::render())?;

    match console.choose::<MainCommand>().await? {
        MainCommand::Search => {
            let name = console.read_movie_name().await?;
            search(session, console, &name).await?;
            console.pause().await?;
        },
        MainCommand::Login => {
            let (username, password) = console.read_credentials().await?;
            if session.login(&username, &password)? {
                console.say(format!("{0} Logged in successfully {0}", "=".repeat(20)))?;
            } else {
                console.say("Incorrect username or password")?;
            }
            console.pause().await?;
        },
        MainCommand::Register => {
            let (username, password, confirm_password) = console.read_new_user().await?;
            let message = match session.register(&username, &password, &confirm_password)? {
                RegisterOutcome::Registered(_) => format!("{0} Registered successfully {0}", "=".repeat(20)),
                RegisterOutcome::UsernameTaken => format!("Registration failed: the username '{username}' is taken."),
                RegisterOutcome::PasswordMismatch => "Registration failed: passwords don't match.".to_string(),
            };
            console.say(message)?;
            console.pause().await?;
        },
        MainCommand::Exit => {
            console.say("Thank you for using Movie Tracker!")?;
            return Ok(Flow::Exit);
        },
    }

    Ok(Flow::Continue)
}

async fn account_turn<L, R, W>(session: &mut SessionController<'_, L>, console: &mut Console<R, W>) -> Result<Flow, Stop>
where
    L: MovieLookup,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let username = session.current_user().unwrap_or_default().to_string();
    console.say(format!("Welcome, {username}!"))?;
    console.say(AccountCommand::render())?;

    match console.choose::<AccountCommand>().await? {
        AccountCommand::Search => {
            let name = console.read_movie_name().await?;
            match search(session, console, &name).await? {
                Some(movie) => movie_actions(session, console, &movie).await?,
                None => console.pause().await?,
            }
        },
        AccountCommand::ViewLists => {
            console.say("My Lists:")?;
            console.say(ListView::render())?;
            let text = match console.choose::<ListView>().await? {
                ListView::Ratings => render_ratings(&session.ratings()?),
                ListView::Favorites => render_list(FAVORITES, &session.list(FAVORITES)?),
                ListView::WatchList => render_list(TO_WATCH, &session.list(TO_WATCH)?),
                ListView::Back => return Ok(Flow::Continue),
            };
            console.say(text)?;
            console.pause().await?;
        },
        AccountCommand::Logout => {
            session.logout();
            console.say("Logged out successfully!")?;
            console.pause().await?;
        },
    }

    Ok(Flow::Continue)
}

async fn movie_actions<L, R, W>(session: &SessionController<'_, L>, console: &mut Console<R, W>, movie: &MovieRecord) -> Result<(), Stop>
where
    L: MovieLookup,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say(MovieAction::render())?;
    let title = &movie.title;

    let message = match console.choose::<MovieAction>().await? {
        MovieAction::Rate => {
            let rate = console.read_rating().await?;
            match session.rate(title, rate)? {
                RatingOutcome::Saved => format!("Rating of {}/10.0 added for {title}", format_rate(rate)),
                RatingOutcome::UnknownUser => "Failed to add rating: your account no longer exists.".to_string(),
            }
        },
        MovieAction::AddToFavorites => list_message(session.add_to_list(FAVORITES, title)?, title, FAVORITES),
        MovieAction::AddToWatchList => list_message(session.add_to_list(TO_WATCH, title)?, title, TO_WATCH),
        MovieAction::Back => return Ok(()),
    };

    console.say(message)?;
    console.pause().await?;
    Ok(())
}

fn list_message(outcome: ListInsertOutcome, title: &str, list_name: &str) -> String {
    let label = list_label(list_name);
    match outcome {
        ListInsertOutcome::Added => format!("{title} added to your {label}!"),
        ListInsertOutcome::AlreadyPresent => format!("{title} is already in your {label}."),
        ListInsertOutcome::UnknownUser => format!("Failed to add {title}: your account no longer exists."),
    }
}

/// Search and show the result; yields the movie when one was found
async fn search<L, R, W>(session: &SessionController<'_, L>, console: &mut Console<R, W>, name: &str) -> Result<Option<MovieRecord>, Stop>
where
    L: MovieLookup,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match console.interruptible(session.search(name)).await? {
        Ok(SearchOutcome::Found(movie)) => {
            console.say(render_movie(&movie))?;
            Ok(Some(movie))
        },
        Ok(SearchOutcome::NotFound) => {
            console.say(format!("Movie '{name}' not found. Please check the spelling and try again."))?;
            Ok(None)
        },
        Err(err) => {
            debug!(error = %err, "Search failed, returning to menu");
            console.say(err)?;
            Ok(None)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::lookup::{LookupError, MockMovieLookup};
    use async_trait::async_trait;
    use std::io;
    use std::time::Duration;

    /// Lookup that never answers
    struct StalledLookup;

    #[async_trait]
    impl MovieLookup for StalledLookup {
        async fn search(&self, _title: &str) -> Result<SearchOutcome, LookupError> {
            std::future::pending().await
        }
    }

    fn heat() -> MovieRecord {
        let mut movie = MovieRecord::titled("Heat");
        movie.year = Some("1995".to_string());
        movie.director = Some("Michael Mann".to_string());
        movie
    }

    async fn drive(db: &Database, lookup: MockMovieLookup, script: &str) -> (String, Result<(), TrackerError>) {
        let mut session = SessionController::new(db, lookup, 4);
        session.register("alice", "secret1", "secret1").unwrap();
        let mut console = Console::new(script.as_bytes(), Vec::new());
        let result = run(&mut session, &mut console).await;
        (String::from_utf8(console.into_output()).unwrap(), result)
    }

    #[test]
    fn test_render_movie_shows_placeholder_for_missing_fields() {
        let text = render_movie(&heat());
        assert!(text.contains("🎬 Heat (1995)"));
        assert!(text.contains("Director    : Michael Mann"));
        assert!(text.contains("Awards      : N/A"));
    }

    #[test]
    fn test_render_empty_collections() {
        assert_eq!(render_ratings(&[]), "You haven't rated any movies yet.");
        assert_eq!(render_list(FAVORITES, &[]), "Your favorites list is empty.");
        assert_eq!(render_list(TO_WATCH, &[]), "Your watchlist is empty.");
        assert_eq!(render_list("halloween", &[]), "Your halloween is empty.");
    }

    #[test]
    fn test_render_ratings_keeps_stored_precision() {
        let ratings = [
            Rating {
                movie_name: "Heat".to_string(),
                rate: 9.25,
            },
            Rating {
                movie_name: "Ran".to_string(),
                rate: 8.0,
            },
        ];
        let text = render_ratings(&ratings);
        assert!(text.contains(": 9.25/10.0\n"));
        assert!(text.contains(": 8.0/10.0\n"));
    }

    #[test]
    fn test_render_list_numbers_movies() {
        let text = render_list(FAVORITES, &["Heat".to_string(), "Ran".to_string()]);
        assert!(text.contains("Your Favorites list\n"));
        assert!(text.contains("1. Heat\n2. Ran\n"));
    }

    #[tokio::test]
    async fn test_guest_search_then_exit() {
        let db = Database::open_in_memory().unwrap();
        let mut lookup = MockMovieLookup::new();
        lookup.expect_search().returning(|_| Ok(SearchOutcome::Found(heat())));

        let (output, result) = drive(&db, lookup, "1\nHeat\n\n4\n").await;
        assert!(result.is_ok());
        assert!(output.contains("🎬 Heat (1995)"));
        assert!(output.contains("Thank you for using Movie Tracker!"));
    }

    #[tokio::test]
    async fn test_invalid_choices_reprompt() {
        let db = Database::open_in_memory().unwrap();
        let (output, result) = drive(&db, MockMovieLookup::new(), "abc\n9\n4\n").await;
        assert!(result.is_ok());
        assert!(output.contains("Please enter a valid number."));
        assert!(output.contains("Invalid choice. Please pick 1-4."));
        assert!(output.contains("Thank you for using Movie Tracker!"));
    }

    #[tokio::test]
    async fn test_login_rate_and_favorite() {
        let db = Database::open_in_memory().unwrap();
        let mut lookup = MockMovieLookup::new();
        lookup.expect_search().returning(|_| Ok(SearchOutcome::Found(heat())));

        let script = concat!(
            "2\nalice\nsecret1\n\n",  // login
            "1\nHeat\n1\n11\n8.5\n\n", // search, rate (11 rejected)
            "1\nHeat\n2\n\n",          // search, favorite
            "1\nHeat\n2\n\n",          // search, favorite again
            "2\n1\n\n",                // view ratings
            "3\n\n",                   // logout
            "4\n",                     // exit
        );
        let (output, result) = drive(&db, lookup, script).await;

        assert!(result.is_ok());
        assert!(output.contains("Logged in successfully"));
        assert!(output.contains("Rating must be between 0.0 and 10.0"));
        assert!(output.contains("Rating of 8.5/10.0 added for Heat"));
        assert!(output.contains("Heat added to your favorites list!"));
        assert!(output.contains("Heat is already in your favorites list."));
        assert!(output.contains("8.5/10.0"));
        assert!(output.contains("Logged out successfully!"));
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_session_alive() {
        let db = Database::open_in_memory().unwrap();
        let mut lookup = MockMovieLookup::new();
        lookup
            .expect_search()
            .returning(|_| Err(LookupError::Connection("refused".to_string())));

        let (output, result) = drive(&db, lookup, "1\nHeat\n\n4\n").await;
        assert!(result.is_ok());
        assert!(output.contains("Could not connect to the movie database: refused"));
        assert!(output.contains("Thank you for using Movie Tracker!"));
    }

    #[tokio::test]
    async fn test_end_of_input_says_goodbye() {
        let db = Database::open_in_memory().unwrap();
        let (output, result) = drive(&db, MockMovieLookup::new(), "2\nalice\n").await;
        assert!(result.is_ok());
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_rating_confirmation_keeps_stored_precision() {
        let db = Database::open_in_memory().unwrap();
        let mut lookup = MockMovieLookup::new();
        lookup.expect_search().returning(|_| Ok(SearchOutcome::Found(heat())));

        let script = "2\nalice\nsecret1\n\n1\nHeat\n1\n9.25\n\n2\n1\n\n";
        let (output, result) = drive(&db, lookup, script).await;

        assert!(result.is_ok());
        assert!(output.contains("Rating of 9.25/10.0 added for Heat"));
        assert!(output.contains(": 9.25/10.0"));
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt_says_goodbye() {
        let db = Database::open_in_memory().unwrap();
        let mut session = SessionController::new(&db, MockMovieLookup::new(), 4);
        // The writer half stays open so the prompt never sees end of input
        let (_writer, reader) = tokio::io::duplex(64);
        let mut console = Console::with_interrupt(tokio::io::BufReader::new(reader), Vec::new(), async { Ok::<(), io::Error>(()) });

        let result = run(&mut session, &mut console).await;
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(result.is_ok());
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_interrupt_during_lookup_says_goodbye() {
        let db = Database::open_in_memory().unwrap();
        let mut session = SessionController::new(&db, StalledLookup, 4);
        let interrupt = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<(), io::Error>(())
        };
        let mut console = Console::with_interrupt("1\nHeat\n\n4\n".as_bytes(), Vec::new(), interrupt);

        let result = run(&mut session, &mut console).await;
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(result.is_ok());
        assert!(!output.contains("Thank you for using Movie Tracker!"));
        assert!(output.ends_with("Goodbye!\n"));
    }
}
