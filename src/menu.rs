//! Typed menu commands
//!
//! Each menu is an enum parsed from the number the user types. Dispatch
//! matches on the enum, so adding an entry forces every handler to cover it.

use std::fmt;

/// A menu whose entries are chosen by number
pub trait Menu: Sized + Copy + 'static {
    /// Entries in display order; entry `i` is selected by typing `i + 1`
    const ENTRIES: &'static [(Self, &'static str)];

    /// Parse a 1-based selection
    #[must_use]
    fn from_choice(choice: u32) -> Option<Self> {
        let index = usize::try_from(choice).ok()?.checked_sub(1)?;
        Self::ENTRIES.get(index).map(|(entry, _)| *entry)
    }

    /// Parse raw console input such as `" 2\n"`
    #[must_use]
    fn parse(input: &str) -> Option<Self> {
        input.trim().parse().ok().and_then(Self::from_choice)
    }

    /// Numbered lines for display
    #[must_use]
    fn render() -> MenuText<Self> {
        MenuText(std::marker::PhantomData)
    }
}

/// Display adapter printing a menu's numbered entries
pub struct MenuText<M>(std::marker::PhantomData<M>);

impl<M: Menu> fmt::Display for MenuText<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, label)) in M::ENTRIES.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, label)?;
        }
        Ok(())
    }
}

/// Main menu, shown while nobody is logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainCommand {
    /// Look a movie up as a guest
    Search,
    /// Log in to an existing account
    Login,
    /// Create an account
    Register,
    /// Quit the program
    Exit,
}

impl Menu for MainCommand {
    const ENTRIES: &'static [(Self, &'static str)] = &[
        (Self::Search, "Search for a movie"),
        (Self::Login, "Login"),
        (Self::Register, "Register"),
        (Self::Exit, "Exit"),
    ];
}

/// Account menu, shown while a user is logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCommand {
    /// Look a movie up, then rate or list it
    Search,
    /// Show ratings, favorites or the watchlist
    ViewLists,
    /// Return to the main menu
    Logout,
}

impl Menu for AccountCommand {
    const ENTRIES: &'static [(Self, &'static str)] = &[
        (Self::Search, "Search for a movie"),
        (Self::ViewLists, "View my lists"),
        (Self::Logout, "Log out"),
    ];
}

/// Actions offered after a logged-in search finds a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieAction {
    /// Rate the movie
    Rate,
    /// Add it to favorites
    AddToFavorites,
    /// Add it to the watchlist
    AddToWatchList,
    /// Back to the account menu
    Back,
}

impl Menu for MovieAction {
    const ENTRIES: &'static [(Self, &'static str)] = &[
        (Self::Rate, "Rate"),
        (Self::AddToFavorites, "Add to \"favorites\""),
        (Self::AddToWatchList, "Add to \"to watch\""),
        (Self::Back, "Go back"),
    ];
}

/// Which of the user's collections to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    /// Every movie the user rated
    Ratings,
    /// The favorites list
    Favorites,
    /// The watchlist
    WatchList,
    /// Back to the account menu
    Back,
}

impl Menu for ListView {
    const ENTRIES: &'static [(Self, &'static str)] = &[
        (Self::Ratings, "View my ratings"),
        (Self::Favorites, "View my favorites"),
        (Self::WatchList, "View my watchlist"),
        (Self::Back, "Go back"),
    ];
}
