//! Type definitions and enums for the application state and navigation.

/// Enumeration of available application screens.
///
/// This enumeration holds information about the current screen of the game. It is used to
/// determine which screen to render and what actions to take based on user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    /// Main menu screen of the game, with the highlighted item.
    MainMenu(MainMenuItem),
    /// Level selection screen.
    ///
    /// This variant represents the list of every level found on disk, including the ones that
    /// failed validation and cannot be started.
    LevelMenu,
    /// Board of the level being played.
    InGame,
}

/// Main menu navigation options.
///
/// This enumeration holds the different items in the main menu, in the order they are listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MainMenuItem {
    /// "Play" menu option, starting the current level.
    Play,
    /// "Levels" menu option, opening the level list.
    Levels,
    /// "Quit" menu option.
    Quit,
}

impl MainMenuItem {
    /// Every item, top to bottom.
    pub(crate) const ALL: [Self; 3] = [Self::Play, Self::Levels, Self::Quit];

    /// Returns the text shown for the item.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Levels => "Levels",
            Self::Quit => "Quit",
        }
    }

    /// Returns the item below this one, staying on the last item.
    pub(crate) const fn next(self) -> Self {
        match self {
            Self::Play => Self::Levels,
            Self::Levels | Self::Quit => Self::Quit,
        }
    }

    /// Returns the item above this one, staying on the first item.
    pub(crate) const fn previous(self) -> Self {
        match self {
            Self::Play | Self::Levels => Self::Play,
            Self::Quit => Self::Levels,
        }
    }
}
