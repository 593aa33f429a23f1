//! Core application state and logic for the puzzle game.

use color_eyre::eyre::{Report, Result};
use ratatui::{layout::Rect, DefaultTerminal};
use tracing::{info, warn};

use crate::{
    engine::{GameState, Outcome, PathEngine, PointerEvent},
    events,
    file_loader::LevelEntry,
    persistence::SaveStore,
    puzzle::Cell,
    types::{MainMenuItem, Screen},
    ui,
};

/// Application state container for the puzzle game.
///
/// This structure holds the state of the application, which is to say the structure from which
/// Ratatui will render the game and Crossterm events will help writing to.
pub struct App {
    /// Application exit flag.
    ///
    /// This field indicates whether the application should exit. It is set to `true` when the user
    /// wants to quit the game but it starts off `false`.
    pub(crate) exit: bool,
    /// Current screen being displayed to the user.
    pub(crate) screen: Screen,
    /// Every level known to the game, the built-in one first.
    ///
    /// Levels that failed validation are kept so the level list can explain why they cannot be
    /// played.
    pub(crate) levels: Vec<LevelEntry>,
    /// Index of the level started from the main menu.
    pub(crate) current: usize,
    /// Index of the level under the cursor in the level list.
    pub(crate) highlighted: usize,
    /// Scrolling offset for the level list viewport.
    ///
    /// This field holds the offset by which to scroll the sliding window into the
    /// [`levels`](App::levels) vector in the level list's viewport.
    pub(crate) viewport_offset: usize,
    /// Height of the level list rendering area.
    ///
    /// This field holds the height of the area in which the list of levels is rendered, measured
    /// in terminal cells during the last redraw of the on-screen frame.
    pub(crate) viewport_height: usize,
    /// Level being played, if any.
    pub(crate) session: Option<Session>,
    /// Boards in progress, saved across runs.
    pub(crate) store: SaveStore,
    /// One-line message shown under the board or the level list.
    pub(crate) status: Option<String>,
}

/// Level being played and the input state around it.
pub(crate) struct Session {
    /// Save key of the level.
    pub(crate) key: String,
    /// Title shown above the board.
    pub(crate) title: String,
    /// State machine holding the paths.
    pub(crate) engine: PathEngine,
    /// Cell under the keyboard cursor.
    pub(crate) cursor: Cell,
    /// Whether a stroke is being drawn, by keyboard or mouse.
    pub(crate) pen_down: bool,
    /// Screen area of the board's squares during the last redraw.
    ///
    /// Mouse positions are turned into cells relative to this area.
    pub(crate) board_area: Rect,
}

impl App {
    /// Creates the application over a list of levels and a save store.
    #[must_use]
    pub const fn new(levels: Vec<LevelEntry>, store: SaveStore) -> Self {
        Self {
            exit: false,
            screen: Screen::MainMenu(MainMenuItem::Play),
            levels,
            current: 0,
            highlighted: 0,
            viewport_offset: 0,
            viewport_height: 0,
            session: None,
            store,
            status: None,
        }
    }

    /// Runs the main loop of the application.
    ///
    /// This function handles user input and updates the application state. The loop continues until
    /// the exit condition is `true`, after which the function returns to the call site.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal.try_draw(|frame| {
                ui::draw(self, frame).map_err(std::io::Error::other)
            })?;
            events::handle_events(self)?;
        }

        Ok(())
    }

    /// Starts the level at `index`, restoring its saved board if there is one.
    ///
    /// Returns `false`, with a status message, when the level did not pass validation.
    pub(crate) fn open_level(&mut self, index: usize) -> bool {
        let Some(entry) = self.levels.get(index) else {
            return false;
        };
        let level = match &entry.level {
            Ok(level) => level.clone(),
            Err(err) => {
                self.status = Some(format!("{} cannot be played: {err}", entry.title));
                return false;
            }
        };

        let mut engine = PathEngine::new(level);
        self.status = None;

        if let Some(saved) = self.store.get(&entry.key) {
            match engine.restore_paths(saved) {
                Ok(()) => self.status = Some("Resumed saved board".to_owned()),
                Err(err) => {
                    warn!(key = entry.key, %err, "dropping saved board");
                    self.status =
                        Some("Saved board did not fit the level and was dropped".to_owned());
                }
            }
        }

        info!(key = entry.key, "level opened");

        self.session = Some(Session {
            key: entry.key.clone(),
            title: entry.title.clone(),
            engine,
            cursor: Cell::new(0, 0),
            pen_down: false,
            board_area: Rect::default(),
        });
        self.current = index;
        self.screen = Screen::InGame;

        true
    }

    /// Abandons the level being played and forgets its saved board.
    pub(crate) fn leave_level(&mut self) {
        if let Some(session) = self.session.take() {
            self.store.remove(&session.key);
            self.persist_store();
        }

        self.status = None;
        self.screen = Screen::MainMenu(MainMenuItem::Play);
    }

    /// Saves the board being played and stops the main loop.
    pub(crate) fn quit(&mut self) {
        if let Some(session) = &self.session {
            let saved = session.engine.export_paths();

            if session.engine.state() == GameState::Won || saved.is_empty() {
                self.store.remove(&session.key);
            } else {
                self.store.put(&session.key, saved);
            }

            self.persist_store();
        }

        self.exit = true;
    }

    /// Feeds one pointer event to the level being played and reacts to the outcome.
    pub(crate) fn apply(&mut self, event: PointerEvent) -> Outcome {
        let Some(session) = self.session.as_mut() else {
            return Outcome::Ignored;
        };

        let outcome = session.engine.handle(event);
        match outcome {
            Outcome::Started(_) => session.pen_down = true,
            Outcome::Discarded(_) | Outcome::Committed(_) => session.pen_down = false,
            Outcome::Won(_) => {
                session.pen_down = false;
                self.status = Some("Solved! Esc returns to the menu".to_owned());
                self.store.remove(&session.key);
                self.persist_store();
            }
            Outcome::Rejected => {
                session.pen_down = false;
                self.status = Some("This board is solved; it can only be left".to_owned());
            }
            Outcome::Ignored | Outcome::Extended | Outcome::Backtracked => {}
        }

        outcome
    }

    /// Presses or releases the keyboard pen on the cursor.
    pub(crate) fn toggle_pen(&mut self) -> Outcome {
        let Some(session) = &self.session else {
            return Outcome::Ignored;
        };

        let event = if session.pen_down {
            PointerEvent::Up
        } else {
            PointerEvent::Down(session.cursor)
        };

        self.apply(event)
    }

    /// Moves the keyboard cursor by one cell, dragging the pen along when it is down.
    ///
    /// The cursor never leaves the board.
    pub(crate) fn move_cursor(&mut self, column_step: i32, row_step: i32) -> Outcome {
        let Some(session) = self.session.as_mut() else {
            return Outcome::Ignored;
        };

        let last = i32::from(session.engine.level().size()) - 1;
        let target = Cell::new(
            (session.cursor.column + column_step).clamp(0, last),
            (session.cursor.row + row_step).clamp(0, last),
        );
        if target == session.cursor {
            return Outcome::Ignored;
        }
        session.cursor = target;

        if session.pen_down {
            self.apply(PointerEvent::Move(target))
        } else {
            Outcome::Ignored
        }
    }

    /// Clears the board being played, unless it is already solved.
    pub(crate) fn reset_board(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.engine.reset() {
            Ok(()) => {
                session.pen_down = false;
                self.status = Some("Board cleared".to_owned());
            }
            Err(err) => self.status = Some(format!("Cannot reset: {err}")),
        }
    }

    /// Writes the save store, reporting failures in the status line instead of aborting.
    fn persist_store(&mut self) {
        if let Err(err) = self.store.persist() {
            warn!(%err, "failed to write save store");
            self.status = Some("Could not write the save file".to_owned());
        }
    }
}

/// Runs `body` between a terminal `setup` and `teardown`.
///
/// `teardown` runs whether `setup` or `body` failed or not, and `body` only runs once `setup`
/// succeeded. The first error wins.
///
/// # Errors
///
/// Returns the error of `setup`, `body` or `teardown`, in that order of precedence.
pub fn run_guarded<Setup, Body, Teardown, T>(
    setup: Setup,
    body: Body,
    teardown: Teardown,
) -> Result<T>
where
    Setup: FnOnce() -> std::io::Result<()>,
    Body: FnOnce() -> Result<T>,
    Teardown: FnOnce() -> std::io::Result<()>,
{
    let result = setup().map_err(Report::from).and_then(|()| body());
    let released = teardown();

    let value = result?;
    released?;

    Ok(value)
}
