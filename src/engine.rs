//! Path-drawing state machine.
//!
//! A [`PathEngine`] owns the live state of one play session: the level, the committed path of each
//! color and the stroke currently being drawn. Pointer events drive it through the transitions
//! below; every event, however nonsensical, maps to a defined next state and never to an error.
//!
//! Per color, a path goes `Empty -> Drawing -> Committed | Empty`. Globally, the board goes
//! `Playing -> Won` once every color is connected and every square is covered. A won board accepts
//! no further edits; it can only be abandoned.

use std::collections::{BTreeMap, HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    persistence::SavedPaths,
    puzzle::{Cell, ColorId, Level},
};

/// Pointer input, already translated to board coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    /// The pointer was pressed over a cell.
    Down(Cell),
    /// The pressed pointer moved over a cell, which may lie outside the board.
    Move(Cell),
    /// The pointer was released.
    Up,
}

/// Transition taken in response to one pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event changed nothing.
    Ignored,
    /// The board is won and refuses edits.
    Rejected,
    /// A new stroke was started on an endpoint of this color.
    Started(ColorId),
    /// The stroke grew by one cell.
    Extended,
    /// The stroke gave back its last cell.
    Backtracked,
    /// The stroke was thrown away.
    Discarded(ColorId),
    /// The stroke reached its partner endpoint and became the committed path of its color.
    Committed(ColorId),
    /// As [`Outcome::Committed`], and the commit completed the board.
    Won(ColorId),
}

/// Progress of one color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathState {
    /// Nothing is drawn for the color.
    Empty,
    /// The color's stroke is being drawn.
    Drawing,
    /// The color's endpoints are connected.
    Committed,
}

/// Progress of the whole board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameState {
    /// The board can still be edited.
    #[default]
    Playing,
    /// Every color is connected and every square is covered.
    Won,
}

/// Ordered run of cells drawn in one color.
///
/// Cells are pairwise distinct and consecutive cells share a side. A committed path additionally
/// starts and ends on the two endpoints of its color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    /// Color the path is drawn in.
    color: ColorId,
    /// Cells from the starting endpoint onwards.
    cells: Vec<Cell>,
}

impl Path {
    /// Starts a path on a single cell.
    fn new(color: ColorId, start: Cell) -> Self {
        Self {
            color,
            cells: vec![start],
        }
    }

    /// Returns the color of the path.
    #[must_use]
    pub const fn color(&self) -> ColorId {
        self.color
    }

    /// Returns the cells of the path, starting endpoint first.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns whether the path runs through the cell.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Returns the cell the path currently ends on.
    fn head(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Returns the cell drawn just before the head.
    fn predecessor(&self) -> Option<Cell> {
        self.cells.iter().rev().nth(1).copied()
    }
}

/// Read-only copy of a session's state, handed to renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Committed path of every connected color.
    pub committed: HashMap<ColorId, Path>,
    /// Stroke being drawn, if any.
    pub active: Option<Path>,
    /// Whether the board is still editable.
    pub state: GameState,
}

/// Session operation refused by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A finished board cannot be edited, only abandoned.
    #[error("the board is already solved")]
    GameWon,
    /// Saved paths do not describe a valid board for this level.
    #[error("saved path for color {color} is invalid: {reason}")]
    InvalidSave {
        /// Color whose saved path was refused.
        color: ColorId,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// State machine turning pointer events into paths on one level.
#[expect(
    clippy::module_name_repetitions,
    reason = "The name is the one used across the rest of the game."
)]
#[derive(Clone, Debug)]
pub struct PathEngine {
    /// Level being played.
    level: Level,
    /// Committed path of each connected color.
    committed: HashMap<ColorId, Path>,
    /// Stroke currently being drawn.
    active: Option<Path>,
    /// Whether the board is still editable.
    state: GameState,
}

impl PathEngine {
    /// Opens an empty session on a level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            level,
            committed: HashMap::new(),
            active: None,
            state: GameState::Playing,
        }
    }

    /// Returns the level being played.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Returns whether the board is still editable.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Returns the stroke currently being drawn.
    #[must_use]
    pub const fn active(&self) -> Option<&Path> {
        self.active.as_ref()
    }

    /// Returns the committed path of a color.
    #[must_use]
    pub fn committed(&self, color: ColorId) -> Option<&Path> {
        self.committed.get(&color)
    }

    /// Returns the progress of one color.
    #[must_use]
    pub fn path_state(&self, color: ColorId) -> PathState {
        if self.active.as_ref().is_some_and(|path| path.color == color) {
            PathState::Drawing
        } else if self.committed.contains_key(&color) {
            PathState::Committed
        } else {
            PathState::Empty
        }
    }

    /// Feeds one pointer event to the state machine.
    pub fn handle(&mut self, event: PointerEvent) -> Outcome {
        match event {
            PointerEvent::Down(cell) => self.start(cell),
            PointerEvent::Move(cell) => self.extend(cell),
            PointerEvent::Up => self.release(),
        }
    }

    /// Handles the pointer being pressed over a cell.
    ///
    /// Pressing anything but an endpoint is ignored. Pressing an endpoint throws away whatever
    /// stroke is still open and the committed path of the pressed color, freeing its cells, then
    /// starts a fresh stroke on the endpoint.
    pub fn start(&mut self, cell: Cell) -> Outcome {
        if self.state == GameState::Won {
            return Outcome::Rejected;
        }

        let Some(endpoint) = self.level.endpoint_at(cell).copied() else {
            return Outcome::Ignored;
        };

        if let Some(stale) = self.active.take() {
            debug!(color = stale.color, "discarding unfinished stroke");
        }
        if self.committed.remove(&endpoint.color).is_some() {
            debug!(color = endpoint.color, "freeing committed path");
        }

        self.active = Some(Path::new(endpoint.color, cell));

        Outcome::Started(endpoint.color)
    }

    /// Handles the pressed pointer moving over a cell.
    ///
    /// Leaving the board or running into an endpoint of another color throws the stroke away.
    /// Stepping back onto the previous cell retracts the head. Jumps, self-crossings and cells of
    /// other colors' paths are ignored. Reaching the partner endpoint commits the stroke.
    pub fn extend(&mut self, cell: Cell) -> Outcome {
        if self.state == GameState::Won {
            return Outcome::Rejected;
        }

        let Some(active) = self.active.as_mut() else {
            return Outcome::Ignored;
        };
        let color = active.color;

        if !self.level.contains(cell) {
            return self.discard();
        }

        let Some(head) = active.head() else {
            return Outcome::Ignored;
        };
        if !head.is_adjacent(cell) {
            return Outcome::Ignored;
        }

        if active.predecessor() == Some(cell) {
            let _ = active.cells.pop();
            return Outcome::Backtracked;
        }

        if active.contains(cell)
            || self
                .committed
                .values()
                .any(|path| path.color != color && path.contains(cell))
        {
            return Outcome::Ignored;
        }

        if self.level.endpoint_at(cell).is_none() {
            active.cells.push(cell);
            return Outcome::Extended;
        }

        let partner = active
            .cells
            .first()
            .and_then(|&start| self.level.partner_of(start));
        if partner == Some(cell) {
            active.cells.push(cell);
            self.commit()
        } else {
            self.discard()
        }
    }

    /// Handles the pointer being released.
    ///
    /// A stroke that already reached its partner was committed when it got there, so only an
    /// unfinished stroke is left to throw away.
    pub fn release(&mut self) -> Outcome {
        if self.state == GameState::Won {
            return Outcome::Rejected;
        }

        if self.active.is_some() {
            self.discard()
        } else {
            Outcome::Ignored
        }
    }

    /// Returns a copy of the session state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            committed: self.committed.clone(),
            active: self.active.clone(),
            state: self.state,
        }
    }

    /// Clears every path and returns every color to empty.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::GameWon`] when the board is already solved.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.state == GameState::Won {
            return Err(SessionError::GameWon);
        }

        self.committed.clear();
        self.active = None;
        self.state = GameState::Playing;

        Ok(())
    }

    /// Returns whether the committed paths solve the board.
    ///
    /// Every color must be joined by a path running from one of its endpoints to the other, and
    /// every square must be covered by exactly one committed path.
    #[must_use]
    pub fn check_win(&self) -> bool {
        let mut coverage = vec![0_u8; self.level.cell_count()];

        for color in 0..self.level.color_count() {
            let Some(path) = self.committed.get(&color) else {
                return false;
            };
            if !self.connects_endpoints(path) {
                return false;
            }

            for &cell in &path.cells {
                let Some(slot) = self
                    .level
                    .index_of(cell)
                    .and_then(|index| coverage.get_mut(index))
                else {
                    return false;
                };
                *slot = slot.saturating_add(1);
            }
        }

        coverage.iter().all(|&count| count == 1)
    }

    /// Copies the committed paths into their save shape.
    #[must_use]
    pub fn export_paths(&self) -> SavedPaths {
        SavedPaths::new(
            self.committed
                .iter()
                .map(|(&color, path)| (color, path.cells.clone()))
                .collect(),
        )
    }

    /// Replaces the committed paths with saved ones.
    ///
    /// The saved paths are checked as a whole before anything changes: each must belong to a color
    /// of the level, be a well-formed path joining that color's endpoints and share no cell with
    /// another saved path. Any open stroke is dropped and the win condition is evaluated again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::GameWon`] on a solved board and [`SessionError::InvalidSave`] when a
    /// saved path does not fit the level; the session is left untouched in both cases.
    pub fn restore_paths(&mut self, saved: &SavedPaths) -> Result<(), SessionError> {
        if self.state == GameState::Won {
            return Err(SessionError::GameWon);
        }

        let mut restored = HashMap::new();
        let mut claimed = BTreeMap::new();

        for (&color, cells) in saved.iter() {
            let invalid = |reason| SessionError::InvalidSave { color, reason };

            if color >= self.level.color_count() {
                return Err(invalid("no such color"));
            }

            let path = Path {
                color,
                cells: cells.clone(),
            };
            if !is_well_formed(&path.cells) {
                return Err(invalid("cells are not a simple chain of neighbours"));
            }
            if !self.connects_endpoints(&path) {
                return Err(invalid("path does not join the color's endpoints"));
            }
            for &cell in &path.cells {
                if !self.level.contains(cell) {
                    return Err(invalid("path leaves the board"));
                }
                if claimed.insert(cell, color).is_some() {
                    return Err(invalid("path crosses another path"));
                }
            }

            let _ = restored.insert(color, path);
        }

        info!(paths = restored.len(), "restoring saved paths");

        self.committed = restored;
        self.active = None;
        if self.check_win() {
            self.state = GameState::Won;
        }

        Ok(())
    }

    /// Throws the open stroke away.
    fn discard(&mut self) -> Outcome {
        match self.active.take() {
            Some(path) => {
                debug!(color = path.color, cells = path.cells.len(), "stroke discarded");
                Outcome::Discarded(path.color)
            }
            None => Outcome::Ignored,
        }
    }

    /// Turns the open stroke into its color's committed path and evaluates the win condition.
    fn commit(&mut self) -> Outcome {
        let Some(path) = self.active.take() else {
            return Outcome::Ignored;
        };
        let color = path.color;

        debug!(color, cells = path.cells.len(), "stroke committed");
        let _ = self.committed.insert(color, path);

        if self.check_win() {
            info!(level = self.level.name(), "board solved");
            self.state = GameState::Won;
            Outcome::Won(color)
        } else {
            Outcome::Committed(color)
        }
    }

    /// Returns whether the path runs from one endpoint of its color to the other.
    fn connects_endpoints(&self, path: &Path) -> bool {
        let Some((first, second)) = self.level.pair(path.color) else {
            return false;
        };

        match (path.cells.first(), path.cells.last()) {
            (Some(&start), Some(&end)) => {
                (start == first && end == second) || (start == second && end == first)
            }
            _ => false,
        }
    }
}

/// Returns whether the cells form a chain of distinct, side-sharing cells.
fn is_well_formed(cells: &[Cell]) -> bool {
    let mut seen = HashSet::with_capacity(cells.len());

    cells.iter().all(|&cell| seen.insert(cell))
        && cells.windows(2).all(|window| match window {
            [from, to] => from.is_adjacent(*to),
            _ => false,
        })
}
