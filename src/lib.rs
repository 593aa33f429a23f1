//! Terminal puzzle game where matching dots are linked by non-crossing paths that must cover the
//! whole board.
//!
//! Levels are XML documents validated in three passes (syntax, structure, logic) before they can
//! be played. A [`PathEngine`] turns pointer input into paths and decides when a board is solved,
//! and [`App`] drives the menus and the board in the terminal.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

pub mod app;
pub mod config;
pub mod document;
pub mod engine;
mod events;
pub mod file_loader;
pub mod logging;
pub mod persistence;
pub mod puzzle;
mod types;
mod ui;
pub mod validator;

pub use app::App;
pub use engine::{Outcome, PathEngine, PointerEvent};
pub use puzzle::{Cell, Level};
pub use validator::LevelError;
