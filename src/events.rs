//! Event handling functions for user input and application state updates.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::{
    engine::PointerEvent,
    puzzle::Cell,
    types::{MainMenuItem, Screen},
    App,
};

/// Width of one board square in terminal columns.
pub(crate) const CELL_WIDTH: u16 = 3;

/// Handles input events and updates the application state accordingly.
///
/// This function polls for keyboard and mouse events and dispatches them to the handler of the
/// current screen. It uses a timeout to avoid blocking the UI.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(Duration::from_millis(100))? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key.code),
            Event::Mouse(mouse) => handle_mouse(app, mouse),
            _ => {}
        }
    }

    Ok(())
}

/// Dispatches a key press to the handler of the current screen.
pub(crate) fn handle_key(app: &mut App, code: KeyCode) {
    match app.screen {
        Screen::MainMenu(item) => main_menu_key(app, item, code),
        Screen::LevelMenu => level_menu_key(app, code),
        Screen::InGame => in_game_key(app, code),
    }
}

/// Handles keys on the main menu.
///
/// `j`/`k` move the highlight, `l` or Enter selects the item and `q` quits.
fn main_menu_key(app: &mut App, item: MainMenuItem, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.screen = Screen::MainMenu(item.next()),
        KeyCode::Char('k') | KeyCode::Up => app.screen = Screen::MainMenu(item.previous()),
        KeyCode::Char('l') | KeyCode::Enter => match item {
            MainMenuItem::Play => {
                let _ = app.open_level(app.current);
            }
            MainMenuItem::Levels => {
                app.highlighted = app.current;
                app.viewport_offset = 0;
                scroll_to_highlight(app);
                app.status = None;
                app.screen = Screen::LevelMenu;
            }
            MainMenuItem::Quit => app.quit(),
        },
        _ => {}
    }
}

/// Handles keys on the level list.
///
/// Selecting an invalid level leaves the list open with the reason in the status line.
fn level_menu_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => {
            if app.highlighted + 1 < app.levels.len() {
                app.highlighted += 1;
            }
            scroll_to_highlight(app);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.highlighted = app.highlighted.saturating_sub(1);
            scroll_to_highlight(app);
        }
        KeyCode::Char('l') | KeyCode::Enter => {
            let _ = app.open_level(app.highlighted);
        }
        KeyCode::Char('h') | KeyCode::Esc => {
            app.status = None;
            app.screen = Screen::MainMenu(MainMenuItem::Levels);
        }
        _ => {}
    }
}

/// Keeps the highlighted level inside the visible window of the level list.
fn scroll_to_highlight(app: &mut App) {
    let height = app.viewport_height.max(1);

    if app.highlighted < app.viewport_offset {
        app.viewport_offset = app.highlighted;
    } else if app.highlighted >= app.viewport_offset + height {
        app.viewport_offset = app.highlighted + 1 - height;
    }
}

/// Handles keys on the board.
///
/// Arrows or `hjkl` move the cursor, Space presses or lifts the pen, `r` clears the board, Esc
/// abandons the level and `q` saves and quits.
fn in_game_key(app: &mut App, code: KeyCode) {
    let (column_step, row_step) = match code {
        KeyCode::Char('q') => return app.quit(),
        KeyCode::Esc => return app.leave_level(),
        KeyCode::Char('r') => return app.reset_board(),
        KeyCode::Char(' ') => {
            let _ = app.toggle_pen();
            return;
        }
        KeyCode::Char('h') | KeyCode::Left => (-1, 0),
        KeyCode::Char('l') | KeyCode::Right => (1, 0),
        KeyCode::Char('k') | KeyCode::Up => (0, -1),
        KeyCode::Char('j') | KeyCode::Down => (0, 1),
        _ => return,
    };

    let _ = app.move_cursor(column_step, row_step);
}

/// Turns left-button mouse input on the board into pointer events.
pub(crate) fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::InGame {
        return;
    }
    let Some(session) = app.session.as_mut() else {
        return;
    };

    let cell = cell_at(session.board_area.x, session.board_area.y, mouse.column, mouse.row);
    let event = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if session.engine.level().contains(cell) {
                session.cursor = cell;
            }
            PointerEvent::Down(cell)
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if session.engine.level().contains(cell) {
                session.cursor = cell;
            }
            PointerEvent::Move(cell)
        }
        MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up,
        _ => return,
    };

    let _ = app.apply(event);
}

/// Maps a terminal position to the board cell drawn there, given the board's top-left corner.
///
/// Positions left of or above the board map to negative coordinates, which the engine treats as
/// off the board.
pub(crate) fn cell_at(origin_x: u16, origin_y: u16, x: u16, y: u16) -> Cell {
    let column = (i32::from(x) - i32::from(origin_x)).div_euclid(i32::from(CELL_WIDTH));
    let row = i32::from(y) - i32::from(origin_y);

    Cell::new(column, row)
}
