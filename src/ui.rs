//! User interface rendering functions for all application screens.

use std::{collections::HashMap, rc::Rc};

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::DOT,
    text::{Line, Span},
    widgets::{Block, BorderType, Clear},
    Frame,
};

use crate::{
    app::Session,
    engine::GameState,
    events::CELL_WIDTH,
    puzzle::{Cell, ColorId},
    types::{MainMenuItem, Screen},
    App,
};

/// Colors given to the pairs, in pair order.
///
/// Levels with more pairs than colors cycle through the table again.
const PALETTE: [Color; 11] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Cyan,
    Color::Magenta,
    Color::Rgb(255, 165, 0),
    Color::Rgb(128, 0, 128),
    Color::Rgb(165, 42, 42),
    Color::Rgb(0, 130, 127),
    Color::Rgb(75, 0, 130),
];

/// Updates the application UI based on the persistent state.
///
/// This function renders different screens based on the current state stored in the [`App`]
/// structure, dispatching to the appropriate rendering function for each screen type.
///
/// # Errors
///
/// This function may return errors from layout lookups or size conversions.
pub(crate) fn draw(app: &mut App, frame: &mut Frame) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => main_menu(frame, item)?,
        Screen::LevelMenu => level_menu(app, frame)?,
        Screen::InGame => in_game(app, frame)?,
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
pub(crate) fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Returns the color of a pair.
pub(crate) fn pair_color(color: ColorId) -> Color {
    PALETTE
        .get(color % PALETTE.len())
        .copied()
        .unwrap_or(Color::White)
}

/// Renders a centered, bordered menu and returns one row area per item.
fn init_menu(frame: &mut Frame, title: &str, items: usize) -> Result<Rc<[Rect]>> {
    let height = u16::try_from(items)?;

    let space = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Fill(1),
        Constraint::Percentage(30),
    ])
    .split(frame.area())
    .get(1)
    .copied()
    .ok_or_eyre("failed to get menu row from layout")?;
    let space = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Fill(1),
        Constraint::Percentage(35),
    ])
    .split(space)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get menu column from layout")?;

    let layout = Layout::vertical([Constraint::Max(height + 2)])
        .flex(Flex::Center)
        .split(space)
        .first()
        .copied()
        .ok_or_eyre("failed to get menu area from layout")?;

    let block = Block::bordered()
        .title(title.to_owned())
        .title_bottom("(j) down / (k) up / (l) select")
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(layout);
    frame.render_widget(block, layout);

    Ok(Layout::vertical(vec![Constraint::Max(1); items]).split(inner_space))
}

/// Renders the main menu, highlighting `selected`.
pub(crate) fn main_menu(frame: &mut Frame, selected: MainMenuItem) -> Result<()> {
    clear(frame);

    let rows = init_menu(frame, "dotlink", MainMenuItem::ALL.len())?;

    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    for (item, area) in MainMenuItem::ALL.into_iter().zip(rows.iter()) {
        let style = if item == selected {
            active_content_style
        } else {
            content_style
        };
        frame.render_widget(Line::styled(item.label(), style).centered(), *area);
    }

    Ok(())
}

/// Renders the scrollable level list.
///
/// A dot marks the level started by "Play". Levels that failed validation are grayed out and
/// followed by the reason.
pub(crate) fn level_menu(app: &mut App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let space = Layout::horizontal([
        Constraint::Percentage(20),
        Constraint::Fill(1),
        Constraint::Percentage(20),
    ])
    .split(frame.area())
    .get(1)
    .copied()
    .ok_or_eyre("failed to get level list column from layout")?;
    let layout = Layout::vertical([
        Constraint::Percentage(25),
        Constraint::Fill(1),
        Constraint::Percentage(25),
    ])
    .split(space)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get level list row from layout")?;

    let block = Block::bordered()
        .title_top("Levels")
        .title_bottom(
            app.status
                .clone()
                .unwrap_or_else(|| "(j) down / (k) up / (l) play / (h) return".to_owned()),
        )
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(layout);
    frame.render_widget(block, layout);

    app.viewport_height = inner_space.height.into();

    let columns =
        Layout::horizontal([Constraint::Length(3), Constraint::Fill(1)]).split(inner_space);
    let selector_column = columns
        .first()
        .copied()
        .ok_or_eyre("failed to get selector column")?;
    let title_column = columns
        .last()
        .copied()
        .ok_or_eyre("failed to get title column")?;
    let selectors =
        Layout::vertical(vec![Constraint::Max(1); app.viewport_height]).split(selector_column);
    let titles =
        Layout::vertical(vec![Constraint::Max(1); app.viewport_height]).split(title_column);

    let content_style = Style::default().fg(Color::Green);
    let invalid_style = Style::default().fg(Color::DarkGray);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    let visible = app
        .levels
        .iter()
        .enumerate()
        .skip(app.viewport_offset)
        .take(app.viewport_height);

    for ((idx, entry), (selector_area, title_area)) in
        visible.zip(selectors.iter().zip(titles.iter()))
    {
        let style = if idx == app.highlighted {
            active_content_style
        } else if entry.is_playable() {
            content_style
        } else {
            invalid_style
        };

        let marker = if idx == app.current { DOT } else { " " };
        let title = match &entry.level {
            Ok(_) => entry.title.clone(),
            Err(err) => format!("{} ({err})", entry.title),
        };

        frame.render_widget(Line::styled(marker, style).centered(), *selector_area);
        frame.render_widget(Line::styled(title, style), *title_area);
    }

    Ok(())
}

/// Renders the board of the level being played.
///
/// Endpoints are drawn as dots in their pair's color, path cells are filled with it, and the
/// keyboard cursor is shown in reverse video. The area holding the squares is recorded on the
/// session so mouse input can be mapped back to cells.
///
/// # Errors
///
/// This function may return errors when no level is open or the layout cannot be split.
pub(crate) fn in_game(app: &mut App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let session = app
        .session
        .as_mut()
        .ok_or_eyre("no level open on the game screen")?;

    let size = u16::from(session.engine.level().size());
    let width = size * CELL_WIDTH + 2;
    let height = size + 2;

    let column = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(frame.area())
        .first()
        .copied()
        .ok_or_eyre("failed to get board column from layout")?;
    let rows = Layout::vertical([Constraint::Length(height), Constraint::Length(1)])
        .flex(Flex::Center)
        .split(column);
    let board_area = rows
        .first()
        .copied()
        .ok_or_eyre("failed to get board area from layout")?;
    let status_area = rows
        .last()
        .copied()
        .ok_or_eyre("failed to get status area from layout")?;

    let title = if session.engine.state() == GameState::Won {
        format!("{} (solved)", session.title)
    } else {
        session.title.clone()
    };
    let block = Block::bordered()
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let squares = block.inner(board_area);
    frame.render_widget(block, board_area);
    session.board_area = squares;

    let row_areas = Layout::vertical(vec![Constraint::Length(1); usize::from(size)]).split(squares);
    for (row, area) in board_lines(session).into_iter().zip(row_areas.iter()) {
        frame.render_widget(row, *area);
    }

    let status = app.status.clone().unwrap_or_else(|| {
        "(arrows) move / (space) pen / (r) reset / (esc) leave / (q) quit".to_owned()
    });
    frame.render_widget(
        Line::styled(status, Style::default().fg(Color::Green)).centered(),
        Rect {
            x: frame.area().x,
            width: frame.area().width,
            ..status_area
        },
    );

    Ok(())
}

/// Builds one line of styled squares per board row.
fn board_lines(session: &Session) -> Vec<Line<'static>> {
    let engine = &session.engine;
    let level = engine.level();

    let mut owners: HashMap<Cell, ColorId> = HashMap::new();
    for color in 0..level.color_count() {
        if let Some(path) = engine.committed(color) {
            owners.extend(path.cells().iter().map(|&cell| (cell, color)));
        }
    }
    if let Some(path) = engine.active() {
        owners.extend(path.cells().iter().map(|&cell| (cell, path.color())));
    }

    let size = i32::from(level.size());
    (0..size)
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..size)
                .map(|column| {
                    let cell = Cell::new(column, row);
                    let mut style = Style::default();

                    if let Some(&color) = owners.get(&cell) {
                        style = style.bg(pair_color(color)).fg(Color::White);
                    }

                    let mut text = "   ".to_owned();
                    if let Some(endpoint) = level.endpoint_at(cell) {
                        if !owners.contains_key(&cell) {
                            style = style.fg(pair_color(endpoint.color));
                        }
                        style = style.add_modifier(Modifier::BOLD);
                        text = format!(" {DOT} ");
                    }

                    if cell == session.cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }

                    Span::styled(text, style)
                })
                .collect();

            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::tests::create_test_app, engine::PointerEvent};
    use ratatui::{backend::TestBackend, Terminal};

    /// Creates a test terminal with known dimensions for UI testing.
    fn create_test_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(80, 24);
        Terminal::new(backend).expect("failed to create test terminal")
    }

    /// Returns the text rendered on the test terminal.
    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_draw_main_menu() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let mut app = create_test_app(&dir);
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing main menu should succeed");
        let text = screen_text(&terminal);
        assert!(text.contains("Play"));
        assert!(text.contains("Levels"));
        assert!(text.contains("Quit"));
    }

    #[test]
    fn test_draw_level_menu() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let mut app = create_test_app(&dir);
        let mut terminal = create_test_terminal();
        app.screen = Screen::LevelMenu;

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing level menu should succeed");
        assert!(app.viewport_height > 0, "viewport height should be recorded");
        let text = screen_text(&terminal);
        assert!(text.contains("Warm-up"));
        assert!(text.contains("broken"));
    }

    #[test]
    fn test_draw_in_game_records_board_area() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let mut app = create_test_app(&dir);
        let mut terminal = create_test_terminal();
        assert!(app.open_level(0));
        let _ = app.apply(PointerEvent::Down(Cell::new(0, 0)));
        let _ = app.apply(PointerEvent::Move(Cell::new(0, 1)));

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing in-game screen should succeed");
        let area = app
            .session
            .as_ref()
            .map(|session| session.board_area)
            .expect("level should be open");
        assert_eq!(area.width, 5 * CELL_WIDTH);
        assert_eq!(area.height, 5);
        assert!(screen_text(&terminal).contains("Warm-up"));
    }

    #[test]
    fn test_in_game_without_session_fails() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let mut app = create_test_app(&dir);
        let mut terminal = create_test_terminal();
        app.screen = Screen::InGame;

        let result = terminal.draw(|frame| {
            assert!(in_game(&mut app, frame).is_err(), "no level is open");
        });

        assert!(result.is_ok(), "terminal drawing should succeed even if in_game fails");
    }

    #[test]
    fn test_pair_color_cycles_through_palette() {
        assert_eq!(pair_color(0), Color::Red);
        assert_eq!(pair_color(1), Color::Blue);
        assert_eq!(pair_color(PALETTE.len()), Color::Red);
        assert_eq!(pair_color(PALETTE.len() + 1), Color::Blue);
        assert_ne!(pair_color(PALETTE.len() + 2), Color::White);
    }

    #[test]
    fn test_board_lines_cover_board() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let mut app = create_test_app(&dir);
        assert!(app.open_level(0));
        let session = app.session.as_ref().expect("level should be open");

        let lines = board_lines(session);

        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| line.width() == 15));
    }
}
