//! Level definition validation.
//!
//! A level definition comes from a file the player may have written by hand, so it is checked in
//! two independent passes before it is offered for play:
//!
//! - the structural pass checks element names, attributes, integer syntax and ranges;
//! - the logical pass, run only on structurally valid input, checks that the definition describes a
//!   playable board: every pair has two points, no two points share a square, and there is at least
//!   one pair.
//!
//! Either pass rejecting the definition rejects the level; there is no partial acceptance. The
//! reason is reported as a [`LevelError`] variant so that the level list can show why a file was
//! refused.

use std::collections::HashSet;

use thiserror::Error;

use crate::{
    document::Element,
    puzzle::{Cell, Endpoint, Level, MAX_GRID_SIZE, MIN_GRID_SIZE},
};

/// Name of the root element.
const PUZZLE: &str = "puzzle";
/// Name of the element grouping the two points of one color.
const PAIR: &str = "pair";
/// Name of the element placing one endpoint.
const POINT: &str = "point";
/// Grid size attribute of the root element.
const SIZE: &str = "size";
/// Optional display name attribute of the root element.
const NAME: &str = "name";
/// Column attribute of a point.
const COLUMN: &str = "column";
/// Row attribute of a point.
const ROW: &str = "row";

/// Validation stage a [`LevelError`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationPass {
    /// The text could not be read as a document at all.
    Syntax,
    /// The document does not follow the level format.
    Structural,
    /// The document follows the format but does not describe a playable board.
    Logical,
}

impl ValidationPass {
    /// Returns the lowercase name of the stage.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Structural => "structural",
            Self::Logical => "logical",
        }
    }
}

/// Reason a level definition was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The level text is not well-formed XML.
    #[error("malformed document: {0}")]
    Syntax(String),
    /// The root element is not a `puzzle`.
    #[error("root element is <{0}>, expected <puzzle>")]
    NotAPuzzle(String),
    /// The `puzzle` element has no `size` attribute.
    #[error("puzzle has no size attribute")]
    MissingSize,
    /// The `size` attribute is not an integer.
    #[error("puzzle size {0:?} is not an integer")]
    InvalidSize(String),
    /// The `size` attribute is an integer outside the accepted range.
    #[error("puzzle size {0} is outside {min}..={max}", min = MIN_GRID_SIZE, max = MAX_GRID_SIZE)]
    SizeOutOfRange(i64),
    /// The `name` attribute is present but blank.
    #[error("puzzle name is blank")]
    BlankName,
    /// An element carries an attribute the format does not define.
    #[error("<{element}> carries unexpected attribute {attribute:?}")]
    UnexpectedAttribute {
        /// Element carrying the attribute.
        element: String,
        /// Name of the offending attribute.
        attribute: String,
    },
    /// An element appears where the format does not allow it.
    #[error("unexpected <{element}> inside <{parent}>")]
    UnexpectedElement {
        /// Element that was found.
        element: String,
        /// Element containing it.
        parent: String,
    },
    /// A point lacks its `column` or `row` attribute.
    #[error("point has no {0} attribute")]
    MissingCoordinate(&'static str),
    /// A point coordinate is not an integer.
    #[error("point {axis} {value:?} is not an integer")]
    InvalidCoordinate {
        /// Attribute holding the value.
        axis: &'static str,
        /// Raw attribute value.
        value: String,
    },
    /// A point coordinate lies outside the grid.
    #[error("point {axis} {value} is outside a grid of size {size}")]
    CoordinateOutOfRange {
        /// Attribute holding the value.
        axis: &'static str,
        /// Parsed coordinate.
        value: i64,
        /// Side length of the grid.
        size: u8,
    },
    /// A pair does not hold exactly two points.
    #[error("pair {pair} holds {points} point(s), expected 2")]
    PairSize {
        /// Zero-based index of the pair in document order.
        pair: usize,
        /// Number of points found in it.
        points: usize,
    },
    /// Two points of the level occupy the same square.
    #[error("more than one point at column {column}, row {row}")]
    DuplicatePoint {
        /// Column of the shared square.
        column: i32,
        /// Row of the shared square.
        row: i32,
    },
    /// The level defines no pair at all.
    #[error("puzzle defines no pair")]
    NoPairs,
}

impl LevelError {
    /// Returns the validation stage that produced this error.
    #[must_use]
    pub const fn pass(&self) -> ValidationPass {
        match self {
            Self::Syntax(_) => ValidationPass::Syntax,
            Self::NotAPuzzle(_)
            | Self::MissingSize
            | Self::InvalidSize(_)
            | Self::SizeOutOfRange(_)
            | Self::BlankName
            | Self::UnexpectedAttribute { .. }
            | Self::UnexpectedElement { .. }
            | Self::MissingCoordinate(_)
            | Self::InvalidCoordinate { .. }
            | Self::CoordinateOutOfRange { .. } => ValidationPass::Structural,
            Self::PairSize { .. } | Self::DuplicatePoint { .. } | Self::NoPairs => {
                ValidationPass::Logical
            }
        }
    }
}

/// Output of the structural pass.
///
/// The grouping of points into pairs is kept exactly as written so that the logical pass can judge
/// it.
#[derive(Debug)]
struct Outline {
    /// Side length of the grid.
    size: u8,
    /// Display name, empty when absent.
    name: String,
    /// Points of every pair, in document order.
    pairs: Vec<Vec<Cell>>,
}

/// Validates a parsed level definition and builds the level it describes.
///
/// Endpoints keep document order and each pair's color is its zero-based position among the pairs.
///
/// # Errors
///
/// Returns the first rule the definition breaks; structural rules are checked before logical ones.
pub fn validate(root: &Element) -> Result<Level, LevelError> {
    let outline = check_structure(root)?;

    check_logic(outline)
}

/// Returns whether a parsed level definition may be offered for play.
#[must_use]
pub fn is_playable(root: &Element) -> bool {
    validate(root).is_ok()
}

/// Parses and validates the text of a level file in one step.
///
/// # Errors
///
/// Returns [`LevelError::Syntax`] for text that is not XML, or any validation failure.
pub fn validate_source(source: &str) -> Result<Level, LevelError> {
    validate(&crate::document::parse(source)?)
}

/// Runs the structural pass.
fn check_structure(root: &Element) -> Result<Outline, LevelError> {
    if root.name() != PUZZLE {
        return Err(LevelError::NotAPuzzle(root.name().to_owned()));
    }

    let size = parse_size(root)?;

    check_attributes(root, &[SIZE, NAME])?;

    let name = match root.attribute(NAME) {
        Some(name) if name.trim().is_empty() => return Err(LevelError::BlankName),
        Some(name) => name.to_owned(),
        None => String::new(),
    };

    let mut pairs = Vec::with_capacity(root.children().len());
    for pair in root.children() {
        expect_element(pair, PAIR, root)?;
        check_attributes(pair, &[])?;

        let mut points = Vec::with_capacity(2);
        for point in pair.children() {
            expect_element(point, POINT, pair)?;
            points.push(parse_point(point, size)?);
        }

        pairs.push(points);
    }

    Ok(Outline { size, name, pairs })
}

/// Runs the logical pass and assigns colors.
fn check_logic(outline: Outline) -> Result<Level, LevelError> {
    if outline.pairs.is_empty() {
        return Err(LevelError::NoPairs);
    }

    let mut occupied = HashSet::new();
    let mut endpoints = Vec::with_capacity(outline.pairs.len() * 2);

    for (color, points) in outline.pairs.into_iter().enumerate() {
        if points.len() != 2 {
            return Err(LevelError::PairSize {
                pair: color,
                points: points.len(),
            });
        }

        for cell in points {
            if !occupied.insert(cell) {
                return Err(LevelError::DuplicatePoint {
                    column: cell.column,
                    row: cell.row,
                });
            }

            endpoints.push(Endpoint { cell, color });
        }
    }

    Ok(Level::from_validated(
        outline.size,
        endpoints,
        outline.name,
    ))
}

/// Reads and range-checks the grid size of the root element.
fn parse_size(root: &Element) -> Result<u8, LevelError> {
    let raw = root.attribute(SIZE).ok_or(LevelError::MissingSize)?;
    let value = raw
        .parse::<i64>()
        .map_err(|_err| LevelError::InvalidSize(raw.to_owned()))?;

    u8::try_from(value)
        .ok()
        .filter(|size| (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(size))
        .ok_or(LevelError::SizeOutOfRange(value))
}

/// Reads one point, rejecting stray attributes and out-of-grid coordinates.
fn parse_point(point: &Element, size: u8) -> Result<Cell, LevelError> {
    check_attributes(point, &[COLUMN, ROW])?;

    if let Some(child) = point.children().first() {
        return Err(LevelError::UnexpectedElement {
            element: child.name().to_owned(),
            parent: POINT.to_owned(),
        });
    }

    let column = parse_coordinate(point, COLUMN, size)?;
    let row = parse_coordinate(point, ROW, size)?;

    Ok(Cell::new(column, row))
}

/// Reads one coordinate attribute of a point.
fn parse_coordinate(point: &Element, axis: &'static str, size: u8) -> Result<i32, LevelError> {
    let raw = point
        .attribute(axis)
        .ok_or(LevelError::MissingCoordinate(axis))?;
    let value = raw
        .parse::<i64>()
        .map_err(|_err| LevelError::InvalidCoordinate {
            axis,
            value: raw.to_owned(),
        })?;

    i32::try_from(value)
        .ok()
        .filter(|coordinate| (0..i32::from(size)).contains(coordinate))
        .ok_or(LevelError::CoordinateOutOfRange { axis, value, size })
}

/// Rejects any attribute of `element` that is not listed in `allowed`.
fn check_attributes(element: &Element, allowed: &[&str]) -> Result<(), LevelError> {
    match element
        .attribute_names()
        .find(|attribute| !allowed.contains(attribute))
    {
        Some(attribute) => Err(LevelError::UnexpectedAttribute {
            element: element.name().to_owned(),
            attribute: attribute.to_owned(),
        }),
        None => Ok(()),
    }
}

/// Rejects `element` unless it is named `expected`.
fn expect_element(element: &Element, expected: &str, parent: &Element) -> Result<(), LevelError> {
    if element.name() == expected {
        Ok(())
    } else {
        Err(LevelError::UnexpectedElement {
            element: element.name().to_owned(),
            parent: parent.name().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::ColorId;

    /// Builds a `point` element.
    fn point(column: &str, row: &str) -> Element {
        Element::new(POINT)
            .with_attribute(COLUMN, column)
            .with_attribute(ROW, row)
    }

    /// Builds a `pair` element from its points.
    fn pair(points: Vec<Element>) -> Element {
        points
            .into_iter()
            .fold(Element::new(PAIR), Element::with_child)
    }

    /// Builds the two-color corner level as a document tree.
    fn create_corner_document() -> Element {
        Element::new(PUZZLE)
            .with_attribute(SIZE, "5")
            .with_attribute(NAME, "Corners")
            .with_child(pair(vec![point("0", "0"), point("4", "4")]))
            .with_child(pair(vec![point("0", "4"), point("4", "0")]))
    }

    #[test]
    fn test_validate_accepts_well_formed_level() {
        let level = validate(&create_corner_document()).expect("corner level should validate");

        assert_eq!(level.size(), 5);
        assert_eq!(level.name(), "Corners");
        assert_eq!(level.color_count(), 2);

        let placed: Vec<(i32, i32, ColorId)> = level
            .endpoints()
            .iter()
            .map(|endpoint| (endpoint.cell.column, endpoint.cell.row, endpoint.color))
            .collect();
        assert_eq!(placed, [(0, 0, 0), (4, 4, 0), (0, 4, 1), (4, 0, 1)]);
    }

    #[test]
    fn test_validate_every_color_appears_twice() {
        let level = validate_source(
            r#"<puzzle size="7">
                <pair><point column="0" row="0"/><point column="6" row="6"/></pair>
                <pair><point column="1" row="0"/><point column="1" row="6"/></pair>
                <pair><point column="2" row="3"/><point column="5" row="3"/></pair>
            </puzzle>"#,
        )
        .expect("three-pair level should validate");

        assert_eq!(level.endpoints().len() % 2, 0);
        for color in 0..level.color_count() {
            let count = level
                .endpoints()
                .iter()
                .filter(|endpoint| endpoint.color == color)
                .count();
            assert_eq!(count, 2, "color {color} should appear exactly twice");
        }
    }

    #[test]
    fn test_validate_name_is_optional() {
        let document = Element::new(PUZZLE)
            .with_attribute(SIZE, "5")
            .with_child(pair(vec![point("0", "0"), point("1", "0")]));

        let level = validate(&document).expect("unnamed level should validate");

        assert_eq!(level.name(), "");
    }

    #[test]
    fn test_validate_rejects_wrong_root() {
        let document = Element::new("level").with_attribute(SIZE, "5");

        assert_eq!(
            validate(&document),
            Err(LevelError::NotAPuzzle("level".to_owned()))
        );
    }

    #[test]
    fn test_validate_rejects_size_below_minimum() {
        let result = validate_source(
            r#"<puzzle size="4"><pair><point column="0" row="0"/><point column="3" row="3"/></pair></puzzle>"#,
        );

        assert_eq!(result, Err(LevelError::SizeOutOfRange(4)));
    }

    #[test]
    fn test_validate_size_bounds() {
        for (size, accepted) in [("5", true), ("14", true), ("15", false), ("-5", false)] {
            let document = Element::new(PUZZLE)
                .with_attribute(SIZE, size)
                .with_child(pair(vec![point("0", "0"), point("1", "0")]));

            assert_eq!(is_playable(&document), accepted, "size {size}");
        }
    }

    #[test]
    fn test_validate_rejects_missing_or_garbled_size() {
        let missing = Element::new(PUZZLE).with_child(pair(vec![point("0", "0"), point("1", "0")]));
        let garbled = Element::new(PUZZLE)
            .with_attribute(SIZE, "five")
            .with_child(pair(vec![point("0", "0"), point("1", "0")]));
        let padded = Element::new(PUZZLE)
            .with_attribute(SIZE, " 5 ")
            .with_child(pair(vec![point("0", "0"), point("1", "0")]));

        assert_eq!(validate(&missing), Err(LevelError::MissingSize));
        assert_eq!(
            validate(&garbled),
            Err(LevelError::InvalidSize("five".to_owned()))
        );
        assert_eq!(
            validate(&padded),
            Err(LevelError::InvalidSize(" 5 ".to_owned()))
        );
    }

    #[test]
    fn test_validate_rejects_extra_puzzle_attribute() {
        let document = create_corner_document().with_attribute("author", "someone");

        assert_eq!(
            validate(&document),
            Err(LevelError::UnexpectedAttribute {
                element: PUZZLE.to_owned(),
                attribute: "author".to_owned(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let document = Element::new(PUZZLE)
            .with_attribute(SIZE, "5")
            .with_attribute(NAME, "   ")
            .with_child(pair(vec![point("0", "0"), point("1", "0")]));

        assert_eq!(validate(&document), Err(LevelError::BlankName));
    }

    #[test]
    fn test_validate_rejects_unknown_child() {
        let document = create_corner_document().with_child(Element::new("hint"));

        assert_eq!(
            validate(&document),
            Err(LevelError::UnexpectedElement {
                element: "hint".to_owned(),
                parent: PUZZLE.to_owned(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_point_outside_pair() {
        let document = create_corner_document().with_child(point("2", "2"));

        assert!(matches!(
            validate(&document),
            Err(LevelError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nested_puzzle() {
        let document = Element::new(PUZZLE)
            .with_attribute(SIZE, "5")
            .with_child(pair(vec![point("0", "0"), Element::new(PUZZLE)]));

        assert_eq!(
            validate(&document),
            Err(LevelError::UnexpectedElement {
                element: PUZZLE.to_owned(),
                parent: PAIR.to_owned(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_points() {
        let cases = [
            (
                Element::new(POINT).with_attribute(COLUMN, "1"),
                LevelError::MissingCoordinate(ROW),
            ),
            (
                point("x", "1"),
                LevelError::InvalidCoordinate {
                    axis: COLUMN,
                    value: "x".to_owned(),
                },
            ),
            (
                point(" 0", "1"),
                LevelError::InvalidCoordinate {
                    axis: COLUMN,
                    value: " 0".to_owned(),
                },
            ),
            (
                point("1", "0 "),
                LevelError::InvalidCoordinate {
                    axis: ROW,
                    value: "0 ".to_owned(),
                },
            ),
            (
                point("1", "5"),
                LevelError::CoordinateOutOfRange {
                    axis: ROW,
                    value: 5,
                    size: 5,
                },
            ),
            (
                point("-1", "0"),
                LevelError::CoordinateOutOfRange {
                    axis: COLUMN,
                    value: -1,
                    size: 5,
                },
            ),
            (
                point("1", "1").with_attribute("color", "red"),
                LevelError::UnexpectedAttribute {
                    element: POINT.to_owned(),
                    attribute: "color".to_owned(),
                },
            ),
        ];

        for (bad_point, expected) in cases {
            let document = Element::new(PUZZLE)
                .with_attribute(SIZE, "5")
                .with_child(pair(vec![point("0", "0"), bad_point]));

            let error = validate(&document).expect_err("bad point should be rejected");
            assert_eq!(error, expected);
            assert_eq!(error.pass(), ValidationPass::Structural);
        }
    }

    #[test]
    fn test_validate_rejects_pair_of_wrong_size() {
        let lonely = create_corner_document().with_child(pair(vec![point("2", "2")]));
        let crowded = create_corner_document().with_child(pair(vec![
            point("2", "2"),
            point("2", "3"),
            point("2", "4"),
        ]));

        assert_eq!(
            validate(&lonely),
            Err(LevelError::PairSize { pair: 2, points: 1 })
        );
        assert_eq!(
            validate(&crowded),
            Err(LevelError::PairSize { pair: 2, points: 3 })
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_point_across_pairs() {
        let result = validate_source(
            r#"<puzzle size="5">
                <pair><point column="0" row="0"/><point column="2" row="2"/></pair>
                <pair><point column="2" row="2"/><point column="4" row="4"/></pair>
            </puzzle>"#,
        );

        let error = result.expect_err("shared square should be rejected");
        assert_eq!(error, LevelError::DuplicatePoint { column: 2, row: 2 });
        assert_eq!(error.pass(), ValidationPass::Logical);
    }

    #[test]
    fn test_validate_rejects_duplicate_point_within_pair() {
        let document = Element::new(PUZZLE)
            .with_attribute(SIZE, "5")
            .with_child(pair(vec![point("3", "1"), point("3", "1")]));

        assert_eq!(
            validate(&document),
            Err(LevelError::DuplicatePoint { column: 3, row: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_level_without_pairs() {
        let document = Element::new(PUZZLE).with_attribute(SIZE, "5");

        assert_eq!(validate(&document), Err(LevelError::NoPairs));
        assert_eq!(LevelError::NoPairs.pass(), ValidationPass::Logical);
    }

    #[test]
    fn test_structural_errors_win_over_logical_ones() {
        let document = Element::new(PUZZLE)
            .with_attribute(SIZE, "5")
            .with_child(pair(vec![point("0", "0")]))
            .with_child(pair(vec![point("1", "1"), point("9", "1")]));

        assert_eq!(
            validate(&document).map_err(|err| err.pass()),
            Err(ValidationPass::Structural)
        );
    }

    #[test]
    fn test_validate_source_reports_syntax_errors() {
        let error = validate_source("<puzzle size=\"5\">").expect_err("unterminated root");

        assert_eq!(error.pass(), ValidationPass::Syntax);
    }

    #[test]
    fn test_validate_source_rejects_padded_numbers() {
        let source = concat!(
            r#"<puzzle size=" 5 "><pair>"#,
            r#"<point column=" 0" row="0 "/><point column="1" row="0"/>"#,
            "</pair></puzzle>",
        );

        assert_eq!(
            validate_source(source),
            Err(LevelError::InvalidSize(" 5 ".to_owned()))
        );
    }
}
