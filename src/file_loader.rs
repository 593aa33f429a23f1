//! Level file discovery and loading.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use color_eyre::eyre::{Result, WrapErr as _};
use tracing::{info, warn};

use crate::{
    puzzle::Level,
    validator::{self, LevelError},
};

/// Extension of level definition files.
const LEVEL_EXTENSION: &str = "xml";

/// Key under which the built-in level is saved.
///
/// The slash keeps it apart from the keys of level files, which are file stems.
pub(crate) const DEFAULT_LEVEL_KEY: &str = "built-in/warm-up";

/// Built-in level listed first in the level menu.
///
/// This level keeps the game playable even when the levels directory is missing or empty.
const DEFAULT_LEVEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<puzzle size="5" name="Warm-up">
    <pair>
        <point column="0" row="0"/>
        <point column="1" row="4"/>
    </pair>
    <pair>
        <point column="2" row="0"/>
        <point column="1" row="3"/>
    </pair>
    <pair>
        <point column="2" row="1"/>
        <point column="2" row="4"/>
    </pair>
    <pair>
        <point column="4" row="0"/>
        <point column="3" row="3"/>
    </pair>
    <pair>
        <point column="4" row="1"/>
        <point column="3" row="4"/>
    </pair>
</puzzle>"#;

/// Level file as listed in the level menu.
///
/// A file is listed whether or not it validates, so that the player can see why a level is
/// unavailable; only entries holding a [`Level`] can be played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelEntry {
    /// Stem of the file name, used as save key.
    pub key: String,
    /// Name shown in the menu: the level's own name, or the key when it has none.
    pub title: String,
    /// Validated level, or the reason it was refused.
    pub level: Result<Level, LevelError>,
}

impl LevelEntry {
    /// Builds an entry from the text of a level file.
    #[must_use]
    pub fn from_source(key: &str, source: &str) -> Self {
        let level = validator::validate_source(source);
        let title = match &level {
            Ok(level) if !level.name().is_empty() => level.name().to_owned(),
            _ => key.to_owned(),
        };

        match &level {
            Ok(level) => info!(
                key,
                size = level.size(),
                pairs = level.color_count(),
                "level loaded"
            ),
            Err(err) => warn!(key, %err, "level rejected"),
        }

        Self {
            key: key.to_owned(),
            title,
            level,
        }
    }

    /// Builds the entry of a level file that could not be read as text.
    #[must_use]
    pub fn unreadable(key: &str, err: &io::Error) -> Self {
        warn!(key, %err, "level file unreadable");

        Self {
            key: key.to_owned(),
            title: key.to_owned(),
            level: Err(LevelError::Syntax(format!("unreadable file: {err}"))),
        }
    }

    /// Returns whether the entry can be played.
    #[must_use]
    pub const fn is_playable(&self) -> bool {
        self.level.is_ok()
    }
}

/// Returns the entry of the built-in level.
#[must_use]
pub fn default_entry() -> LevelEntry {
    LevelEntry::from_source(DEFAULT_LEVEL_KEY, DEFAULT_LEVEL)
}

/// Scans a directory for level files and loads them, sorted by file name.
///
/// A missing directory yields no entries. Files that are not valid levels are still returned, with
/// the reason they were refused.
///
/// # Errors
///
/// Fails when the directory exists but cannot be listed. A level file that cannot be read is
/// listed as rejected instead.
pub fn fetch_levels(dir: &Path) -> Result<Vec<LevelEntry>> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "levels directory not found");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for file in fs::read_dir(dir).wrap_err_with(|| format!("failed to list {}", dir.display()))? {
        let path = file?.path();

        if path.is_file()
            && path
                .extension()
                .is_some_and(|extension| extension == LEVEL_EXTENSION)
        {
            paths.push(path);
        }
    }
    paths.sort();

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let key = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let entry = match fs::read_to_string(&path) {
            Ok(source) => LevelEntry::from_source(&key, &source),
            Err(err) => LevelEntry::unreadable(&key, &err),
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Returns the built-in level followed by every level found in the directory.
///
/// # Errors
///
/// Propagates the errors of [`fetch_levels`].
pub fn catalogue(dir: &Path) -> Result<Vec<LevelEntry>> {
    let mut entries = vec![default_entry()];
    entries.extend(fetch_levels(dir)?);

    Ok(entries)
}

/// Writes one line per entry telling whether it can be played, and returns how many cannot.
///
/// # Errors
///
/// Fails when writing to `out` fails.
pub fn write_report<W: Write>(entries: &[LevelEntry], out: &mut W) -> Result<usize> {
    let mut rejected = 0;

    for entry in entries {
        match &entry.level {
            Ok(level) => writeln!(
                out,
                "ok       {}: {} ({size}x{size}, {} pairs)",
                entry.key,
                entry.title,
                level.color_count(),
                size = level.size(),
            )?,
            Err(err) => {
                rejected += 1;
                writeln!(
                    out,
                    "rejected {}: {} error: {err}",
                    entry.key,
                    err.pass().label(),
                )?;
            }
        }
    }

    Ok(rejected)
}
