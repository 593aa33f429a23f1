//! Suspend and resume of boards in progress.
//!
//! The engine hands its committed paths over as [`SavedPaths`], a flat `color -> cells` map, and
//! takes them back through [`PathEngine::restore_paths`](crate::engine::PathEngine::restore_paths).
//! [`SaveStore`] keeps one such map per level in a JSON file so that a board survives the player
//! quitting the game.

use std::{
    collections::{btree_map, BTreeMap},
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::puzzle::{Cell, ColorId};

/// Committed paths of one board, keyed by color.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedPaths(BTreeMap<ColorId, Vec<Cell>>);

impl SavedPaths {
    /// Wraps a `color -> cells` map.
    #[must_use]
    pub const fn new(paths: BTreeMap<ColorId, Vec<Cell>>) -> Self {
        Self(paths)
    }

    /// Iterates over the saved paths in color order.
    pub fn iter(&self) -> btree_map::Iter<'_, ColorId, Vec<Cell>> {
        self.0.iter()
    }

    /// Returns whether no path is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of saved paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'paths> IntoIterator for &'paths SavedPaths {
    type Item = (&'paths ColorId, &'paths Vec<Cell>);
    type IntoIter = btree_map::Iter<'paths, ColorId, Vec<Cell>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Boards in progress, keyed by level.
///
/// The store is a plain JSON object mapping the level key (the level file's stem) to its saved
/// paths. Changes stay in memory until [`persist`](SaveStore::persist) is called.
#[derive(Debug)]
pub struct SaveStore {
    /// File the store is read from and written to.
    path: PathBuf,
    /// Saved boards by level key.
    boards: BTreeMap<String, SavedPaths>,
}

impl SaveStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store; it is created on the first [`persist`](Self::persist).
    /// A file that is not a JSON object yields an empty store, and entries that do not decode as
    /// saved paths are skipped, so a damaged save never keeps the game from starting.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let boards = if path.exists() {
            let contents = fs::read(path)
                .wrap_err_with(|| format!("failed to read save file {}", path.display()))?;
            decode_boards(path, &contents)
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), boards = boards.len(), "save store opened");

        Ok(Self {
            path: path.to_owned(),
            boards,
        })
    }

    /// Returns the saved board of a level.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SavedPaths> {
        self.boards.get(key)
    }

    /// Records the board of a level, replacing any earlier one.
    pub fn put(&mut self, key: &str, paths: SavedPaths) {
        let _ = self.boards.insert(key.to_owned(), paths);
    }

    /// Forgets the board of a level.
    pub fn remove(&mut self, key: &str) {
        let _ = self.boards.remove(key);
    }

    /// Writes the store back to its file, creating parent directories as needed.
    ///
    /// The store is written to a sibling temporary file which then replaces the save file, so an
    /// interrupted write leaves the previous save intact.
    ///
    /// # Errors
    ///
    /// Fails when the directory or the file cannot be written.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)
                .wrap_err_with(|| format!("failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.boards)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)
            .wrap_err_with(|| format!("failed to write save file {}", self.path.display()))?;

        info!(path = %self.path.display(), boards = self.boards.len(), "save store written");

        Ok(())
    }

    /// Returns the file the store is staged in before replacing the save file.
    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

/// Decodes the saved boards of a store file, dropping whatever cannot be read.
fn decode_boards(path: &Path, contents: &[u8]) -> BTreeMap<String, SavedPaths> {
    let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_slice(contents) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), %err, "save file is unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(paths) => Some((key, paths)),
            Err(err) => {
                warn!(key = %key, %err, "skipping damaged saved board");
                None
            }
        })
        .collect()
}
