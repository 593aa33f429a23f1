//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

/// Name of the directory holding the game's files inside the platform data directory.
const APP_DIR: &str = "dotlink";

/// Command-line options of the game.
#[derive(Debug, Parser)]
#[command(version, about = "Connect matching dots with non-crossing paths in the terminal.")]
pub struct Cli {
    /// Directory scanned for `*.xml` level definitions.
    #[arg(long, value_name = "DIR", default_value = "levels")]
    pub levels: PathBuf,
    /// File boards in progress are saved to when quitting.
    #[arg(long, value_name = "PATH")]
    pub save_file: Option<PathBuf>,
    /// File log output is appended to.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// Validate every level and print a report instead of starting the game.
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// Returns the save file, defaulting to one in the platform data directory.
    #[must_use]
    pub fn save_path(&self) -> PathBuf {
        self.save_file
            .clone()
            .unwrap_or_else(|| data_file("saves.json", "dotlink-saves.json"))
    }

    /// Returns the log file, defaulting to one in the platform data directory.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_file("dotlink.log", "dotlink.log"))
    }
}

/// Places `name` in the game's data directory, or `fallback` in the working directory when the
/// platform has no data directory.
fn data_file(name: &str, fallback: &str) -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(fallback),
        |dir| dir.join(APP_DIR).join(name),
    )
}
