//! Log output setup.
//!
//! The terminal belongs to the game while it runs, so log records go to a file. When the file
//! cannot be opened, logging is switched off instead of scribbling over the screen.

use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    sync::Mutex,
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber, writing to `log_file`.
///
/// Returns whether this call installed it; a second call keeps the first subscriber.
pub fn init(log_file: &Path) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new(DEFAULT_FILTER));

    match open_log_file(log_file) {
        Ok(file) => {
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .try_init()
                .is_ok();

            if installed {
                tracing::info!(path = %log_file.display(), "logging initialized");
            }

            installed
        }
        Err(_err) => tracing_subscriber::registry().with(filter).try_init().is_ok(),
    }
}

/// Opens the log file for appending, creating it and its directory when needed.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_directories() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let path = dir.path().join("logs").join("game.log");

        let file = open_log_file(&path);

        assert!(file.is_ok(), "log file should be created");
        assert!(path.exists());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let path = dir.path().join("game.log");

        let _ = init(&path);

        assert!(!init(&path), "the first subscriber stays installed");

        tracing::info!("still logging");
    }
}
