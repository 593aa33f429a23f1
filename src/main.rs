//! This crate contains the source code for the binary for the game dotlink.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use std::io;

use clap::Parser as _;
use color_eyre::{
    eyre::{bail, Result},
    install,
};
use dotlink::{app, config::Cli, file_loader, logging, persistence::SaveStore, App};
use ratatui::crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};

fn main() -> Result<()> {
    install()?;

    let cli = Cli::parse();
    let _ = logging::init(&cli.log_path());

    let levels = file_loader::catalogue(&cli.levels)?;

    if cli.check {
        let rejected = file_loader::write_report(&levels, &mut io::stdout().lock())?;
        if rejected > 0 {
            bail!("{rejected} level(s) failed validation");
        }
        return Ok(());
    }

    let store = SaveStore::open(&cli.save_path())?;

    let mut terminal = ratatui::init();
    let result = app::run_guarded(
        || execute!(io::stdout(), EnableMouseCapture),
        || App::new(levels, store).run(&mut terminal),
        || execute!(io::stdout(), DisableMouseCapture),
    );
    ratatui::restore();

    result
}
