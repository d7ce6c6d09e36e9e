use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use dicetray::prelude::*;

mod app;
mod keys;
mod terminal;
mod ui;

use app::App;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of dice on the tray at startup
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=8))]
    dice: u8,

    /// Random seed for reproducibility
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    /// Draw faces as digits even if the terminal handles dice glyphs
    #[arg(long, default_value_t = false)]
    ascii: bool,

    /// Write the roll history as JSON to this file on quit
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Write log output to this file (the screen belongs to the UI)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let target: Box<dyn std::io::Write + Send> = match log_file {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?,
        ),
        None => Box::new(std::io::sink()),
    };
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    log::info!("Starting dice tray with args: {:?}", args);

    let roller = match args.seed {
        Some(seed) => Roller::from_seed(seed),
        None => Roller::new(),
    };
    let symbols = if args.ascii {
        FaceSymbols::Ascii
    } else {
        FaceSymbols::Unicode
    };
    let capabilities = terminal::probe_capabilities();
    let mut app = App::new(roller, &capabilities, symbols, args.dice as usize);

    terminal::install_panic_hook();
    let mut tui = terminal::enter()?;
    let result = app.run(&mut tui).await;
    terminal::leave(&mut tui)?;
    result?;

    let history = app.controller.session().history();
    log::info!("Session finished after {} rolls", history.len());
    if let Some(path) = &args.history {
        history
            .save(path)
            .with_context(|| format!("writing roll history to {}", path.display()))?;
        log::info!("Roll history written to {}", path.display());
    }

    Ok(())
}
