//! Terminal front-end for the rpncalc engine.
//!
//! This crate provides:
//! - `command` - Input line parsing and session commands
//! - `session` - A [`Session`] wrapping one engine
//! - `format` - Fixed-point and engineering number formatters
//! - `plot` - A sparkline plot sink

pub mod command;
pub mod error;
pub mod format;
pub mod plot;
pub mod session;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;

pub use error::CliError;
pub use session::{Flow, Session};

/// An RPN calculator with an embedded expression language.
#[derive(Clone, Debug, Parser)]
#[command(name = "rpncalc", version, about, long_about = None)]
pub struct Options {
    /// Engine configuration file (TOML).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Session file: loaded at start when it exists, saved on exit.
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Skip the configured startup statements.
    #[arg(long)]
    pub no_startup: bool,

    /// Show floats in engineering notation.
    #[arg(long)]
    pub eng: bool,

    /// Decimal places for floats.
    #[arg(short, long)]
    pub precision: Option<usize>,
}

/// Run a session over stdin until end of input or `:quit`.
pub fn run(options: Options) -> Result<(), CliError> {
    let mut session = Session::new(&options)?;
    let interactive = io::stdin().is_terminal();
    let stdout = io::stdout();

    prompt(&session, interactive)?;
    for line in io::stdin().lock().lines() {
        let (flow, output) = session.handle(&line?)?;
        let mut out = stdout.lock();
        for text in output {
            writeln!(out, "{}", text)?;
        }
        drop(out);
        if flow == Flow::Quit {
            return Ok(());
        }
        prompt(&session, interactive)?;
    }
    session.save_on_exit()
}

fn prompt(session: &Session, interactive: bool) -> Result<(), CliError> {
    if interactive {
        let mut out = io::stdout().lock();
        write!(out, "{}", if session.reading_definition() { "... " } else { "> " })?;
        out.flush()?;
    }
    Ok(())
}
