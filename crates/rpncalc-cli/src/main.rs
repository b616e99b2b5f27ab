//! rpncalc - RPN calculator for the terminal.
//!
//! Reads one token per line from stdin and prints the stack after each.
//! An empty line is `enter`; lines starting with `:` are session commands
//! (`:help` lists them).

use clap::Parser;

use rpncalc_cli::Options;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = rpncalc_cli::run(Options::parse()) {
        eprintln!("rpncalc: {}", e);
        std::process::exit(1);
    }
}
