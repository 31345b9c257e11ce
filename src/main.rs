mod cli;
mod config;
mod handlers;
mod sh;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use handlers::{oneshot, repl};
use std::process;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let status = match &cli.command {
        Some(line) => oneshot::handle_oneshot(&cli, line)?,
        None => repl::handle_repl(&cli)?,
    };
    process::exit(status)
}
