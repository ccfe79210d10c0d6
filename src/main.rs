mod api;
mod cli;
mod clipboard;
mod config;
mod error;
mod extensions;
mod file_scanner;
mod logging;
mod paths;
mod session;
mod settings;
mod tree_builder;
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // The clipboard daemon is a re-exec of this binary and must exit before argument parsing.
    if clipboard::check_and_run_daemon_if_requested()? {
        return Ok(());
    }

    let cli_args = cli::Cli::parse();

    workflow::run_filewizard(cli_args)
}
