mod app;
mod cli;
mod editor;
mod install;
mod organise;
mod prompts;
mod upload;
mod viewer;
mod worldmap;

use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{Cli, Command};

fn main() {
    // Logs go to stderr so they never interleave with the prompts.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Init { path, force }) => install::init(path, force),
        None => run_interactive(cli.root),
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run_interactive(root: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let root = install::resolve_root(root)?;
    let mut app = App::open(&root)?;
    app.run()
}
