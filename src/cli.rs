use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "darkroom", version)]
#[command(about = "A command-line digital darkroom for your photo collection")]
#[command(
    long_about = "Darkroom organizes images into event folders, indexes their \
metadata, and lets you browse, edit, geotag, and map them from the terminal."
)]
pub struct Cli {
    /// Program root holding Images/ and the index snapshot
    /// (default: $DARKROOM_ROOT, then ~/Darkroom)
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh Darkroom root with an empty image index
    Init {
        /// Destination directory (absolute, or relative to the home directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Erase and replace an existing installation
        #[arg(long)]
        force: bool,
    },
}
