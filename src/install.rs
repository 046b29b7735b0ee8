use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use darkroom_index::Index;

pub const IMAGES_DIR: &str = "Images";
pub const INDEX_FILE: &str = "index.json";

const DEFAULT_ROOT: &str = "Darkroom";
const ROOT_ENV: &str = "DARKROOM_ROOT";

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine the home directory")
}

/// Interpret a user-supplied path: absolute paths are used as-is,
/// everything else is taken relative to the home directory.
pub fn expand_home(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(home_dir()?.join(path))
    }
}

/// Resolve the program root: `--root` flag, then $DARKROOM_ROOT, then
/// `~/Darkroom`.
pub fn resolve_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    let candidate = match flag {
        Some(path) => path,
        None => match std::env::var_os(ROOT_ENV) {
            Some(value) => PathBuf::from(value),
            None => return Ok(home_dir()?.join(DEFAULT_ROOT)),
        },
    };
    expand_home(candidate)
}

/// Create a fresh installation: the root directory, the images folder,
/// and an empty index snapshot.
pub fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let root = match path {
        Some(path) => expand_home(path)?,
        None => resolve_root(None)?,
    };

    if root.exists() {
        if !force {
            bail!(
                "{} already exists; pass --force to replace it (this erases the existing installation)",
                root.display()
            );
        }
        fs::remove_dir_all(&root)
            .with_context(|| format!("failed to remove {}", root.display()))?;
    }

    fs::create_dir_all(root.join(IMAGES_DIR))
        .with_context(|| format!("failed to create {}", root.join(IMAGES_DIR).display()))?;
    Index::create(&root.join(INDEX_FILE))?;

    info!(root = %root.display(), "installation created");
    println!("Darkroom installed at {}", root.display());
    Ok(())
}
