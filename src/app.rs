use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dialoguer::Select;
use owo_colors::OwoColorize;
use tracing::debug;

use darkroom_geo::{GeoClient, GeoError};
use darkroom_index::{GeoTag, Index};

use crate::install::{IMAGES_DIR, INDEX_FILE};
use crate::{editor, organise, prompts, upload, viewer, worldmap};

/// Event name used for images uploaded without a named event; they live
/// directly in the images root, whose directory name this matches.
pub const ROOT_EVENT: &str = "Images";

/// One interactive session. Owns the index, the geocoding client, and
/// the runtime that drives the geocoding calls; every operation receives
/// the app by reference instead of reaching for globals.
#[derive(Debug)]
pub struct App {
    pub index: Index,
    pub images_dir: PathBuf,
    geo: GeoClient,
    runtime: tokio::runtime::Runtime,
}

impl App {
    pub fn open(root: &Path) -> Result<Self> {
        let index_path = root.join(INDEX_FILE);
        if !index_path.is_file() {
            bail!(
                "no Darkroom installation at {}; run `darkroom init` first",
                root.display()
            );
        }
        let index = Index::open(&index_path)?;
        let images_dir = root.join(IMAGES_DIR);
        std::fs::create_dir_all(&images_dir)
            .with_context(|| format!("failed to create {}", images_dir.display()))?;

        let geo = GeoClient::new()?;
        let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
        debug!(root = %root.display(), images = index.len(), "session opened");

        Ok(Self {
            index,
            images_dir,
            geo,
            runtime,
        })
    }

    /// Directory that physically holds an event's images.
    pub fn event_dir(&self, event: &str) -> PathBuf {
        if event == ROOT_EVENT {
            self.images_dir.clone()
        } else {
            self.images_dir.join(event)
        }
    }

    /// Resolve free text to a geo triple. The first service hit wins,
    /// but the resolved display name is shown for confirmation before
    /// anything is applied. `None` means no match or user declined.
    pub fn resolve_place(&self, query: &str) -> Result<Option<GeoTag>> {
        let tag = match self.runtime.block_on(self.geo.resolve(query)) {
            Ok(tag) => tag,
            Err(GeoError::LocationNotFound(_)) => {
                println!("Sorry, no location was found for \"{query}\".");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let accepted = prompts::confirm(
            &format!(
                "Use \"{}\" ({:.4}, {:.4})?",
                tag.place, tag.latitude, tag.longitude
            ),
            true,
        )?;
        Ok(accepted.then_some(tag))
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", "Welcome to Darkroom!".cyan().bold());
        println!(
            "{} images in {} events\n",
            self.index.len(),
            self.index.events().len()
        );

        loop {
            let items = [
                "Upload images",
                "View images",
                "Edit an image",
                "Change info",
                "World map",
                "Location heatmap",
                "Delete",
                "Quit",
            ];
            let choice = Select::new()
                .with_prompt("What would you like to do?")
                .items(&items)
                .default(0)
                .interact()?;

            let result = match choice {
                0 => upload::run(self),
                1 => viewer::run(self),
                2 => editor::run(self),
                3 => organise::change_info(self),
                4 => worldmap::run(self, false),
                5 => worldmap::run(self, true),
                6 => organise::delete(self),
                _ => {
                    println!("Bye, bye!");
                    return Ok(());
                }
            };

            // A failed operation aborts only itself; the menu survives.
            if let Err(err) = result {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
            println!();
        }
    }
}
