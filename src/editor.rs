use anyhow::Result;
use image::DynamicImage;

use darkroom_imaging::{EnhanceKind, FilterKind, apply_enhance, apply_filter, load_image, save_image};
use darkroom_index::Index;

use crate::app::App;
use crate::prompts;

pub fn run(app: &mut App) -> Result<()> {
    let Some(event) = prompts::choose_event(&app.index)? else {
        return Ok(());
    };
    let Some(name) = prompts::choose_image(&app.index, &event)? else {
        return Ok(());
    };
    edit_image(app, &name)
}

/// Edit one image: apply filters/enhancements in memory, then decide
/// what to keep. Quitting at any prompt drops the pending result.
pub fn edit_image(app: &mut App, filename: &str) -> Result<()> {
    let event = app.index.lookup(filename)?.event.clone();
    let path = app.event_dir(&event).join(filename);
    let img = load_image(&path)?;

    loop {
        let Some(choice) = prompts::select(
            &format!("Editing {filename}"),
            &["Apply a filter", "Adjust an enhancement"],
        )?
        else {
            return Ok(());
        };

        let edited = match choice {
            0 => {
                let labels: Vec<&str> = FilterKind::ALL.iter().map(|f| f.label()).collect();
                let Some(i) = prompts::select("Filter", &labels)? else {
                    continue;
                };
                apply_filter(&img, FilterKind::ALL[i])
            }
            _ => {
                let labels: Vec<&str> = EnhanceKind::ALL.iter().map(|e| e.label()).collect();
                let Some(i) = prompts::select("Enhancement", &labels)? else {
                    continue;
                };
                let Some(factor) = prompts::input_factor(
                    "Effect strength (1 keeps the original, below 1 reduces, above 1 boosts)",
                )?
                else {
                    continue;
                };
                apply_enhance(&img, EnhanceKind::ALL[i], factor)
            }
        };

        if save_flow(app, &edited, filename)? {
            return Ok(());
        }
    }
}

/// Returns true when the edit session is finished (saved or abandoned),
/// false to keep editing the original.
fn save_flow(app: &mut App, edited: &DynamicImage, original: &str) -> Result<bool> {
    let event = app.index.lookup(original)?.event.clone();
    let dir = app.event_dir(&event);

    let Some(choice) = prompts::select(
        "Keep the result?",
        &["Replace the original", "Save as a new image", "Keep editing"],
    )?
    else {
        return Ok(true);
    };

    match choice {
        0 => {
            save_image(edited, &dir.join(original))?;
            app.index.set_edited(original)?;
            app.index.persist()?;
            println!("Replaced {original}.");
            Ok(true)
        }
        1 => {
            let new_name = next_free_name(&app.index, original);
            save_image(edited, &dir.join(&new_name))?;

            let mut record = app.index.lookup(original)?.clone();
            record.filename = new_name.clone();
            record.edited = true;
            app.index.insert(record)?;
            app.index.persist()?;
            println!("Saved as {new_name}.");
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Derive a free filename for a save-as-new edit: `shot.jpg` becomes
/// `shot_2.jpg`, then `shot_3.jpg`, until the key is unused.
pub fn next_free_name(index: &Index, original: &str) -> String {
    let (stem, ext) = match original.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (original, None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if !index.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
