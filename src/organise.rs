//! Change event/image information (name, location) and delete events or
//! images.
//!
//! Index and filesystem are not updated transactionally: the filesystem
//! operation runs first, and the index is only touched once it succeeds.
//! A persist failure after a filesystem change can still leave the two
//! out of step; the error is reported, not rolled back.

use std::fs;

use anyhow::{Context, Result};

use crate::app::{App, ROOT_EVENT};
use crate::prompts;

pub fn change_info(app: &mut App) -> Result<()> {
    let Some(kind) = prompts::select("Change information for", &["An event", "An image"])? else {
        return Ok(());
    };
    match kind {
        0 => change_event(app),
        _ => change_image(app),
    }
}

pub fn delete(app: &mut App) -> Result<()> {
    let Some(kind) = prompts::select(
        "What would you like to delete?",
        &["An entire event", "A single image"],
    )?
    else {
        return Ok(());
    };
    match kind {
        0 => delete_event(app),
        _ => delete_image(app),
    }
}

fn change_event(app: &mut App) -> Result<()> {
    let Some(event) = prompts::choose_event(&app.index)? else {
        return Ok(());
    };
    let Some(what) = prompts::select("What would you like to change?", &["Name", "Location"])?
    else {
        return Ok(());
    };

    match what {
        0 => {
            if event == ROOT_EVENT {
                println!("The images root cannot be renamed.");
                return Ok(());
            }
            let Some(new_name) = prompts::input("New event name")? else {
                return Ok(());
            };
            if new_name.contains(['/', '\\']) {
                println!("Event names cannot contain path separators.");
                return Ok(());
            }
            let new_dir = app.images_dir.join(&new_name);
            if new_dir.exists() {
                println!("An event folder named \"{new_name}\" already exists.");
                return Ok(());
            }

            let old_dir = app.event_dir(&event);
            fs::rename(&old_dir, &new_dir).with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    old_dir.display(),
                    new_dir.display()
                )
            })?;
            let updated = app.index.rename_event(&event, &new_name);
            app.index.persist()?;
            println!("Renamed \"{event}\" to \"{new_name}\" ({updated} images).");
        }
        _ => {
            let Some(query) =
                prompts::input("New location (a country, city, village or address)")?
            else {
                return Ok(());
            };
            let Some(tag) = app.resolve_place(&query)? else {
                return Ok(());
            };
            let updated = app.index.set_event_location(&event, tag)?;
            app.index.persist()?;
            println!("The event location has been changed ({updated} images).");
        }
    }
    Ok(())
}

fn change_image(app: &mut App) -> Result<()> {
    let Some(event) = prompts::choose_event(&app.index)? else {
        return Ok(());
    };
    let Some(name) = prompts::choose_image(&app.index, &event)? else {
        return Ok(());
    };
    let Some(what) = prompts::select("What would you like to change?", &["Name", "Location"])?
    else {
        return Ok(());
    };

    match what {
        0 => {
            let Some(new_name) = prompts::input("New image name")? else {
                return Ok(());
            };
            if new_name.contains(['/', '\\']) {
                println!("Image names cannot contain path separators.");
                return Ok(());
            }
            if app.index.contains(&new_name) {
                println!("An image named \"{new_name}\" already exists in the index.");
                return Ok(());
            }

            let dir = app.event_dir(&event);
            fs::rename(dir.join(&name), dir.join(&new_name))
                .with_context(|| format!("failed to rename {name}"))?;
            app.index.rename_image(&name, &new_name)?;
            app.index.persist()?;
            println!("The name has been changed.");
        }
        _ => {
            let Some(query) =
                prompts::input("New location (a country, city, village or address)")?
            else {
                return Ok(());
            };
            let Some(tag) = app.resolve_place(&query)? else {
                return Ok(());
            };
            app.index.set_image_location(&name, tag)?;
            app.index.persist()?;
            println!("The location has been changed.");
        }
    }
    Ok(())
}

fn delete_event(app: &mut App) -> Result<()> {
    let Some(event) = prompts::choose_event(&app.index)? else {
        return Ok(());
    };
    if event == ROOT_EVENT {
        println!("The images root cannot be deleted.");
        return Ok(());
    }

    let count = app.index.query_by_event(&event).len();
    if !prompts::confirm(
        &format!("Delete \"{event}\" and its {count} images?"),
        false,
    )? {
        println!("You decided not to delete the event.");
        return Ok(());
    }

    let dir = app.event_dir(&event);
    fs::remove_dir_all(&dir).with_context(|| format!("failed to remove {}", dir.display()))?;
    let removed = app.index.delete_event(&event);
    app.index.persist()?;
    match removed {
        0 => println!("The event folder was removed; the index had nothing for it."),
        n => println!("Deleted {n} images."),
    }
    Ok(())
}

fn delete_image(app: &mut App) -> Result<()> {
    let Some(event) = prompts::choose_event(&app.index)? else {
        return Ok(());
    };
    let Some(name) = prompts::choose_image(&app.index, &event)? else {
        return Ok(());
    };
    if !prompts::confirm(&format!("Delete \"{name}\"?"), false)? {
        println!("You decided not to delete the image.");
        return Ok(());
    }

    let path = app.event_dir(&event).join(&name);
    fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    app.index.delete_image(&name)?;
    app.index.persist()?;
    println!("The image has been deleted.");
    Ok(())
}
