use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use darkroom_metadata::{ExtractError, IMAGE_EXTENSIONS, extract};

use crate::app::{App, ROOT_EVENT};
use crate::{install, prompts};

/// Counters for one upload run, reported back to the user.
#[derive(Default)]
pub struct UploadReport {
    pub copied: Vec<String>,
    pub skipped_unreadable: usize,
    pub skipped_duplicate: usize,
    pub errors: Vec<String>,
}

pub fn run(app: &mut App) -> Result<()> {
    let Some(source_text) =
        prompts::input("Folder with the images to upload (absolute, or relative to home)")?
    else {
        return Ok(());
    };
    let source = install::expand_home(PathBuf::from(source_text))?;
    if !source.is_dir() {
        println!("Sorry, {} could not be found.", source.display());
        return Ok(());
    }

    let Some((event, dest)) = choose_destination(app)? else {
        return Ok(());
    };

    let Some(mode) = prompts::select(
        "Upload mode",
        &["A single image", "All images with an extension"],
    )?
    else {
        return Ok(());
    };

    let mut report = UploadReport::default();
    match mode {
        0 => {
            let Some(name) = prompts::input("Name of the file to upload")? else {
                return Ok(());
            };
            let path = source.join(&name);
            if !path.is_file() {
                println!("Sorry, the image could not be found. Upload aborted.");
                return Ok(());
            }
            ingest_file(app, &path, &dest, &event, &mut report)?;
        }
        _ => {
            let Some(filter) = choose_extension()? else {
                return Ok(());
            };
            let entries = fs::read_dir(&source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        report.errors.push(format!("readdir error: {err}"));
                        continue;
                    }
                };
                let path = entry.path();
                if !path.is_file() || !extension_matches(&path, filter.as_deref()) {
                    continue;
                }
                ingest_file(app, &path, &dest, &event, &mut report)?;
            }
        }
    }

    app.index.persist()?;
    print_report(&report);

    if !report.copied.is_empty()
        && prompts::confirm("Add a location to the uploaded images?", false)?
    {
        geotag_uploads(app, &report.copied)?;
    }

    Ok(())
}

/// Attach locations to freshly uploaded images: one lookup for the whole
/// batch, or one prompt per image.
fn geotag_uploads(app: &mut App, copied: &[String]) -> Result<()> {
    let shared = copied.len() == 1
        || prompts::confirm("Use one location for all uploaded images?", true)?;

    if shared {
        let Some(query) = prompts::input("Location (country, city, village or address)")? else {
            return Ok(());
        };
        if let Some(tag) = app.resolve_place(&query)? {
            for name in copied {
                app.index.set_image_location(name, tag.clone())?;
            }
            app.index.persist()?;
            println!(
                "Location \"{}\" attached to {} images.",
                tag.place,
                copied.len()
            );
        }
        return Ok(());
    }

    for name in copied {
        let Some(query) = prompts::input(&format!("Location for {name} (empty to skip)"))? else {
            continue;
        };
        if let Some(tag) = app.resolve_place(&query)? {
            app.index.set_image_location(name, tag)?;
        }
    }
    app.index.persist()?;
    Ok(())
}

/// Ask for an event folder; unnamed uploads land directly in the images
/// root. Creates the event directory before anything is copied.
fn choose_destination(app: &App) -> Result<Option<(String, PathBuf)>> {
    if !prompts::confirm("Put the images into a named event folder?", true)? {
        return Ok(Some((ROOT_EVENT.to_string(), app.images_dir.clone())));
    }
    let Some(name) = prompts::input("Event name")? else {
        return Ok(None);
    };
    if name.contains(['/', '\\']) {
        println!("Event names cannot contain path separators.");
        return Ok(None);
    }
    let dest = app.images_dir.join(&name);
    fs::create_dir_all(&dest).with_context(|| format!("failed to create {}", dest.display()))?;
    Ok(Some((name, dest)))
}

/// Extension filter for batch uploads: `None` inside the option means
/// "all files".
fn choose_extension() -> Result<Option<Option<String>>> {
    let mut items: Vec<&str> = vec!["all"];
    items.extend_from_slice(IMAGE_EXTENSIONS);
    items.push("other…");

    let Some(choice) = prompts::select("Which files should be uploaded?", &items)? else {
        return Ok(None);
    };
    if choice == 0 {
        return Ok(Some(None));
    }
    if choice == items.len() - 1 {
        let Some(ext) = prompts::input("File extension to upload")? else {
            return Ok(None);
        };
        return Ok(Some(Some(ext.trim_start_matches('.').to_string())));
    }
    Ok(Some(Some(items[choice].to_string())))
}

fn extension_matches(path: &Path, filter: Option<&str>) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    match filter {
        None => true,
        Some(wanted) => ext.eq_ignore_ascii_case(wanted),
    }
}

/// Copy one file into the event folder and index it. Unreadable files
/// are skipped whole: no copy, no record.
fn ingest_file(
    app: &mut App,
    source_path: &Path,
    dest_dir: &Path,
    event: &str,
    report: &mut UploadReport,
) -> Result<()> {
    let filename = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if app.index.contains(&filename) {
        println!("Skipping {filename}: already in the index.");
        report.skipped_duplicate += 1;
        return Ok(());
    }

    let record = match extract(source_path, event) {
        Ok(record) => record,
        Err(ExtractError::UnreadableImage(name)) => {
            debug!(%name, "skipping non-image file");
            report.skipped_unreadable += 1;
            return Ok(());
        }
        Err(ExtractError::Io(err)) => {
            warn!(%err, path = %source_path.display(), "failed to read file");
            report.errors.push(format!("{}: {err}", source_path.display()));
            return Ok(());
        }
    };

    fs::copy(source_path, dest_dir.join(&filename))
        .with_context(|| format!("failed to copy {}", source_path.display()))?;
    app.index.insert(record)?;
    report.copied.push(filename);
    Ok(())
}

fn print_report(report: &UploadReport) {
    println!("{} images copied.", report.copied.len());
    if report.skipped_unreadable > 0 {
        println!("{} non-image files skipped.", report.skipped_unreadable);
    }
    if report.skipped_duplicate > 0 {
        println!(
            "{} files skipped (already in the index).",
            report.skipped_duplicate
        );
    }
    for error in &report.errors {
        println!("failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("darkroom");
        install::init(Some(root.clone()), false).unwrap();
        let app = App::open(&root).unwrap();
        (dir, app)
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::new(8, 6).save(&path).unwrap();
        path
    }

    #[test]
    fn ingest_copies_and_indexes() {
        let (dir, mut app) = test_app();
        let source = write_png(dir.path(), "holiday.png");
        let dest = app.images_dir.join("Paris");
        fs::create_dir_all(&dest).unwrap();

        let mut report = UploadReport::default();
        ingest_file(&mut app, &source, &dest, "Paris", &mut report).unwrap();

        assert_eq!(report.copied, ["holiday.png"]);
        assert!(dest.join("holiday.png").is_file());
        let record = app.index.lookup("holiday.png").unwrap();
        assert_eq!(record.event, "Paris");
        assert_eq!(record.width, 8);
    }

    #[test]
    fn ingest_skips_non_image_without_copying() {
        let (dir, mut app) = test_app();
        let source = dir.path().join("notes.txt");
        fs::write(&source, "plain text").unwrap();
        let dest = app.images_dir.join("Paris");
        fs::create_dir_all(&dest).unwrap();

        let mut report = UploadReport::default();
        ingest_file(&mut app, &source, &dest, "Paris", &mut report).unwrap();

        assert_eq!(report.skipped_unreadable, 1);
        assert!(report.copied.is_empty());
        assert!(!dest.join("notes.txt").exists());
        assert!(app.index.is_empty());
    }

    #[test]
    fn ingest_skips_duplicate_filenames() {
        let (dir, mut app) = test_app();
        let source = write_png(dir.path(), "dup.png");
        let dest = app.images_dir.join("Paris");
        fs::create_dir_all(&dest).unwrap();

        let mut report = UploadReport::default();
        ingest_file(&mut app, &source, &dest, "Paris", &mut report).unwrap();
        ingest_file(&mut app, &source, &dest, "Paris", &mut report).unwrap();

        assert_eq!(report.copied.len(), 1);
        assert_eq!(report.skipped_duplicate, 1);
        assert_eq!(app.index.len(), 1);
    }

    #[test]
    fn extension_filter_matching() {
        assert!(extension_matches(Path::new("a.JPG"), Some("jpg")));
        assert!(extension_matches(Path::new("a.png"), None));
        assert!(!extension_matches(Path::new("a.txt"), Some("jpg")));
        assert!(!extension_matches(Path::new("no_extension"), None));
    }
}
