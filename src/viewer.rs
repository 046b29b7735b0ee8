use std::cmp::Ordering;

use anyhow::Result;
use comfy_table::Table;
use owo_colors::OwoColorize;

use darkroom_index::ImageRecord;

use crate::app::App;
use crate::{editor, prompts};

const GRID_COLS: usize = 5;
const GRID_ROWS: usize = 3;

/// Position of a browsing session: nothing shown yet, or a cursor into
/// the session's ordered item list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerState {
    Idle,
    Showing(usize),
}

/// One browsing session over an ordered list of items (single images
/// for the slideshow, pages of filenames for the grid). Each session
/// owns its own state; nothing is shared between sessions.
pub struct ViewSession<T> {
    items: Vec<T>,
    state: ViewerState,
}

impl<T> ViewSession<T> {
    pub fn new(items: Vec<T>) -> Self {
        let state = if items.is_empty() {
            ViewerState::Idle
        } else {
            ViewerState::Showing(0)
        };
        Self { items, state }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn current(&self) -> Option<&T> {
        match self.state {
            ViewerState::Idle => None,
            ViewerState::Showing(i) => self.items.get(i),
        }
    }

    /// (position, total), 1-based, for display.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self.state {
            ViewerState::Idle => None,
            ViewerState::Showing(i) => Some((i + 1, self.items.len())),
        }
    }

    /// Advance; saturates at the last item.
    pub fn next(&mut self) {
        if let ViewerState::Showing(i) = self.state {
            if i + 1 < self.items.len() {
                self.state = ViewerState::Showing(i + 1);
            }
        }
    }

    /// Step back; saturates at the first item.
    pub fn previous(&mut self) {
        if let ViewerState::Showing(i) = self.state {
            if i > 0 {
                self.state = ViewerState::Showing(i - 1);
            }
        }
    }

    /// Move to an absolute position. Out-of-range indices leave the
    /// state untouched and report failure.
    pub fn jump(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.state = ViewerState::Showing(index);
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Insertion,
    Date,
    Megapixels,
}

/// Order an event's records for viewing. Records without a capture date
/// always sort after dated ones, regardless of direction.
pub fn sort_images(mut records: Vec<&ImageRecord>, key: SortKey, ascending: bool) -> Vec<String> {
    match key {
        SortKey::Insertion => {}
        SortKey::Date => records.sort_by(|a, b| match (a.date, b.date) {
            (Some(x), Some(y)) => {
                if ascending {
                    x.cmp(&y)
                } else {
                    y.cmp(&x)
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortKey::Megapixels => records.sort_by(|a, b| {
            if ascending {
                a.megapixels.total_cmp(&b.megapixels)
            } else {
                b.megapixels.total_cmp(&a.megapixels)
            }
        }),
    }
    records.into_iter().map(|r| r.filename.clone()).collect()
}

/// Split an ordered image list into grid pages.
pub fn pages(images: &[String], per_page: usize) -> Vec<Vec<String>> {
    images.chunks(per_page).map(<[String]>::to_vec).collect()
}

pub fn run(app: &mut App) -> Result<()> {
    let Some(mode) = prompts::select("View as", &["Slideshow", "Grid"])? else {
        return Ok(());
    };
    let Some(event) = prompts::choose_event(&app.index)? else {
        return Ok(());
    };

    let images = {
        let records = app.index.query_by_event(&event);
        if records.is_empty() {
            println!("The event \"{event}\" has no images.");
            return Ok(());
        }
        match choose_order(records)? {
            Some(images) => images,
            None => return Ok(()),
        }
    };

    match mode {
        0 => slideshow(app, images),
        _ => grid(app, images),
    }
}

fn choose_order(records: Vec<&ImageRecord>) -> Result<Option<Vec<String>>> {
    let Some(choice) = prompts::select(
        "Sort images by",
        &["Upload order", "Capture date", "Megapixels"],
    )?
    else {
        return Ok(None);
    };
    let (key, ascending) = match choice {
        0 => (SortKey::Insertion, true),
        other => {
            let ascending = prompts::confirm("Ascending order?", true)?;
            let key = if other == 1 {
                SortKey::Date
            } else {
                SortKey::Megapixels
            };
            (key, ascending)
        }
    };
    Ok(Some(sort_images(records, key, ascending)))
}

fn slideshow(app: &mut App, images: Vec<String>) -> Result<()> {
    let mut session = ViewSession::new(images);
    loop {
        let Some(current) = session.current().cloned() else {
            return Ok(());
        };
        let (position, total) = session.position().unwrap_or((0, 0));

        println!();
        println!("{}  ({position}/{total})", current.bold());
        print_detail(app.index.lookup(&current)?);

        let Some(action) = prompts::select(
            "Navigate",
            &["Next", "Previous", "Jump to…", "Edit this image"],
        )?
        else {
            return Ok(());
        };
        match action {
            0 => session.next(),
            1 => session.previous(),
            2 => {
                if let Some(text) = prompts::input(&format!("Image number (1-{total})"))? {
                    match text.parse::<usize>() {
                        Ok(n) if n >= 1 => {
                            if !session.jump(n - 1) {
                                println!("No image at that position.");
                            }
                        }
                        _ => println!("No image at that position."),
                    }
                }
            }
            _ => editor::edit_image(app, &current)?,
        }
    }
}

fn grid(app: &mut App, images: Vec<String>) -> Result<()> {
    let mut session = ViewSession::new(pages(&images, GRID_COLS * GRID_ROWS));
    loop {
        let Some(page) = session.current() else {
            return Ok(());
        };
        let (position, total) = session.position().unwrap_or((0, 0));

        println!();
        println!("{}", render_page(page));
        println!("page {position}/{total}");

        let Some(action) =
            prompts::select("Navigate", &["Next page", "Previous page", "Open an image…"])?
        else {
            return Ok(());
        };
        match action {
            0 => session.next(),
            1 => session.previous(),
            _ => {
                if let Some(name) = prompts::input("Image name")? {
                    if images.contains(&name) {
                        editor::edit_image(app, &name)?;
                    } else {
                        println!("\"{name}\" is not part of this view.");
                    }
                }
            }
        }
    }
}

/// Render one grid page as a bordered table, `GRID_COLS` names per row.
pub fn render_page(page: &[String]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    for chunk in page.chunks(GRID_COLS) {
        let mut row: Vec<String> = chunk.to_vec();
        row.resize(GRID_COLS, String::new());
        table.add_row(row);
    }
    table.to_string()
}

fn print_detail(record: &ImageRecord) {
    for (label, value) in detail_lines(record) {
        println!("  {label:>10}  {value}");
    }
}

/// Metadata panel for one record, in label/value pairs.
pub fn detail_lines(record: &ImageRecord) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("Event", record.event.clone()),
        ("Format", record.format.clone()),
        ("Size", format!("{} x {}", record.width, record.height)),
        ("Megapixels", format!("{:.1}", record.megapixels)),
        (
            "Mode",
            format!("{} ({} channels)", record.mode, record.channels),
        ),
        ("Created", record.creation.clone()),
    ];
    if let Some(ref taken) = record.date_time {
        lines.push(("Taken", taken.clone()));
    }
    if record.edited {
        lines.push(("Edited", "yes".to_string()));
    }
    if let Some(ref geo) = record.geo {
        lines.push((
            "Location",
            format!("{} ({:.4}, {:.4})", geo.place, geo.latitude, geo.longitude),
        ));
    }
    lines
}
