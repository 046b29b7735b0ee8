//! Shared prompt helpers. Every helper returns `Ok(None)` when the user
//! backs out, which aborts only the current operation; the main menu
//! keeps running.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

use darkroom_index::Index;

const QUIT_WORDS: &[&str] = &["q", "quit"];

/// Menu select with an appended "Back" entry. `None` means back.
pub fn select(prompt: &str, items: &[&str]) -> Result<Option<usize>> {
    let mut entries: Vec<&str> = items.to_vec();
    entries.push("Back");
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&entries)
        .default(0)
        .interact()?;
    Ok((choice < items.len()).then_some(choice))
}

/// Free-text input. Empty input, "q", or "quit" abort (None).
pub fn input(prompt: &str) -> Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() || QUIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
        return Ok(None);
    }
    Ok(Some(trimmed))
}

pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Numeric strength for enhancements; re-prompts until valid.
pub fn input_factor(prompt: &str) -> Result<Option<f32>> {
    loop {
        let Some(text) = input(prompt)? else {
            return Ok(None);
        };
        match text.parse::<f32>() {
            Ok(value) if value >= 0.0 && value.is_finite() => return Ok(Some(value)),
            _ => println!("Enter a non-negative number (1 keeps the original)."),
        }
    }
}

/// Pick one of the events currently present in the index.
pub fn choose_event(index: &Index) -> Result<Option<String>> {
    let events = index.events();
    if events.is_empty() {
        println!("No events yet. Upload some images first.");
        return Ok(None);
    }
    let items: Vec<&str> = events.iter().map(String::as_str).collect();
    Ok(select("Choose an event", &items)?.map(|i| events[i].clone()))
}

/// Pick one of the images of an event.
pub fn choose_image(index: &Index, event: &str) -> Result<Option<String>> {
    let names: Vec<String> = index
        .query_by_event(event)
        .iter()
        .map(|r| r.filename.clone())
        .collect();
    if names.is_empty() {
        println!("The event \"{event}\" has no images.");
        return Ok(None);
    }
    let items: Vec<&str> = names.iter().map(String::as_str).collect();
    Ok(select("Choose an image", &items)?.map(|i| names[i].clone()))
}
