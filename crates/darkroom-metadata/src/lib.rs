pub mod capture;
pub mod extract;

pub use extract::{ExtractError, IMAGE_EXTENSIONS, extract, is_image_extension};
