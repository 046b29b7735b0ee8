pub mod error;
pub mod index;
pub mod models;

pub use error::IndexError;
pub use index::Index;
pub use models::{GeoTag, ImageRecord};
