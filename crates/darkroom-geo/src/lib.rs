pub mod client;

pub use client::{GeoClient, GeoError};
