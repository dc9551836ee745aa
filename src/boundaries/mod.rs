//! Commune boundary acquisition: download-if-absent plus GeoJSON loading.

mod download;
mod loader;

pub use download::{ensure_boundary_file, DEFAULT_CONTOURS_URL};
pub use loader::load_communes;
