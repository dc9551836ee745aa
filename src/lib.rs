//! Platane - batch tools for French public open data.
//!
//! Two binaries share this library: `join` counts transit stops per commune
//! through a spatial join against the official contours, and `harvest` dumps
//! SIRENE établissement records through the cursor-paginated API.

pub mod aggregate;
pub mod boundaries;
pub mod columns;
pub mod models;
pub mod sirene;
pub mod spatial;
pub mod stops;

pub use models::{Commune, CommuneSet, StopPoints, StopTable};
