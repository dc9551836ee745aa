//! Spatial join: commune R-tree index and two-phase stop assignment.
//!
//! Phase 1 assigns each stop to the commune that strictly contains it; phase
//! 2 rescues unmatched stops inside the mainland band via nearest-boundary
//! lookup, carrying the distance for reporting.

mod assign;
mod index;

pub use assign::{
    assign, Assignment, CrsMismatch, MatchStats, KM_PER_DEGREE, MAINLAND_LAT, MAINLAND_LON,
};
pub use index::CommuneIndex;
