//! Two-phase assignment of stops to communes.

use std::ops::RangeInclusive;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::info;

use super::CommuneIndex;
use crate::models::{Commune, StopPoints};

/// Plausible latitude band for mainland France.
pub const MAINLAND_LAT: RangeInclusive<f64> = 41.0..=52.0;
/// Plausible longitude band for mainland France.
pub const MAINLAND_LON: RangeInclusive<f64> = -6.0..=10.0;

/// Flat degree-to-kilometre conversion. Adequate only within the mainland
/// latitude band above; not a general-purpose projection.
pub const KM_PER_DEGREE: f64 = 111.0;

/// The matcher refuses to compare collections in different reference systems.
#[derive(Debug, Error)]
#[error("coordinate system mismatch: stops are {stops}, boundaries are {boundaries}")]
pub struct CrsMismatch {
    pub stops: String,
    pub boundaries: String,
}

/// A stop's resolved commune.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub commune: Arc<Commune>,
    /// Boundary distance in degrees, set only for nearest-fallback matches.
    pub distance_deg: Option<f64>,
}

/// Counters reported after matching.
#[derive(Debug, Clone, Default)]
pub struct MatchStats {
    pub total: usize,
    pub matched_direct: usize,
    pub unmatched: usize,
    pub invalid: usize,
    pub fallback_assigned: usize,
    pub fallback_mean_deg: Option<f64>,
    pub fallback_max_deg: Option<f64>,
}

impl MatchStats {
    pub fn fallback_mean_km(&self) -> Option<f64> {
        self.fallback_mean_deg.map(|d| d * KM_PER_DEGREE)
    }

    pub fn fallback_max_km(&self) -> Option<f64> {
        self.fallback_max_deg.map(|d| d * KM_PER_DEGREE)
    }
}

/// Assign each point to its containing commune, then rescue unmatched points
/// within the mainland band via the nearest boundary.
///
/// Boundary files and stop coordinates are never perfectly aligned (coastal
/// stops, rounding, stale contours); the fallback recovers those points at
/// the cost of the reported distance error. The result is index-aligned with
/// the input points; `None` entries were excluded as invalid or found no
/// commune at all.
pub fn assign(
    points: &StopPoints,
    index: &CommuneIndex,
) -> Result<(Vec<Option<Assignment>>, MatchStats), CrsMismatch> {
    if points.crs != index.crs() {
        return Err(CrsMismatch {
            stops: points.crs.clone(),
            boundaries: index.crs().to_string(),
        });
    }

    info!(
        "Matching {} stops against {} communes...",
        points.len(),
        index.len()
    );

    // Phase 1: strict containment.
    let pb = ProgressBar::new(points.len() as u64);
    pb.set_style(progress_style());

    let mut assignments: Vec<Option<Assignment>> = Vec::with_capacity(points.len());
    for sp in &points.points {
        pb.inc(1);
        let hit = index.locate(sp.point.x(), sp.point.y());
        assignments.push(hit.map(|commune| Assignment {
            commune,
            distance_deg: None,
        }));
    }
    pb.finish_and_clear();

    let total = points.len();
    let matched_direct = assignments.iter().filter(|a| a.is_some()).count();
    let mut stats = MatchStats {
        total,
        matched_direct,
        unmatched: total - matched_direct,
        ..MatchStats::default()
    };

    info!("Stops matched directly: {}", stats.matched_direct);
    info!("Stops unmatched: {}", stats.unmatched);

    if stats.unmatched == 0 {
        return Ok((assignments, stats));
    }

    // Phase 2: nearest fallback, only for unmatched slots.
    info!("Looking up nearest communes for unmatched stops...");

    let mut distances = Vec::new();
    for (slot, sp) in assignments.iter_mut().zip(&points.points) {
        if slot.is_some() {
            continue;
        }
        let (lon, lat) = (sp.point.x(), sp.point.y());
        if !plausible(lon, lat) {
            stats.invalid += 1;
            continue;
        }
        if let Some((commune, distance)) = index.nearest(lon, lat) {
            distances.push(distance);
            *slot = Some(Assignment {
                commune,
                distance_deg: Some(distance),
            });
            stats.fallback_assigned += 1;
        }
    }

    info!(
        "Stops with invalid or out-of-region coordinates ignored: {}",
        stats.invalid
    );
    info!(
        "Stops assigned to their nearest commune: {}",
        stats.fallback_assigned
    );

    if !distances.is_empty() {
        let mean = distances.iter().sum::<f64>() / distances.len() as f64;
        let max = distances.iter().copied().fold(0.0f64, f64::max);
        stats.fallback_mean_deg = Some(mean);
        stats.fallback_max_deg = Some(max);
        info!(
            "Mean distance to commune: {:.4}° (~{:.1} km)",
            mean,
            mean * KM_PER_DEGREE
        );
        info!("Max distance: {:.4}° (~{:.1} km)", max, max * KM_PER_DEGREE);
    }

    Ok((assignments, stats))
}

/// Coordinates that are exactly zero on either axis, or outside the mainland
/// band, are permanently excluded from fallback matching.
fn plausible(lon: f64, lat: f64) -> bool {
    lon != 0.0 && lat != 0.0 && MAINLAND_LAT.contains(&lat) && MAINLAND_LON.contains(&lon)
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}
