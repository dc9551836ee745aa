//! Transit stop records and their derived point geometry.

use csv::StringRecord;
use geo::Point;

/// One stop row from the source export. The coordinate fields are parsed,
/// everything else rides along untouched.
#[derive(Debug, Clone)]
pub struct StopRecord {
    pub lat: f64,
    pub lon: f64,
    /// The full source row, kept for traceability.
    pub record: StringRecord,
}

/// Stop rows after the missing-coordinate filter.
#[derive(Debug, Clone)]
pub struct StopTable {
    pub headers: StringRecord,
    pub rows: Vec<StopRecord>,
    /// Row count before filtering.
    pub total_rows: usize,
}

/// A stop with its derived point geometry.
#[derive(Debug, Clone)]
pub struct StopPoint {
    pub point: Point<f64>,
    pub stop: StopRecord,
}

/// The point collection fed to the spatial matcher, tagged with its CRS.
#[derive(Debug, Clone)]
pub struct StopPoints {
    pub points: Vec<StopPoint>,
    pub crs: String,
}

impl StopPoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
