//! Commune boundary records loaded from the contours dataset.

use geo::{BoundingRect, MultiPolygon};

/// Coordinate reference system tag shared by every collection in the
/// pipeline. The contours file is RFC 7946 GeoJSON, which is always WGS84.
pub const WGS84: &str = "EPSG:4326";

/// A single commune boundary with its INSEE attributes.
#[derive(Debug, Clone)]
pub struct Commune {
    /// INSEE commune code, e.g. "75056".
    pub code: String,
    /// Display name, e.g. "Paris". Empty when the source has no name column.
    pub name: String,
    /// Boundary geometry in WGS84 lon/lat.
    pub geometry: MultiPolygon<f64>,
}

impl Commune {
    /// Get the bounding box of this boundary
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// All commune boundaries for one run, tagged with their CRS.
#[derive(Debug, Clone)]
pub struct CommuneSet {
    pub communes: Vec<Commune>,
    pub crs: String,
}

impl CommuneSet {
    pub fn new(communes: Vec<Commune>) -> Self {
        Self {
            communes,
            crs: WGS84.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.communes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communes.is_empty()
    }
}
