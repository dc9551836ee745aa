//! Spatial index for fast commune lookups.

use std::sync::Arc;

use geo::{Contains, Distance, Euclidean, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::info;

use crate::models::{Commune, CommuneSet};

/// Wrapper for R-tree indexing of commune boundaries
#[derive(Clone)]
pub struct IndexedCommune {
    commune: Arc<Commune>,
    envelope: AABB<[f64; 2]>,
}

impl IndexedCommune {
    fn new(commune: Commune) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = commune.bbox()?;
        Some(Self {
            commune: Arc::new(commune),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }

    /// Distance from a lon/lat position to this boundary, in degrees.
    /// Zero for positions inside the boundary.
    fn distance_deg(&self, position: &[f64; 2]) -> f64 {
        let point = Point::new(position[0], position[1]);
        Euclidean.distance(&point, &self.commune.geometry)
    }
}

impl RTreeObject for IndexedCommune {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for IndexedCommune {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d = self.distance_deg(point);
        d * d
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.commune
            .geometry
            .contains(&Point::new(point[0], point[1]))
    }
}

/// R-tree index over commune boundaries.
pub struct CommuneIndex {
    tree: RTree<IndexedCommune>,
    crs: String,
}

impl CommuneIndex {
    /// Build the index from a loaded boundary set.
    pub fn build(set: CommuneSet) -> Self {
        info!("Building spatial index for {} communes...", set.len());

        let crs = set.crs;
        let indexed: Vec<IndexedCommune> = set
            .communes
            .into_iter()
            .filter_map(IndexedCommune::new)
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree, crs }
    }

    /// CRS tag inherited from the boundary set.
    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Find the commune whose area strictly contains the point.
    ///
    /// Candidates come from envelope intersection, containment is exact:
    /// points on a shared border are contained by neither side. With
    /// overlapping boundaries the first containing candidate wins.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<Arc<Commune>> {
        let point = Point::new(lon, lat);
        let query_envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .find(|ic| ic.commune.geometry.contains(&point))
            .map(|ic| Arc::clone(&ic.commune))
    }

    /// Find the nearest commune by boundary distance, in degrees.
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<(Arc<Commune>, f64)> {
        let position = [lon, lat];
        self.tree
            .nearest_neighbor(&position)
            .map(|ic| (Arc::clone(&ic.commune), ic.distance_deg(&position)))
    }

    /// Get total number of indexed communes
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(code: &str, name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Commune {
        let polygon = polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ];
        Commune {
            code: code.to_string(),
            name: name.to_string(),
            geometry: MultiPolygon::new(vec![polygon]),
        }
    }

    fn index() -> CommuneIndex {
        CommuneIndex::build(CommuneSet::new(vec![
            square("75056", "Paris", 2.0, 48.5, 3.0, 49.5),
            square("69123", "Lyon", 4.5, 45.5, 5.0, 46.0),
        ]))
    }

    #[test]
    fn locate_finds_containing_commune() {
        let index = index();
        let hit = index.locate(2.3522, 48.8566).unwrap();
        assert_eq!(hit.code, "75056");
    }

    #[test]
    fn locate_misses_outside_all_boundaries() {
        let index = index();
        assert!(index.locate(0.5, 47.0).is_none());
    }

    #[test]
    fn nearest_returns_boundary_distance() {
        let index = index();
        // 0.1 degrees east of the Paris square's eastern edge.
        let (hit, distance) = index.nearest(3.1, 49.0).unwrap();
        assert_eq!(hit.code, "75056");
        assert!((distance - 0.1).abs() < 1e-9);
    }

    #[test]
    fn nearest_on_empty_index_is_none() {
        let index = CommuneIndex::build(CommuneSet::new(vec![]));
        assert!(index.is_empty());
        assert!(index.nearest(2.0, 48.0).is_none());
    }
}
