//! Commune boundary loading from the contours GeoJSON.

use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use geojson::{FeatureCollection, GeoJson};
use tracing::{info, warn};

use crate::columns::{self, CODE_ALIASES, NAME_ALIASES};
use crate::models::{Commune, CommuneSet};

/// Load commune boundaries from a GeoJSON FeatureCollection.
///
/// The INSEE code property is resolved through the ordered alias table and is
/// mandatory; the name property is optional and missing names come out empty.
/// Features without a code or an areal geometry are skipped and counted.
pub fn load_communes(path: &Path) -> Result<CommuneSet> {
    info!("Loading commune contours from {}", path.display());

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let geojson: GeoJson = contents
        .parse()
        .with_context(|| format!("Failed to parse {} as GeoJSON", path.display()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => {
            anyhow::bail!("Contours file must be a FeatureCollection, found a single Feature")
        }
        GeoJson::Geometry(_) => {
            anyhow::bail!("Contours file must be a FeatureCollection, found a bare Geometry")
        }
    };

    let (code_key, name_key) = resolve_property_keys(&collection)?;
    info!(
        "Using properties: code={}, name={}",
        code_key,
        name_key.as_deref().unwrap_or("<none>")
    );

    let mut communes = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for feature in collection.features {
        let props = match feature.properties.as_ref() {
            Some(p) => p,
            None => {
                skipped += 1;
                continue;
            }
        };

        let code = match props.get(&code_key).and_then(property_string) {
            Some(c) => c,
            None => {
                skipped += 1;
                continue;
            }
        };
        let name = name_key
            .as_ref()
            .and_then(|k| props.get(k))
            .and_then(property_string)
            .unwrap_or_default();

        let geometry = match feature.geometry.and_then(to_multi_polygon) {
            Some(g) => g,
            None => {
                skipped += 1;
                continue;
            }
        };

        communes.push(Commune {
            code,
            name,
            geometry,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} features without a code or areal geometry", skipped);
    }
    info!("{} communes loaded", communes.len());

    Ok(CommuneSet::new(communes))
}

/// Resolve the code/name property keys once, from the first feature that
/// carries properties. A missing code property is fatal and reports what was
/// actually there.
fn resolve_property_keys(collection: &FeatureCollection) -> Result<(String, Option<String>)> {
    let props = collection
        .features
        .iter()
        .find_map(|f| f.properties.as_ref())
        .context("Contours file has no feature properties")?;

    let keys: Vec<&str> = props.keys().map(|k| k.as_str()).collect();
    let code_idx = columns::resolve_required("INSEE code", CODE_ALIASES, &keys)?;
    let name_key = columns::resolve(NAME_ALIASES, &keys).map(|i| keys[i].to_string());
    Ok((keys[code_idx].to_string(), name_key))
}

/// Codes are usually strings but some exports type them as numbers.
fn property_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_multi_polygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geom: geo::Geometry<f64> = geometry.value.try_into().ok()?;
    match geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_contours(json: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contours.geojson");
        std::fs::write(&path, json).unwrap();
        (dir, path)
    }

    const SQUARE: &str = "[[[2.0, 48.0], [3.0, 48.0], [3.0, 49.0], [2.0, 49.0], [2.0, 48.0]]]";

    #[test]
    fn loads_feature_collection() {
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature",
                  "properties": {{"code": "75056", "nom": "Paris"}},
                  "geometry": {{"type": "Polygon", "coordinates": {SQUARE}}}}}
            ]}}"#
        );
        let (_dir, path) = write_contours(&json);

        let set = load_communes(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.communes[0].code, "75056");
        assert_eq!(set.communes[0].name, "Paris");
        assert_eq!(set.crs, crate::models::WGS84);
        // Polygon is lifted to a single-member MultiPolygon.
        assert_eq!(set.communes[0].geometry.0.len(), 1);
    }

    #[test]
    fn resolves_alias_properties() {
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature",
                  "properties": {{"CODGEO": 13055, "libelle": "Marseille"}},
                  "geometry": {{"type": "Polygon", "coordinates": {SQUARE}}}}}
            ]}}"#
        );
        let (_dir, path) = write_contours(&json);

        let set = load_communes(&path).unwrap();
        assert_eq!(set.communes[0].code, "13055");
        assert_eq!(set.communes[0].name, "Marseille");
    }

    #[test]
    fn missing_code_property_is_fatal_and_lists_properties() {
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature",
                  "properties": {{"identifiant": "75056", "nom": "Paris"}},
                  "geometry": {{"type": "Polygon", "coordinates": {SQUARE}}}}}
            ]}}"#
        );
        let (_dir, path) = write_contours(&json);

        let err = load_communes(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("INSEE code"));
        assert!(message.contains("identifiant"));
    }

    #[test]
    fn non_areal_features_are_skipped() {
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature",
                  "properties": {{"code": "75056", "nom": "Paris"}},
                  "geometry": {{"type": "Point", "coordinates": [2.35, 48.85]}}}},
                {{"type": "Feature",
                  "properties": {{"code": "69123", "nom": "Lyon"}},
                  "geometry": {{"type": "Polygon", "coordinates": {SQUARE}}}}}
            ]}}"#
        );
        let (_dir, path) = write_contours(&json);

        let set = load_communes(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.communes[0].code, "69123");
    }

    #[test]
    fn rejects_non_collection_roots() {
        let (_dir, path) =
            write_contours(r#"{"type": "Point", "coordinates": [2.35, 48.85]}"#);
        assert!(load_communes(&path).is_err());
    }
}
