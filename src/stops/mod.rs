//! Stop record loading and point construction.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use geo::Point;
use tracing::info;

use crate::columns::{self, LAT_ALIASES, LON_ALIASES};
use crate::models::{StopPoint, StopPoints, StopRecord, StopTable, WGS84};

/// Read stop rows from a delimited export, dropping rows with missing or
/// unparseable coordinates. Range validation happens later, in the matcher.
pub fn load_stops(path: &Path) -> Result<StopTable> {
    info!("Loading stops from {}", path.display());

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?.clone();
    let header_strs: Vec<&str> = headers.iter().collect();
    let lat_idx = columns::resolve_required("latitude", LAT_ALIASES, &header_strs)?;
    let lon_idx = columns::resolve_required("longitude", LON_ALIASES, &header_strs)?;
    info!(
        "Using columns: lat={}, lon={}",
        header_strs[lat_idx], header_strs[lon_idx]
    );

    let mut rows = Vec::new();
    let mut total_rows = 0usize;

    for result in reader.records() {
        let record = result?;
        total_rows += 1;

        let lat = record
            .get(lat_idx)
            .and_then(|v| v.trim().parse::<f64>().ok());
        let lon = record
            .get(lon_idx)
            .and_then(|v| v.trim().parse::<f64>().ok());

        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            // Missing coordinates are dropped, not errors.
            _ => continue,
        };

        rows.push(StopRecord { lat, lon, record });
    }

    info!("{} stops loaded", total_rows);
    info!("{} stops with usable coordinates", rows.len());

    Ok(StopTable {
        headers,
        rows,
        total_rows,
    })
}

/// Convert stop rows to point geometry, one to one and in input order.
pub fn build_points(table: &StopTable) -> StopPoints {
    let points = table
        .rows
        .iter()
        .map(|stop| StopPoint {
            point: Point::new(stop.lon, stop.lat),
            stop: stop.clone(),
        })
        .collect();

    StopPoints {
        points,
        crs: WGS84.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_stops(csv: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stops.csv");
        std::fs::write(&path, csv).unwrap();
        (dir, path)
    }

    #[test]
    fn drops_rows_with_missing_coordinates() {
        let (_dir, path) = write_stops(
            "stop_id,stop_name,stop_lat,stop_lon\n\
             a,Gare,48.85,2.35\n\
             b,Sans lat,,2.35\n\
             c,Sans lon,48.85,\n\
             d,Pas un nombre,quarante-huit,2.35\n\
             e,Mairie,45.76,4.83\n",
        );

        let table = load_stops(&path).unwrap();
        assert_eq!(table.total_rows, 5);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].record.get(0), Some("a"));
        assert_eq!(table.rows[1].record.get(0), Some("e"));
    }

    #[test]
    fn resolves_coordinate_column_aliases() {
        let (_dir, path) = write_stops("name,Latitude,Longitude\nGare,48.85,2.35\n");

        let table = load_stops(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].lat, 48.85);
        assert_eq!(table.rows[0].lon, 2.35);
    }

    #[test]
    fn missing_coordinate_column_is_fatal() {
        let (_dir, path) = write_stops("stop_id,stop_name\na,Gare\n");

        let err = load_stops(&path).unwrap_err();
        assert!(format!("{err:#}").contains("latitude"));
    }

    #[test]
    fn points_are_lon_lat_and_order_preserving() {
        let (_dir, path) = write_stops(
            "stop_id,stop_lat,stop_lon\n\
             a,48.85,2.35\n\
             b,45.76,4.83\n",
        );

        let table = load_stops(&path).unwrap();
        let points = build_points(&table);

        assert_eq!(points.len(), table.rows.len());
        assert_eq!(points.crs, WGS84);
        // x is longitude, y is latitude.
        assert_eq!(points.points[0].point.x(), 2.35);
        assert_eq!(points.points[0].point.y(), 48.85);
        assert_eq!(points.points[1].stop.record.get(0), Some("b"));
    }
}
