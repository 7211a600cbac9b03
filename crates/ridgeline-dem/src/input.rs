//! File-based elevation input, dispatched on file extension.

use crate::grid::ElevationPoint;
use crate::raster::{read_raster, BoundingBox};
use crate::{DemError, Result};
use geojson::{FeatureCollection, GeoJson};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Input formats recognised by [`load_points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.tif` / `.tiff`
    GeoTiff,
    /// `.geojson` / `.json`
    GeoJson,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("tif") | Some("tiff") => Ok(InputFormat::GeoTiff),
            Some("geojson") | Some("json") => Ok(InputFormat::GeoJson),
            _ => Err(DemError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Parse Point features with a numeric `elevation` property.
///
/// Features with other geometries or without a numeric elevation are skipped.
pub fn parse_geojson_points(text: &str) -> Result<Vec<ElevationPoint>> {
    let geojson: GeoJson = text.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let mut points = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;
    for feature in &collection.features {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(position)) if position.len() >= 2 => position,
            _ => {
                skipped += 1;
                continue;
            }
        };
        match feature.property("elevation").and_then(|v| v.as_f64()) {
            Some(elevation) => points.push(ElevationPoint::new(position[1], position[0], elevation)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped GeoJSON features without point elevation");
    }
    Ok(points)
}

/// Read elevation points from a GeoJSON file, optionally restricted to `bbox`.
pub fn read_geojson_points<P: AsRef<Path>>(path: P, bbox: Option<&BoundingBox>) -> Result<Vec<ElevationPoint>> {
    let text = std::fs::read_to_string(path)?;
    let mut points = parse_geojson_points(&text)?;
    if let Some(bbox) = bbox {
        points.retain(|p| bbox.contains(p.lat, p.lon));
    }
    Ok(points)
}

/// Read elevation points from any supported file.
pub fn load_points<P: AsRef<Path>>(path: P, bbox: Option<&BoundingBox>) -> Result<Vec<ElevationPoint>> {
    let path = path.as_ref();
    match InputFormat::from_path(path)? {
        InputFormat::GeoTiff => read_raster(path, bbox),
        InputFormat::GeoJson => read_geojson_points(path, bbox),
    }
}

/// Read several files, one result per file in input order.
///
/// A failing file is logged and reported in its slot; the others are still read.
pub fn load_many<P: AsRef<Path>>(
    paths: &[P],
    bbox: Option<&BoundingBox>,
) -> Vec<(PathBuf, Result<Vec<ElevationPoint>>)> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref().to_path_buf();
            let result = load_points(&path, bbox);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "Failed to load elevation file");
            }
            (path, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-50.9, -25.1]},
             "properties": {"elevation": 950.5, "slope": 3.0}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-50.8, -25.2]},
             "properties": {"elevation": null}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
             "properties": {"elevation": 600}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-51.5, -25.3]},
             "properties": {"elevation": 700}}
        ]
    }"#;

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::from_path(Path::new("a/b.TIF")).unwrap(), InputFormat::GeoTiff);
        assert_eq!(InputFormat::from_path(Path::new("x.geojson")).unwrap(), InputFormat::GeoJson);
        match InputFormat::from_path(Path::new("data/area.shp")).unwrap_err() {
            DemError::UnsupportedFormat { path } => assert_eq!(path, PathBuf::from("data/area.shp")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(InputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_parse_geojson_points() {
        let points = parse_geojson_points(SAMPLE).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], ElevationPoint::new(-25.1, -50.9, 950.5));
        assert_eq!(points[1].elevation, 700.0);
    }

    #[test]
    fn test_read_geojson_with_bbox() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let bbox = BoundingBox::new(-51.0, -26.0, -50.0, -25.0);
        let points = load_points(file.path(), Some(&bbox)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].elevation, 950.5);
    }

    #[test]
    fn test_load_many_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("points.geojson");
        std::fs::write(&good, SAMPLE).unwrap();
        let unsupported = dir.path().join("table.xlsx");
        std::fs::write(&unsupported, b"not really").unwrap();
        let missing = dir.path().join("gone.json");

        let results = load_many(&[&unsupported, &good, &missing], None);
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0].1, Err(DemError::UnsupportedFormat { .. })));
        assert_eq!(results[1].1.as_ref().unwrap().len(), 2);
        assert!(matches!(results[2].1, Err(DemError::Io(_))));
        assert_eq!(results[1].0, good);
    }
}
