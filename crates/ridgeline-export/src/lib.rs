//! # ridgeline-export
//!
//! GeoJSON `FeatureCollection` output for elevation points, terrain features
//! and contour lines. Coordinates are always written `[lon, lat]`.
//!
//! ```no_run
//! use ridgeline_dem::ElevationPoint;
//! use ridgeline_export::{points_to_feature_collection, to_json_string};
//!
//! let points = vec![ElevationPoint::new(-25.19, -50.97, 940.0)];
//! let collection = points_to_feature_collection(&points, "elevation");
//! println!("{}", to_json_string(&collection)?);
//! # Ok::<(), ridgeline_export::ExportError>(())
//! ```

mod error;
mod records;

pub use error::ExportError;
pub use records::{grid_records, GridRecord, PointRecord};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoValue};
use ridgeline_terrain::Contour;
use std::path::Path;
use tracing::debug;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Property holding the elevation when no other primary property is chosen.
pub const DEFAULT_PRIMARY_PROPERTY: &str = "elevation";

/// One Point feature per record.
///
/// The `primary` property takes the record's field of that name, or its
/// `elevation` when it has none. Every other field is copied as-is.
pub fn points_to_feature_collection<R: PointRecord>(records: &[R], primary: &str) -> FeatureCollection {
    let features = records.iter().map(|r| point_feature(r, primary)).collect();
    collection(features)
}

fn point_feature<R: PointRecord>(record: &R, primary: &str) -> Feature {
    let (lon, lat) = record.lon_lat();
    let fields = record.fields();

    let lookup = |name: &str| fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());
    let headline = lookup(primary)
        .or_else(|| lookup(DEFAULT_PRIMARY_PROPERTY))
        .unwrap_or(JsonValue::Null);

    let mut properties = JsonObject::new();
    properties.insert(primary.to_string(), headline);
    for (name, value) in fields {
        if name != primary && name != "lat" && name != "lon" {
            properties.insert(name, value);
        }
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoValue::Point(vec![lon, lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// One LineString feature per contour, with only an `elevation` property.
pub fn contours_to_feature_collection(contours: &[Contour]) -> FeatureCollection {
    let features = contours
        .iter()
        .map(|c| {
            let line = c.coordinates.iter().map(|&(lon, lat)| vec![lon, lat]).collect();
            let mut properties = JsonObject::new();
            properties.insert("elevation".to_string(), number(c.level));
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(GeoValue::LineString(line))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    collection(features)
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// A JSON number, or `null` for NaN and infinities.
pub(crate) fn number(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Serialize to compact JSON.
pub fn to_json_string(collection: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string(collection)?)
}

/// Write a collection as pretty-printed JSON.
pub fn write_feature_collection<P: AsRef<Path>>(path: P, collection: &FeatureCollection) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, json).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), features = collection.features.len(), "Wrote GeoJSON");
    Ok(())
}
