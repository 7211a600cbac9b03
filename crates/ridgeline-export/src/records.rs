//! Records that can be exported as Point features.

use crate::number;
use geojson::JsonValue;
use ridgeline_dem::{ElevationGrid, ElevationPoint, ElevationSample};
use ridgeline_terrain::{ProfilePoint, TerrainFeature};

/// A located record with named scalar fields.
pub trait PointRecord {
    /// `(lon, lat)` of the record.
    fn lon_lat(&self) -> (f64, f64);

    /// Scalar fields other than the coordinates, in column order.
    fn fields(&self) -> Vec<(String, JsonValue)>;
}

impl PointRecord for ElevationPoint {
    fn lon_lat(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    fn fields(&self) -> Vec<(String, JsonValue)> {
        vec![("elevation".to_string(), number(self.elevation))]
    }
}

impl PointRecord for ElevationSample {
    fn lon_lat(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    fn fields(&self) -> Vec<(String, JsonValue)> {
        let elevation = self.elevation.map(number).unwrap_or(JsonValue::Null);
        vec![("elevation".to_string(), elevation)]
    }
}

impl PointRecord for TerrainFeature {
    fn lon_lat(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    fn fields(&self) -> Vec<(String, JsonValue)> {
        vec![
            ("elevation".to_string(), number(self.elevation)),
            ("kind".to_string(), JsonValue::String(self.kind.as_str().to_string())),
        ]
    }
}

impl PointRecord for ProfilePoint {
    fn lon_lat(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    fn fields(&self) -> Vec<(String, JsonValue)> {
        vec![
            ("elevation".to_string(), number(self.elevation)),
            ("distance_km".to_string(), number(self.distance_km)),
        ]
    }
}

/// A grid cell with its derived attributes (slope, aspect, ...).
#[derive(Debug, Clone)]
pub struct GridRecord<'a> {
    pub point: ElevationPoint,
    pub attributes: Vec<(&'a str, f64)>,
}

impl PointRecord for GridRecord<'_> {
    fn lon_lat(&self) -> (f64, f64) {
        (self.point.lon, self.point.lat)
    }

    fn fields(&self) -> Vec<(String, JsonValue)> {
        let mut fields = vec![("elevation".to_string(), number(self.point.elevation))];
        fields.extend(
            self.attributes
                .iter()
                .map(|(name, value)| (name.to_string(), number(*value))),
        );
        fields
    }
}

/// One record per grid cell, row-major, carrying every attached attribute.
pub fn grid_records(grid: &ElevationGrid) -> Vec<GridRecord<'_>> {
    let attributes: Vec<(&str, &[f64])> = grid.attributes().collect();
    grid.points()
        .iter()
        .enumerate()
        .map(|(i, &point)| GridRecord {
            point,
            attributes: attributes.iter().map(|(name, values)| (*name, values[i])).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points_to_feature_collection;
    use ridgeline_terrain::{attach_metrics, FeatureKind};
    use serde_json::json;

    #[test]
    fn test_grid_records_carry_metrics() {
        let points = (0..9)
            .map(|k| ElevationPoint::new((k / 3) as f64, (k % 3) as f64, (k % 3) as f64))
            .collect();
        let mut grid = ElevationGrid::from_points(points, 3).unwrap();
        attach_metrics(&mut grid).unwrap();

        let records = grid_records(&grid);
        assert_eq!(records.len(), 9);
        let names: Vec<&str> = records[0].attributes.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["slope", "aspect", "curvature"]);

        let collection = points_to_feature_collection(&records, "slope");
        let props = serde_json::to_value(&collection.features[4].properties).unwrap();
        assert!((props["slope"].as_f64().unwrap() - 45.0).abs() < 1e-9);
        assert_eq!(props["aspect"], json!(90.0));
        assert_eq!(props["elevation"], json!(1.0));
    }

    #[test]
    fn test_feature_record_fields() {
        let feature = TerrainFeature {
            lat: -25.0,
            lon: -51.0,
            elevation: 1200.0,
            kind: FeatureKind::Peak,
        };
        assert_eq!(feature.lon_lat(), (-51.0, -25.0));
        let fields = feature.fields();
        assert_eq!(fields[1], ("kind".to_string(), json!("peak")));
    }
}
