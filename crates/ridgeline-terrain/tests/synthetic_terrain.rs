//! End-to-end checks on generated terrain.

use ridgeline_dem::{GridArea, SyntheticTerrain};
use ridgeline_terrain::{
    attach_metrics, default_contour_levels, detect_peaks_and_valleys, trace_contours, ElevationStatistics,
    SlopeClass,
};

fn area(grid_size: usize) -> GridArea {
    GridArea {
        grid_size,
        ..GridArea::default()
    }
}

#[test]
fn test_metrics_on_default_terrain() {
    let mut grid = SyntheticTerrain::default().generate_seeded(&area(40), 2024).unwrap();
    let metrics = attach_metrics(&mut grid).unwrap();

    assert_eq!(grid.attribute("slope").unwrap().len(), 1600);
    assert!(metrics.slope.iter().all(|s| (0.0..90.0).contains(s)));
    assert!(metrics.aspect.iter().all(|a| (0.0..360.0).contains(a)));
    assert!(metrics.ruggedness.unwrap() > 0.0);

    // Unit spacing on meter-scale differences makes most cells steep.
    let steep = metrics
        .slope
        .iter()
        .filter(|s| SlopeClass::from_degrees(**s) == SlopeClass::Escarpment)
        .count();
    assert!(steep > 0);
}

#[test]
fn test_features_and_contours_on_default_terrain() {
    let grid = SyntheticTerrain::default().generate_seeded(&area(50), 99).unwrap();

    let found = detect_peaks_and_valleys(&grid, 0.0).unwrap();
    for p in &found.peaks {
        assert!(!found.valleys.iter().any(|v| v.lat == p.lat && v.lon == p.lon));
    }
    let strict = detect_peaks_and_valleys(&grid, 50.0).unwrap();
    assert!(strict.peaks.len() <= found.peaks.len());
    assert!(strict.valleys.len() <= found.valleys.len());

    let stats = ElevationStatistics::for_grid(&grid).unwrap();
    let contours = trace_contours(&grid, &default_contour_levels());
    assert!(!contours.is_empty());
    for c in &contours {
        assert!(c.level > stats.min && c.level <= stats.max);
        assert!(c.coordinates.len() >= 2);
        for &(lon, lat) in &c.coordinates {
            assert!((lon - grid.points()[0].lon).abs() <= 0.3 + 1e-9);
            assert!((lat - grid.points()[0].lat).abs() <= 0.3 + 1e-9);
        }
    }
}
