use ridgeline_cli::{AnalysisConfig, SourceConfig};
use ridgeline_terrain::ZoneScheme;
use std::path::Path;

const DEMO: &str = include_str!("../../../demos/analysis.yaml");

#[test]
fn test_demo_config_matches_defaults() {
    let config = AnalysisConfig::from_yaml(DEMO, Path::new("demos/analysis.yaml")).unwrap();
    config.validate().unwrap();

    let defaults = AnalysisConfig::default();
    assert_eq!(config.area, defaults.area);
    assert_eq!(config.features.contour_levels, defaults.features.contour_levels);
    assert_eq!(config.features.zone_scheme, ZoneScheme::Parana);
    assert_eq!(config.output, defaults.output);

    match config.source {
        SourceConfig::Synthetic { terrain, seed } => {
            assert_eq!(seed, Some(42));
            assert_eq!(terrain, ridgeline_dem::SyntheticTerrain::default());
        }
        other => panic!("unexpected source {other:?}"),
    }
}
