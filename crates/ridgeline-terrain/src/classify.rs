//! Slope classes and altitude zones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relief class of a slope in degrees (EMBRAPA scheme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeClass {
    /// Below 3 degrees.
    Flat,
    /// 3 to 8 degrees.
    GentlyUndulating,
    /// 8 to 20 degrees.
    Undulating,
    /// 20 to 45 degrees.
    StronglyUndulating,
    /// 45 to 75 degrees.
    Mountainous,
    /// 75 degrees and above.
    Escarpment,
}

impl SlopeClass {
    /// Classify a slope in degrees.
    pub fn from_degrees(slope: f64) -> Self {
        if slope < 3.0 {
            SlopeClass::Flat
        } else if slope < 8.0 {
            SlopeClass::GentlyUndulating
        } else if slope < 20.0 {
            SlopeClass::Undulating
        } else if slope < 45.0 {
            SlopeClass::StronglyUndulating
        } else if slope < 75.0 {
            SlopeClass::Mountainous
        } else {
            SlopeClass::Escarpment
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlopeClass::Flat => "Flat",
            SlopeClass::GentlyUndulating => "Gently Undulating",
            SlopeClass::Undulating => "Undulating",
            SlopeClass::StronglyUndulating => "Strongly Undulating",
            SlopeClass::Mountainous => "Mountainous",
            SlopeClass::Escarpment => "Escarpment",
        }
    }
}

impl fmt::Display for SlopeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which altitude zoning to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneScheme {
    /// Paraná physiographic provinces.
    #[default]
    Parana,
    /// Generic lowland/highland bands.
    Generic,
}

/// Altitude zone of an elevation in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationZone {
    CoastalPlain,
    FirstPlateau,
    SecondPlateau,
    ThirdPlateau,
    MountainZone,
    Lowlands,
    Midlands,
    Highlands,
    Mountainous,
}

impl ElevationZone {
    /// Classify `elevation` under `scheme`.
    pub fn classify(elevation: f64, scheme: ZoneScheme) -> Self {
        match scheme {
            ZoneScheme::Parana => {
                if elevation < 300.0 {
                    ElevationZone::CoastalPlain
                } else if elevation < 600.0 {
                    ElevationZone::FirstPlateau
                } else if elevation < 900.0 {
                    ElevationZone::SecondPlateau
                } else if elevation < 1200.0 {
                    ElevationZone::ThirdPlateau
                } else {
                    ElevationZone::MountainZone
                }
            }
            ZoneScheme::Generic => {
                if elevation < 200.0 {
                    ElevationZone::Lowlands
                } else if elevation < 500.0 {
                    ElevationZone::Midlands
                } else if elevation < 1000.0 {
                    ElevationZone::Highlands
                } else {
                    ElevationZone::Mountainous
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ElevationZone::CoastalPlain => "Coastal Plain",
            ElevationZone::FirstPlateau => "First Plateau",
            ElevationZone::SecondPlateau => "Second Plateau",
            ElevationZone::ThirdPlateau => "Third Plateau",
            ElevationZone::MountainZone => "Mountain Zone",
            ElevationZone::Lowlands => "Lowlands",
            ElevationZone::Midlands => "Midlands",
            ElevationZone::Highlands => "Highlands",
            ElevationZone::Mountainous => "Mountainous",
        }
    }
}

impl fmt::Display for ElevationZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_class_boundaries() {
        assert_eq!(SlopeClass::from_degrees(0.0), SlopeClass::Flat);
        assert_eq!(SlopeClass::from_degrees(2.99), SlopeClass::Flat);
        assert_eq!(SlopeClass::from_degrees(3.0), SlopeClass::GentlyUndulating);
        assert_eq!(SlopeClass::from_degrees(8.0), SlopeClass::Undulating);
        assert_eq!(SlopeClass::from_degrees(20.0), SlopeClass::StronglyUndulating);
        assert_eq!(SlopeClass::from_degrees(45.0), SlopeClass::Mountainous);
        assert_eq!(SlopeClass::from_degrees(75.0), SlopeClass::Escarpment);
        assert_eq!(SlopeClass::from_degrees(89.0).to_string(), "Escarpment");
    }

    #[test]
    fn test_parana_zones() {
        let zone = |e| ElevationZone::classify(e, ZoneScheme::Parana);
        assert_eq!(zone(10.0), ElevationZone::CoastalPlain);
        assert_eq!(zone(300.0), ElevationZone::FirstPlateau);
        assert_eq!(zone(899.9), ElevationZone::SecondPlateau);
        assert_eq!(zone(900.0), ElevationZone::ThirdPlateau);
        assert_eq!(zone(1200.0), ElevationZone::MountainZone);
    }

    #[test]
    fn test_generic_zones() {
        let zone = |e| ElevationZone::classify(e, ZoneScheme::Generic);
        assert_eq!(zone(199.0), ElevationZone::Lowlands);
        assert_eq!(zone(200.0), ElevationZone::Midlands);
        assert_eq!(zone(999.0), ElevationZone::Highlands);
        assert_eq!(zone(1000.0).label(), "Mountainous");
    }
}
