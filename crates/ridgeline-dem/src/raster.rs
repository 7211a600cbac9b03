//! GeoTIFF elevation rasters.

use crate::grid::ElevationPoint;
use crate::{DemError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

/// Samples at or below this value are treated as missing.
pub const NODATA_SENTINEL: f64 = -9999.0;

/// Geographic window in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a window from `(min_lon, min_lat, max_lon, max_lat)`.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if a coordinate is within the window (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// A single-band elevation raster in geographic coordinates.
///
/// Pixel `(row, col)` is centred at
/// `(origin_lat - (row + 0.5) * scale_lat, origin_lon + (col + 0.5) * scale_lon)`.
#[derive(Debug)]
pub struct DemRaster {
    /// Samples in row-major order (north to south, west to east).
    data: Vec<f64>,
    width: u32,
    height: u32,
    /// Longitude of the west edge.
    origin_lon: f64,
    /// Latitude of the north edge.
    origin_lat: f64,
    /// Degrees per pixel (longitude, latitude).
    scale: (f64, f64),
    no_data_value: Option<f64>,
}

impl DemRaster {
    /// Load a GeoTIFF file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Decode a GeoTIFF from any seekable reader.
    pub fn from_reader<R: std::io::Read + std::io::Seek>(reader: R) -> Result<Self> {
        let mut decoder = Decoder::new(reader)?;

        let mut limits = Limits::default();
        limits.decoding_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.intermediate_buffer_size = 1024 * 1024 * 1024;
        limits.ifd_value_size = 1024 * 1024 * 1024;
        decoder = decoder.with_limits(limits);

        let (width, height) = decoder.dimensions()?;
        let (origin_lon, origin_lat, scale) = Self::read_georeference(&mut decoder)?;
        let no_data_value = Self::read_nodata_value(&mut decoder)?;
        let data = Self::decode_samples(&mut decoder)?;

        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(DemError::InvalidGeoTiff(format!(
                "expected {} single-band samples, found {}",
                expected,
                data.len()
            )));
        }

        debug!(width, height, ?no_data_value, "Loaded raster");
        Ok(Self {
            data,
            width,
            height,
            origin_lon,
            origin_lat,
            scale,
            no_data_value,
        })
    }

    /// ModelTiepoint + ModelPixelScale. Tiepoint is `[i, j, k, x, y, z]`, with
    /// `(x, y)` the geographic position of pixel corner `(i, j)`.
    fn read_georeference<R: std::io::Read + std::io::Seek>(
        decoder: &mut Decoder<R>,
    ) -> Result<(f64, f64, (f64, f64))> {
        let tiepoint = decoder
            .get_tag_f64_vec(Tag::ModelTiepointTag)
            .map_err(|_| DemError::InvalidGeoTiff("missing ModelTiepoint tag".to_string()))?;
        let scale = decoder
            .get_tag_f64_vec(Tag::ModelPixelScaleTag)
            .map_err(|_| DemError::InvalidGeoTiff("missing ModelPixelScale tag".to_string()))?;

        if tiepoint.len() < 6 || scale.len() < 2 {
            return Err(DemError::InvalidGeoTiff(format!(
                "short georeference tags (tiepoint {}, scale {})",
                tiepoint.len(),
                scale.len()
            )));
        }
        if !(scale[0] > 0.0 && scale[1] > 0.0) {
            return Err(DemError::InvalidGeoTiff(format!(
                "non-positive pixel scale ({}, {})",
                scale[0], scale[1]
            )));
        }

        let origin_lon = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_lat = tiepoint[4] + tiepoint[1] * scale[1];
        Ok((origin_lon, origin_lat, (scale[0], scale[1])))
    }

    /// GDAL_NODATA is optional; a present but unparseable value is an error.
    fn read_nodata_value<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>> {
        let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
            return Ok(None);
        };
        let text = value.into_string()?;
        let trimmed = text.trim_matches(char::from(0)).trim();
        trimmed
            .parse()
            .map(Some)
            .map_err(|_| DemError::InvalidGeoTiff(format!("unparseable GDAL_NODATA value '{}'", trimmed)))
    }

    fn decode_samples<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f64>> {
        let result = decoder.read_image()?;

        let data = match result {
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
        };
        Ok(data)
    }

    /// Dimensions in pixels `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Outer bounds of the raster.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_lon: self.origin_lon,
            max_lon: self.origin_lon + self.width as f64 * self.scale.0,
            min_lat: self.origin_lat - self.height as f64 * self.scale.1,
            max_lat: self.origin_lat,
        }
    }

    /// No-data value declared by the file, if any.
    pub fn no_data_value(&self) -> Option<f64> {
        self.no_data_value
    }

    /// Geographic centre of pixel `(row, col)` as `(lat, lon)`.
    pub fn pixel_center(&self, row: u32, col: u32) -> (f64, f64) {
        (
            self.origin_lat - (row as f64 + 0.5) * self.scale.1,
            self.origin_lon + (col as f64 + 0.5) * self.scale.0,
        )
    }

    fn is_missing(&self, value: f64) -> bool {
        value.is_nan()
            || value <= NODATA_SENTINEL
            || self.no_data_value.is_some_and(|nd| (value - nd).abs() < 1e-3)
    }

    /// Valid pixels as points, row-major, optionally restricted to `bbox`.
    ///
    /// A pixel is inside the window when its centre is. Missing samples are
    /// skipped rather than reported.
    pub fn points(&self, bbox: Option<&BoundingBox>) -> Vec<ElevationPoint> {
        let mut points = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let (lat, lon) = self.pixel_center(row, col);
                if bbox.is_some_and(|b| !b.contains(lat, lon)) {
                    continue;
                }
                let value = self.data[(row as usize) * (self.width as usize) + col as usize];
                if self.is_missing(value) {
                    continue;
                }
                points.push(ElevationPoint::new(lat, lon, value));
            }
        }
        points
    }
}

/// Read valid elevation points from a GeoTIFF file.
pub fn read_raster<P: AsRef<Path>>(path: P, bbox: Option<&BoundingBox>) -> Result<Vec<ElevationPoint>> {
    let raster = DemRaster::from_file(path.as_ref())?;
    let points = raster.points(bbox);
    debug!(path = %path.as_ref().display(), count = points.len(), "Read raster points");
    Ok(points)
}
