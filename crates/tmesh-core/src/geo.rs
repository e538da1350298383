//! # Geo-Quantizer — Coordinates to Grid Cells
//!
//! Maps a WGS84 coordinate onto a square-ish grid whose cell edge is
//! `precision` meters. The resulting [`GeoCell`] is the only location
//! representation the rest of the workspace handles.
//!
//! ## Algorithm
//!
//! ```text
//! lat_m     = lat * 111319.9
//! lon_m     = lon * 111319.9 * cos(lat in radians)
//! lat_index = round(lat_m / precision)
//! lon_index = round(lon_m / precision)
//! ```
//!
//! Rounding is half-away-from-zero (`f64::round`). The cosine term accounts
//! for meridian convergence. Latitude and longitude are not clamped; callers
//! supply valid WGS84 input.
//!
//! ## Canonical Bytes
//!
//! [`GeoCell::to_bytes()`] emits the latitude index then the longitude
//! index, each as a two's-complement big-endian `i64`. This fixed-width
//! form is the commitment input; it must never be replaced by a textual
//! encoding.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_319.9;

/// Grid precision used when nothing else is configured, in meters.
pub const DEFAULT_PRECISION_METERS: f64 = 100.0;

/// Grid precision for newly issued identities, in meters.
///
/// Fixed for now. Adapting precision to local population density would
/// need a density source this crate does not have.
pub fn default_precision() -> f64 {
    DEFAULT_PRECISION_METERS
}

/// Length of [`GeoCell::to_bytes()`].
pub const GEO_CELL_BYTES: usize = 16;

/// A quantized, privacy-reduced location.
///
/// Two coordinates inside the same grid cell at the same precision always
/// produce equal `GeoCell` values. A cell is never mutated; a new location
/// yields a new cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoCell {
    lat_index: i64,
    lon_index: i64,
}

impl GeoCell {
    /// Build a cell from already-quantized indices.
    pub fn from_indices(lat_index: i64, lon_index: i64) -> Self {
        Self {
            lat_index,
            lon_index,
        }
    }

    /// Latitude grid index.
    pub fn lat_index(&self) -> i64 {
        self.lat_index
    }

    /// Longitude grid index.
    pub fn lon_index(&self) -> i64 {
        self.lon_index
    }

    /// Canonical fixed-width encoding: `lat_index || lon_index`, big-endian.
    pub fn to_bytes(&self) -> [u8; GEO_CELL_BYTES] {
        let mut out = [0u8; GEO_CELL_BYTES];
        out[..8].copy_from_slice(&self.lat_index.to_be_bytes());
        out[8..].copy_from_slice(&self.lon_index.to_be_bytes());
        out
    }

    /// Inverse of [`to_bytes()`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8; GEO_CELL_BYTES]) -> Self {
        let mut lat = [0u8; 8];
        let mut lon = [0u8; 8];
        lat.copy_from_slice(&bytes[..8]);
        lon.copy_from_slice(&bytes[8..]);
        Self {
            lat_index: i64::from_be_bytes(lat),
            lon_index: i64::from_be_bytes(lon),
        }
    }

    /// Canonical string form, `"<lat_index>:<lon_index>"`.
    ///
    /// This is the secret handed to the proof-of-knowledge primitive.
    pub fn canonical_string(&self) -> String {
        format!("{}:{}", self.lat_index, self.lon_index)
    }
}

impl std::fmt::Display for GeoCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

/// Quantize a coordinate to a grid cell of `precision` meters.
///
/// # Errors
///
/// Returns [`IdentityError::InvalidPrecision`] when `precision` is not a
/// finite number strictly greater than zero.
///
/// Coordinates are not validated. Keeping them finite is the caller's job:
/// a NaN index saturates to `0` and an infinite one to `i64::MIN`/`i64::MAX`,
/// so garbage input still yields a cell rather than an error.
pub fn quantize(lat: f64, lon: f64, precision: f64) -> Result<GeoCell, IdentityError> {
    if !precision.is_finite() || precision <= 0.0 {
        return Err(IdentityError::InvalidPrecision(precision));
    }

    let lon_meters_per_degree = lat.to_radians().cos() * METERS_PER_DEGREE;
    let lat_index = (lat * METERS_PER_DEGREE / precision).round() as i64;
    let lon_index = (lon * lon_meters_per_degree / precision).round() as i64;

    Ok(GeoCell {
        lat_index,
        lon_index,
    })
}
