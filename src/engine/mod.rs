//! # Engine seams
//!
//! The physics behind this crate lives in two collaborators that the batching layer only
//! reaches through narrow traits:
//!
//! * [`CoordinateEngine`] – a magnetic-coordinate model with a single loaded epoch
//!   (AACGM-v2 or the built-in [`dipole::DipoleEngine`]).
//! * [`FieldLineEngine`] – a magnetospheric field model with a line tracer
//!   (Tsyganenko-style, or the built-in [`tracer::DipoleTracer`]).
//!
//! ## Overview
//!
//! ```text
//! aacgm::convert ─┐
//! aacgm::convert_mlt ─┼─► EngineState<E: CoordinateEngine> ─► set_epoch / convert / convert_mlt
//! legacy::*  ─────┘
//!
//! trace::trace ─────────► F: FieldLineEngine ─► configure_solar_wind / geo_to_working / trace
//! ```
//!
//! Engines are plain owned values: the converters take them by `&mut`, so exclusive access to
//! the loaded model epoch is enforced at compile time.
use nalgebra::Vector3;

use crate::constants::{Degree, EarthRadii, Hour, Kilometer};
use crate::magcoords_errors::{MagCoordsError, MagCoordsResult};
use crate::time::ModelEpoch;

pub mod dipole;
pub mod tracer;

/// Direction flag of a coordinate conversion.
///
/// The integer values are the ones the AACGM library uses: `0` for geographic → magnetic,
/// `1` for magnetic → geographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Direction {
    #[default]
    GeoToMag = 0,
    MagToGeo = 1,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::GeoToMag => Direction::MagToGeo,
            Direction::MagToGeo => Direction::GeoToMag,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = MagCoordsError;

    fn try_from(flag: i32) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(Direction::GeoToMag),
            1 => Ok(Direction::MagToGeo),
            other => Err(MagCoordsError::InvalidDirection(other)),
        }
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> Self {
        direction as i32
    }
}

/// Output of a single conversion job.
///
/// For [`Direction::GeoToMag`] `lat`/`lon` are AACGM coordinates, for
/// [`Direction::MagToGeo`] they are geographic ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticPosition {
    pub lat: Degree,
    pub lon: Degree,
    /// Radial distance in Earth radii, as reported by the engine.
    pub r: EarthRadii,
}

/// Output of a single MLT job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticLocalTime {
    /// Magnetic local time, hours in `[0, 24)`.
    pub mlt: Hour,
    /// Magnetic longitude of the subsolar point, degrees.
    pub mean_solar_longitude: Degree,
}

/// A magnetic-coordinate model holding one loaded epoch at a time.
///
/// Loading an epoch is the expensive step (coefficient reload and time interpolation).
/// Callers are expected to go through [`crate::env_state::EngineState`], which only calls
/// [`CoordinateEngine::set_epoch`] when the epoch actually changes.
pub trait CoordinateEngine {
    /// Load (or interpolate) the model coefficients for `epoch`.
    fn set_epoch(&mut self, epoch: &ModelEpoch) -> MagCoordsResult<()>;

    /// Convert one position at the currently loaded epoch.
    ///
    /// Arguments
    /// -----------------
    /// * `lat`, `lon`: input coordinates in degrees.
    /// * `height`: altitude above the reference sphere in km.
    /// * `direction`: geographic → magnetic or the reverse.
    fn convert(
        &mut self,
        lat: Degree,
        lon: Degree,
        height: Kilometer,
        direction: Direction,
    ) -> MagCoordsResult<MagneticPosition>;

    /// Magnetic local time of a magnetic longitude at the currently loaded epoch.
    fn convert_mlt(&mut self, mlon: Degree, height: Kilometer)
        -> MagCoordsResult<MagneticLocalTime>;
}

/// Direction of integration along a field line.
///
/// The signs are those of the Tsyganenko tracer: `+1` follows the field antiparallel to **B**
/// and lands in the southern hemisphere, `-1` follows **B** to the northern one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum TraceDirection {
    TowardNorth = -1,
    TowardSouth = 1,
}

impl TraceDirection {
    pub fn sign(self) -> f64 {
        self as i8 as f64
    }
}

/// Step and boundary limits of one field-line integration, distances in Earth radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceLimits {
    pub step_size_max: EarthRadii,
    pub tolerance: f64,
    pub max_steps: usize,
    pub r_max: EarthRadii,
    pub r_min: EarthRadii,
}

/// External (magnetospheric) field drivers, in the units of the T96 model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalField {
    /// Solar wind dynamic pressure, nPa.
    pub pdyn: f64,
    /// Dst index, nT.
    pub dst: f64,
    /// IMF By, nT.
    pub by_imf: f64,
    /// IMF Bz, nT.
    pub bz_imf: f64,
}

/// One integrated field line, in the working frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLineTrace {
    pub end: Vector3<f64>,
    /// Visited positions, start included, trimmed to their true length.
    pub path: Vec<Vector3<f64>>,
    /// `false` when the step budget ran out before a boundary was reached.
    pub converged: bool,
}

/// A field model with a tracer, working in its own Cartesian frame (GSW for Tsyganenko).
pub trait FieldLineEngine {
    /// Configure the time-dependent frame and the solar wind for a whole request.
    ///
    /// Arguments
    /// -----------------
    /// * `epoch`: the epoch of the request.
    /// * `v_gse`: solar wind velocity in GSE, km/s.
    fn configure_solar_wind(&mut self, epoch: &ModelEpoch, v_gse: &Vector3<f64>)
        -> MagCoordsResult<()>;

    /// Rotate a GEO Cartesian vector into the working frame.
    fn geo_to_working(&self, geo: &Vector3<f64>) -> Vector3<f64>;

    /// Rotate a working-frame vector back to GEO.
    fn working_to_geo(&self, working: &Vector3<f64>) -> Vector3<f64>;

    /// Integrate the field line through `start` until a boundary or the step budget.
    fn trace(
        &self,
        start: &Vector3<f64>,
        direction: TraceDirection,
        limits: &TraceLimits,
        field: &ExternalField,
    ) -> MagCoordsResult<FieldLineTrace>;
}

#[cfg(test)]
mod engine_test {
    use super::*;

    #[test]
    fn test_direction_flags() {
        assert_eq!(Direction::try_from(0), Ok(Direction::GeoToMag));
        assert_eq!(Direction::try_from(1), Ok(Direction::MagToGeo));
        assert_eq!(
            Direction::try_from(2),
            Err(MagCoordsError::InvalidDirection(2))
        );
        assert_eq!(i32::from(Direction::MagToGeo), 1);
        assert_eq!(Direction::GeoToMag.inverse(), Direction::MagToGeo);
        assert_eq!(Direction::default(), Direction::GeoToMag);
    }

    #[test]
    fn test_trace_direction_sign() {
        assert_eq!(TraceDirection::TowardNorth.sign(), -1.0);
        assert_eq!(TraceDirection::TowardSouth.sign(), 1.0);
    }
}
