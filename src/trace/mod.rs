//! # Field-line tracing
//!
//! [`trace`] follows the magnetic field line through each of a set of start points down to
//! both hemispheres, through a [`FieldLineEngine`].
//!
//! ## Overview
//!
//! A request is one [`TraceParams`] shared by `M ≥ 1` start points. The engine is configured
//! for the epoch and solar wind **once per request**, then each point goes through:
//!
//! ```text
//! START ─► CONVERTED_TO_CARTESIAN ─► TRACED_SOUTH ─► TRACED_NORTH ─► FOOTPOINTS_RECORDED
//! ```
//!
//! * `(lat, lon, rho)` is taken to GEO Cartesian coordinates in Earth radii
//!   ([`EARTH_RADIUS_KM`]), then to the engine's working frame;
//! * the line is integrated antiparallel to **B** (southern footpoint), then along **B**
//!   (northern footpoint);
//! * each end point comes back to GEO `(lat°, lon°, rho km)`.
//!
//! Paths stay in the working frame, in Earth radii, each with its own length.
//!
//! ## Non-convergence
//!
//! A hemisphere whose integration runs out of steps is kept with `converged = false`, its
//! footpoint being the last point reached. The point is reported as [`TraceStatus::Diverged`],
//! a warning is logged, and the request goes on with the next point.
//!
//! ## Example
//!
//! ```rust
//! use magcoords::engine::tracer::DipoleTracer;
//! use magcoords::time::ModelEpoch;
//! use magcoords::trace::{params::TraceParams, trace, StartPoint};
//!
//! let mut engine = DipoleTracer::default();
//! let epoch = ModelEpoch::from_gregorian(2012, 7, 1, 0, 0, 0).unwrap();
//! let points = [StartPoint::new(45.0, 0.0, 6372.0)];
//!
//! let result = trace(&mut engine, &points, Some(epoch), &TraceParams::default()).unwrap();
//! let south = result.points[0].south.footpoint;
//! assert!(south.lat < 0.0);
//! ```
use std::fmt;

use nalgebra::Vector3;
use tracing::{trace as trace_log, warn};

use crate::constants::{Degree, Kilometer, EARTH_RADIUS_KM, RADEG};
use crate::engine::{FieldLineEngine, TraceDirection};
use crate::magcoords_errors::{MagCoordsError, MagCoordsResult};
use crate::time::ModelEpoch;

pub mod params;

use params::TraceParams;

/// A geographic position: latitude and longitude in degrees, distance from the Earth's
/// center in km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: Degree,
    pub lon: Degree,
    pub rho: Kilometer,
}

/// Start point of a trace.
pub type StartPoint = GeoPoint;

impl GeoPoint {
    pub fn new(lat: Degree, lon: Degree, rho: Kilometer) -> Self {
        GeoPoint { lat, lon, rho }
    }

    /// GEO Cartesian position in Earth radii.
    pub fn to_cartesian(&self) -> Vector3<f64> {
        let r = self.rho / EARTH_RADIUS_KM;
        let theta = (90.0 - self.lat) * RADEG;
        let phi = self.lon * RADEG;
        Vector3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        )
    }

    /// Position of a GEO Cartesian vector in Earth radii. Longitudes are in `[0, 360)`.
    pub fn from_cartesian(v: &Vector3<f64>) -> Self {
        let r = v.norm();
        let theta = if r > 0.0 {
            (v.z / r).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        let phi = v.y.atan2(v.x);
        GeoPoint {
            lat: 90.0 - theta / RADEG,
            lon: (phi / RADEG).rem_euclid(360.0),
            rho: r * EARTH_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hemisphere::North => write!(f, "NH"),
            Hemisphere::South => write!(f, "SH"),
        }
    }
}

/// The trace of one point toward one hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereTrace {
    pub footpoint: GeoPoint,
    /// Working-frame positions in Earth radii, start point first.
    pub path: Vec<Vector3<f64>>,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceStatus {
    Converged,
    /// At least one hemisphere ran out of steps.
    Diverged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointTrace {
    pub start: StartPoint,
    /// Start point in the working frame, Earth radii.
    pub start_working: Vector3<f64>,
    pub north: HemisphereTrace,
    pub south: HemisphereTrace,
}

impl PointTrace {
    pub fn status(&self) -> TraceStatus {
        if self.north.converged && self.south.converged {
            TraceStatus::Converged
        } else {
            TraceStatus::Diverged
        }
    }

    pub fn hemisphere(&self, hemisphere: Hemisphere) -> &HemisphereTrace {
        match hemisphere {
            Hemisphere::North => &self.north,
            Hemisphere::South => &self.south,
        }
    }

    /// The whole field line, from the northern footpoint to the southern one.
    pub fn field_line(&self) -> Vec<Vector3<f64>> {
        self.north
            .path
            .iter()
            .rev()
            .chain(self.south.path.iter())
            .copied()
            .collect()
    }
}

/// Result of a trace request, one [`PointTrace`] per start point, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceResult {
    pub epoch: ModelEpoch,
    pub params: TraceParams,
    pub points: Vec<PointTrace>,
}

impl TraceResult {
    /// Indices of the points flagged [`TraceStatus::Diverged`].
    pub fn diverged(&self) -> impl Iterator<Item = usize> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status() == TraceStatus::Diverged)
            .map(|(i, _)| i)
    }
}

impl fmt::Display for TraceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        writeln!(f, "epoch={}", self.epoch)?;
        writeln!(
            f,
            "vswgse=[{:6.0},{:6.0},{:6.0}]    [km/s]",
            p.v_gse[0], p.v_gse[1], p.v_gse[2]
        )?;
        writeln!(f, "pdyn={:3.0}                        [nPa]", p.pdyn)?;
        writeln!(f, "dst={:3.0}                         [nT]", p.dst)?;
        writeln!(f, "byimf={:3.0}                       [nT]", p.by_imf)?;
        writeln!(f, "bzimf={:3.0}                       [nT]", p.bz_imf)?;
        writeln!(f)?;
        write!(
            f,
            "(latitude [degrees], longitude [degrees], distance from center of the Earth [km])"
        )?;

        for point in &self.points {
            let (s, n, sh) = (&point.start, &point.north.footpoint, &point.south.footpoint);
            write!(
                f,
                "\n({:6.3}, {:6.3}, {:6.3})\n    --> NH({:6.3}, {:6.3}, {:6.3})\n    --> SH({:6.3}, {:6.3}, {:6.3})",
                s.lat, s.lon, s.rho, n.lat, n.lon, n.rho, sh.lat, sh.lon, sh.rho
            )?;
            if point.status() == TraceStatus::Diverged {
                write!(f, "\n    [diverged]")?;
            }
        }
        Ok(())
    }
}

/// Trace the field lines through a set of start points, toward both hemispheres.
///
/// Arguments
/// -----------------
/// * `engine`: the field model, configured once for the request.
/// * `points`: GEO start points, at least one.
/// * `epoch`: epoch of the request, the current UTC time when `None`.
/// * `params`: frame, solar wind, external field drivers, integration limits.
///
/// Return
/// ----------
/// * One [`PointTrace`] per start point. Non-converging hemispheres are flagged, not dropped.
///
/// Errors
/// ----------
/// * [`MagCoordsError::UnsupportedFrame`] when `params.coord_frame` is not `geo`.
/// * [`MagCoordsError::InvalidTraceParams`] when the limits or drivers fail [`TraceParams::validate`].
/// * [`MagCoordsError::EmptyTraceRequest`] when `points` is empty.
/// * Any error of the engine.
pub fn trace<F: FieldLineEngine>(
    engine: &mut F,
    points: &[StartPoint],
    epoch: Option<ModelEpoch>,
    params: &TraceParams,
) -> MagCoordsResult<TraceResult> {
    params.check_frame()?;
    params.validate()?;
    if points.is_empty() {
        return Err(MagCoordsError::EmptyTraceRequest);
    }
    let epoch = match epoch {
        Some(epoch) => epoch,
        None => ModelEpoch::now()?,
    };

    engine.configure_solar_wind(&epoch, &params.v_gse())?;
    let limits = params.limits();
    let field = params.external_field();
    trace_log!(points = points.len(), epoch = %epoch, "field-line trace request");

    let traced = points
        .iter()
        .enumerate()
        .map(|(index, start)| {
            let start_working = engine.geo_to_working(&start.to_cartesian());

            let leg = |direction: TraceDirection, hemisphere: Hemisphere| {
                let line = engine.trace(&start_working, direction, &limits, &field)?;
                if !line.converged {
                    warn!(
                        point = index,
                        hemisphere = %hemisphere,
                        steps = line.path.len(),
                        "field-line trace did not converge"
                    );
                }
                Ok::<_, MagCoordsError>(HemisphereTrace {
                    footpoint: GeoPoint::from_cartesian(&engine.working_to_geo(&line.end)),
                    path: line.path,
                    converged: line.converged,
                })
            };

            let south = leg(TraceDirection::TowardSouth, Hemisphere::South)?;
            let north = leg(TraceDirection::TowardNorth, Hemisphere::North)?;

            Ok(PointTrace {
                start: *start,
                start_working,
                north,
                south,
            })
        })
        .collect::<MagCoordsResult<Vec<_>>>()?;

    Ok(TraceResult {
        epoch,
        params: params.clone(),
        points: traced,
    })
}
