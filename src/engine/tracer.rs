//! # Centered-dipole field-line tracer
//!
//! [`DipoleTracer`] is a pure-Rust [`FieldLineEngine`] working in the GSW frame of the
//! Tsyganenko models, with the internal field reduced to the centered IGRF dipole.
//! External-field drivers (`pdyn`, `dst`, IMF) are accepted and ignored.
//!
//! ## Frame
//!
//! [`FieldLineEngine::configure_solar_wind`] builds the GEO → GSW rotation for the epoch:
//!
//! 1. Sun direction from the apparent solar longitude and obliquity, taken from GEI to GEO
//!    with the Greenwich mean sidereal time.
//! 2. `x_gsw` antiparallel to the solar wind velocity (given in GSE, so the default
//!    `[-400, 0, 0]` km/s puts `x_gsw` on the Sun–Earth line).
//! 3. `z_gsw` the projection of the northern dipole axis on the plane normal to `x_gsw`,
//!    `y_gsw = z_gsw × x_gsw`.
//!
//! ## Integration
//!
//! Fourth-order Runge–Kutta on the unit field direction, with step doubling: each step is
//! compared against two half steps, halved while the difference exceeds `tolerance`, and
//! grown back up to `step_size_max` when it is well below. The trace stops
//!
//! * below `r_min`, the last point being moved onto the `r_min` sphere,
//! * above `r_max`,
//! * when the path holds `max_steps` points, reported as not converged.
use nalgebra::{Matrix3, Rotation3, Vector3};
use tracing::debug;

use crate::constants::{Radian, RADEG};
use crate::engine::dipole::DipoleCoefficients;
use crate::engine::{ExternalField, FieldLineEngine, FieldLineTrace, TraceDirection, TraceLimits};
use crate::magcoords_errors::{MagCoordsError, MagCoordsResult};
use crate::solar::{apparent_obliquity, apparent_solar_longitude, jde_of};
use crate::time::{gmst, ModelEpoch};

#[derive(Debug, Clone, PartialEq)]
pub struct DipoleTracer {
    /// `None`: the embedded table, resolved when the solar wind is configured.
    coefficients: Option<DipoleCoefficients>,
    geo_to_gsw: Matrix3<f64>,
    /// Unit dipole moment (pointing south), GSW.
    moment: Vector3<f64>,
    configured: Option<ModelEpoch>,
}

impl Default for DipoleTracer {
    fn default() -> Self {
        DipoleTracer {
            coefficients: None,
            geo_to_gsw: Matrix3::identity(),
            moment: -Vector3::z(),
            configured: None,
        }
    }
}

/// Sun direction and ecliptic north pole, unit vectors in GEO.
pub(crate) fn sun_and_ecliptic_pole(epoch: &ModelEpoch) -> (Vector3<f64>, Vector3<f64>) {
    let jd = jde_of(epoch);
    let lambda = apparent_solar_longitude(jd) * RADEG;
    let eps = apparent_obliquity(jd) * RADEG;

    let sun_gei = Vector3::new(lambda.cos(), eps.cos() * lambda.sin(), eps.sin() * lambda.sin());
    let pole_gei = Vector3::new(0.0, -eps.sin(), eps.cos());

    let gei_to_geo = Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst(epoch.mjd()));
    (gei_to_geo * sun_gei, gei_to_geo * pole_gei)
}

impl DipoleTracer {
    pub fn new(coefficients: DipoleCoefficients) -> Self {
        DipoleTracer {
            coefficients: Some(coefficients),
            ..Default::default()
        }
    }

    pub fn configured_epoch(&self) -> Option<&ModelEpoch> {
        self.configured.as_ref()
    }

    /// Dipole tilt angle: positive when the northern dipole axis leans toward `x_gsw`.
    pub fn dipole_tilt(&self) -> Radian {
        (-self.moment.x).clamp(-1.0, 1.0).asin()
    }

    /// Unit vector along the dipole field at `r`.
    fn field_direction(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let r_hat = r.normalize();
        (3.0 * self.moment.dot(&r_hat) * r_hat - self.moment).normalize()
    }

    fn rk4(&self, p: &Vector3<f64>, h: f64, sign: f64) -> Vector3<f64> {
        let f = |q: Vector3<f64>| -sign * self.field_direction(&q);
        let k1 = f(*p);
        let k2 = f(p + k1 * (h / 2.0));
        let k3 = f(p + k2 * (h / 2.0));
        let k4 = f(p + k3 * h);
        p + (k1 + 2.0 * k2 + 2.0 * k3 + k4) * (h / 6.0)
    }
}

/// Point where the segment `outside → inside` crosses the sphere of radius `r`.
fn onto_sphere(outside: &Vector3<f64>, inside: &Vector3<f64>, r: f64) -> Vector3<f64> {
    let d = inside - outside;
    let a = d.norm_squared();
    let b = 2.0 * outside.dot(&d);
    let c = outside.norm_squared() - r * r;
    let disc = b * b - 4.0 * a * c;

    if a == 0.0 || c < 0.0 || disc < 0.0 {
        return inside * (r / inside.norm());
    }
    let t = ((-b - disc.sqrt()) / (2.0 * a)).clamp(0.0, 1.0);
    outside + d * t
}

impl FieldLineEngine for DipoleTracer {
    fn configure_solar_wind(
        &mut self,
        epoch: &ModelEpoch,
        v_gse: &Vector3<f64>,
    ) -> MagCoordsResult<()> {
        let axis = DipoleCoefficients::or_builtin(self.coefficients.as_ref())?
            .dipole_axis(epoch.decimal_year())?;
        let (sun, ecliptic_pole) = sun_and_ecliptic_pole(epoch);

        let y_gse = ecliptic_pole.cross(&sun);
        let v_geo = sun * v_gse.x + y_gse * v_gse.y + ecliptic_pole * v_gse.z;
        // no flow: fall back on the Sun-Earth line (GSM)
        let x = if v_geo.norm() > 0.0 {
            -v_geo.normalize()
        } else {
            sun
        };

        let z = axis - x * axis.dot(&x);
        if z.norm() == 0.0 {
            return Err(MagCoordsError::EngineInit(
                "solar wind flow aligned with the dipole axis".into(),
            ));
        }
        let z = z.normalize();
        let y = z.cross(&x);

        self.geo_to_gsw = Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);
        self.moment = self.geo_to_gsw * -axis;
        self.configured = Some(*epoch);

        debug!(
            epoch = %epoch,
            tilt_deg = self.dipole_tilt() / RADEG,
            "solar wind configured"
        );
        Ok(())
    }

    fn geo_to_working(&self, geo: &Vector3<f64>) -> Vector3<f64> {
        self.geo_to_gsw * geo
    }

    fn working_to_geo(&self, working: &Vector3<f64>) -> Vector3<f64> {
        self.geo_to_gsw.transpose() * working
    }

    fn trace(
        &self,
        start: &Vector3<f64>,
        direction: TraceDirection,
        limits: &TraceLimits,
        _field: &ExternalField,
    ) -> MagCoordsResult<FieldLineTrace> {
        if self.configured.is_none() {
            return Err(MagCoordsError::EngineInit(
                "field-line tracer used before configure_solar_wind".into(),
            ));
        }

        let sign = direction.sign();
        let h_max = limits.step_size_max;
        let h_min = h_max * 1e-6;

        let mut path = Vec::with_capacity(limits.max_steps.min(1024));
        path.push(*start);
        let mut p = *start;
        let mut h = h_max;

        while path.len() < limits.max_steps {
            let full = self.rk4(&p, h, sign);
            let half = self.rk4(&self.rk4(&p, h / 2.0, sign), h / 2.0, sign);
            let err = (half - full).norm() / 15.0;

            if err > limits.tolerance && h > h_min {
                h /= 2.0;
                continue;
            }
            let next = half + (half - full) / 15.0;
            if err < limits.tolerance / 32.0 {
                h = (2.0 * h).min(h_max);
            }

            let r = next.norm();
            if r <= limits.r_min {
                let foot = onto_sphere(&p, &next, limits.r_min);
                path.push(foot);
                return Ok(FieldLineTrace {
                    end: foot,
                    path,
                    converged: true,
                });
            }
            path.push(next);
            if r >= limits.r_max {
                return Ok(FieldLineTrace {
                    end: next,
                    path,
                    converged: true,
                });
            }
            p = next;
        }

        path.shrink_to_fit();
        Ok(FieldLineTrace {
            end: p,
            path,
            converged: false,
        })
    }
}
