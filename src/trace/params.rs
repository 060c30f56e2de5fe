//! # Field-line tracing parameters
//!
//! [`TraceParams`] gathers everything a trace request shares across its start points:
//! the start-point frame, the solar-wind and IMF drivers of the external field, and the
//! integration limits.
//!
//! The struct is `serde`-(de)serializable with per-field defaults, so a partial
//! configuration document only overrides what it names:
//!
//! ```rust
//! use magcoords::trace::params::TraceParams;
//!
//! let params: TraceParams = serde_json::from_str(r#"{ "pdyn": 4.0, "r_max": 30.0 }"#).unwrap();
//! assert_eq!(params.pdyn, 4.0);
//! assert_eq!(params.bz_imf, -5.0);
//! ```
//!
//! In code, use the fluent [`TraceParamsBuilder`], which validates on [`TraceParamsBuilder::build`].
//! Deserialized parameters are validated when a trace request uses them.
use std::cmp::Ordering::{Greater, Less};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::EarthRadii;
use crate::engine::{ExternalField, TraceLimits};
use crate::magcoords_errors::{MagCoordsError, MagCoordsResult};

/// Parameters of a field-line trace request.
///
/// Fields
/// -----------------
/// * `coord_frame` – frame of the start points. Only `"geo"` is supported.
/// * `v_gse` – solar wind velocity in GSE, km/s.
/// * `pdyn` – solar wind dynamic pressure, nPa.
/// * `dst` – Dst index, nT.
/// * `by_imf`, `bz_imf` – IMF components, nT.
/// * `max_steps` – step budget of one hemisphere.
/// * `r_max`, `r_min` – outer and inner boundaries, Earth radii.
/// * `step_size_max` – largest integration step, Earth radii.
/// * `tolerance` – per-step error tolerance of the integrator.
///
/// Defaults
/// -----------------
/// * `coord_frame`: `"geo"`
/// * `v_gse`: `[-400, 0, 0]`
/// * `pdyn`: 2.0, `dst`: -5.0, `by_imf`: 0.0, `bz_imf`: -5.0
/// * `max_steps`: 5000, `r_max`: 60.0, `r_min`: 1.0
/// * `step_size_max`: 0.01, `tolerance`: 1e-6
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceParams {
    #[serde(default = "default_coord_frame")]
    pub coord_frame: String,
    #[serde(default = "default_v_gse")]
    pub v_gse: [f64; 3],
    #[serde(default = "default_pdyn")]
    pub pdyn: f64,
    #[serde(default = "default_dst")]
    pub dst: f64,
    #[serde(default)]
    pub by_imf: f64,
    #[serde(default = "default_bz_imf")]
    pub bz_imf: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_r_max")]
    pub r_max: EarthRadii,
    #[serde(default = "default_r_min")]
    pub r_min: EarthRadii,
    #[serde(default = "default_step_size_max")]
    pub step_size_max: EarthRadii,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_coord_frame() -> String {
    "geo".to_string()
}
fn default_v_gse() -> [f64; 3] {
    [-400.0, 0.0, 0.0]
}
fn default_pdyn() -> f64 {
    2.0
}
fn default_dst() -> f64 {
    -5.0
}
fn default_bz_imf() -> f64 {
    -5.0
}
fn default_max_steps() -> usize {
    5000
}
fn default_r_max() -> EarthRadii {
    60.0
}
fn default_r_min() -> EarthRadii {
    1.0
}
fn default_step_size_max() -> EarthRadii {
    0.01
}
fn default_tolerance() -> f64 {
    1e-6
}

impl Default for TraceParams {
    fn default() -> Self {
        TraceParams {
            coord_frame: default_coord_frame(),
            v_gse: default_v_gse(),
            pdyn: default_pdyn(),
            dst: default_dst(),
            by_imf: 0.0,
            bz_imf: default_bz_imf(),
            max_steps: default_max_steps(),
            r_max: default_r_max(),
            r_min: default_r_min(),
            step_size_max: default_step_size_max(),
            tolerance: default_tolerance(),
        }
    }
}

impl TraceParams {
    pub fn builder() -> TraceParamsBuilder {
        TraceParamsBuilder::new()
    }

    pub fn v_gse(&self) -> Vector3<f64> {
        Vector3::from(self.v_gse)
    }

    pub fn limits(&self) -> TraceLimits {
        TraceLimits {
            step_size_max: self.step_size_max,
            tolerance: self.tolerance,
            max_steps: self.max_steps,
            r_max: self.r_max,
            r_min: self.r_min,
        }
    }

    pub fn external_field(&self) -> ExternalField {
        ExternalField {
            pdyn: self.pdyn,
            dst: self.dst,
            by_imf: self.by_imf,
            bz_imf: self.bz_imf,
        }
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff a < b and comparable (i.e., not NaN).
    #[inline]
    fn lt(a: f64, b: f64) -> bool {
        a.partial_cmp(&b) == Some(Less)
    }

    /// Check the integration limits and drivers.
    ///
    /// Run by [`TraceParamsBuilder::build`] and again by every trace request, since the
    /// fields are public and deserialized documents skip the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `0 < r_min < r_max`
    /// * `step_size_max > 0`, `tolerance > 0`, `max_steps ≥ 1`
    /// * `v_gse`, `pdyn`, `dst`, `by_imf`, `bz_imf` finite
    ///
    /// The frame is not validated here: an unsupported frame is reported by the trace
    /// request itself.
    pub fn validate(&self) -> MagCoordsResult<()> {
        if !Self::gt0(self.r_min) || !Self::lt(self.r_min, self.r_max) {
            return Err(MagCoordsError::InvalidTraceParams(format!(
                "invalid trace boundaries: r_min = {}, r_max = {}",
                self.r_min, self.r_max
            )));
        }
        if !Self::gt0(self.step_size_max) || !Self::gt0(self.tolerance) {
            return Err(MagCoordsError::InvalidTraceParams(format!(
                "invalid step control: step_size_max = {}, tolerance = {}",
                self.step_size_max, self.tolerance
            )));
        }
        if self.max_steps == 0 {
            return Err(MagCoordsError::InvalidTraceParams(
                "max_steps must be at least 1".into(),
            ));
        }
        if self.v_gse.iter().any(|v| !v.is_finite()) {
            return Err(MagCoordsError::InvalidTraceParams(format!(
                "non finite solar wind velocity: {:?}",
                self.v_gse
            )));
        }
        let field = [self.pdyn, self.dst, self.by_imf, self.bz_imf];
        if field.iter().any(|v| !v.is_finite()) {
            return Err(MagCoordsError::InvalidTraceParams(format!(
                "non finite external field drivers: {field:?}"
            )));
        }
        Ok(())
    }

    /// Check the start-point frame, case-insensitively. Anything but `geo` is fatal.
    pub(crate) fn check_frame(&self) -> MagCoordsResult<()> {
        if self.coord_frame.eq_ignore_ascii_case("geo") {
            Ok(())
        } else {
            Err(MagCoordsError::UnsupportedFrame(self.coord_frame.clone()))
        }
    }
}

/// Builder for [`TraceParams`], with validation.
#[derive(Debug, Clone)]
pub struct TraceParamsBuilder {
    params: TraceParams,
}

impl Default for TraceParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: TraceParams::default(),
        }
    }

    // --- Frame / drivers ---
    pub fn coord_frame(mut self, v: impl Into<String>) -> Self {
        self.params.coord_frame = v.into();
        self
    }
    pub fn v_gse(mut self, v: [f64; 3]) -> Self {
        self.params.v_gse = v;
        self
    }
    pub fn pdyn(mut self, v: f64) -> Self {
        self.params.pdyn = v;
        self
    }
    pub fn dst(mut self, v: f64) -> Self {
        self.params.dst = v;
        self
    }
    pub fn by_imf(mut self, v: f64) -> Self {
        self.params.by_imf = v;
        self
    }
    pub fn bz_imf(mut self, v: f64) -> Self {
        self.params.bz_imf = v;
        self
    }

    // --- Integration ---
    pub fn max_steps(mut self, v: usize) -> Self {
        self.params.max_steps = v;
        self
    }
    pub fn r_max(mut self, v: EarthRadii) -> Self {
        self.params.r_max = v;
        self
    }
    pub fn r_min(mut self, v: EarthRadii) -> Self {
        self.params.r_min = v;
        self
    }
    pub fn step_size_max(mut self, v: EarthRadii) -> Self {
        self.params.step_size_max = v;
        self
    }
    pub fn tolerance(mut self, v: f64) -> Self {
        self.params.tolerance = v;
        self
    }

    /// Finalize the builder, running [`TraceParams::validate`].
    pub fn build(self) -> MagCoordsResult<TraceParams> {
        self.params.validate()?;
        Ok(self.params)
    }
}
