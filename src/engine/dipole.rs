//! # Centered-dipole coordinate engine
//!
//! [`DipoleEngine`] is a pure-Rust [`CoordinateEngine`]: the centered-dipole limit of AACGM.
//! It needs no native library and no coefficient files, which makes it the default engine of
//! the crate and the reference engine of its tests.
//!
//! ## Model
//!
//! * **Coefficients** – the first-degree IGRF Gauss coefficients `(g10, g11, h11)` every five
//!   years, embedded as CSV text ([`IGRF_DIPOLE_CSV`]). Loading an epoch interpolates them
//!   linearly in decimal year; past the last row they are extrapolated for five years with the
//!   last rate of change.
//! * **Frame** – `z` along the northern dipole axis (colatitude `acos(-g10/B0)`, longitude
//!   `atan2(-h11, -g11)`), `y = ẑ_geo × z`, `x = y × z`.
//! * **Height** – positions at altitude `h` are mapped along their dipole field line down to
//!   the reference sphere: `cos²λ₀ = cos²λ · Re / (Re + h)`. The reverse mapping does not exist
//!   when `cos²λ₀ · (Re + h) / Re > 1`, i.e. the field line never climbs to `h`; this is
//!   reported as [`MagCoordsError::ConversionUndefined`]. `r` is always `1.0`.
//! * **MLT** – the subsolar point (solar declination, and longitude from the apparent solar
//!   time) is taken to magnetic longitude `mslong`, then `mlt = 12 + (mlon − mslong) / 15`.
//!
//! ## Alternative coefficient tables
//!
//! ```text
//! DipoleCoefficients::builtin()            embedded table
//! DipoleCoefficients::from_csv_path(path)  CSV with a `year,g10,g11,h11` header
//! DipoleCoefficients::from_env()           $MAGCOORDS_DIPOLE_COEFFS, else the embedded table
//! ```
use std::io::Read;


use camino::Utf8Path;
use nalgebra::{Matrix3, Vector3};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{Degree, Kilometer, DEGREES_PER_HOUR, EARTH_RADIUS_KM, RADEG};
use crate::engine::{CoordinateEngine, Direction, MagneticLocalTime, MagneticPosition};
use crate::magcoords_errors::{MagCoordsError, MagCoordsResult};
use crate::solar::{equation_of_time, jde_of, solar_declination};
use crate::time::ModelEpoch;

/// Environment variable naming an alternative coefficient table.
pub const DIPOLE_COEFFS_ENV: &str = "MAGCOORDS_DIPOLE_COEFFS";

/// Years a table may be extrapolated past its last row.
const EXTRAPOLATION_YEARS: f64 = 5.0;

/// IGRF dipole Gauss coefficients, nT.
pub const IGRF_DIPOLE_CSV: &str = "\
year,g10,g11,h11
1900,-31543,-2298,5922
1905,-31464,-2298,5909
1910,-31354,-2297,5898
1915,-31212,-2306,5875
1920,-31060,-2317,5845
1925,-30926,-2318,5817
1930,-30805,-2316,5808
1935,-30715,-2306,5812
1940,-30654,-2292,5821
1945,-30594,-2285,5810
1950,-30554,-2250,5815
1955,-30500,-2215,5820
1960,-30421,-2169,5791
1965,-30334,-2119,5776
1970,-30220,-2068,5737
1975,-30100,-2013,5675
1980,-29992,-1956,5604
1985,-29873,-1905,5500
1990,-29775,-1848,5406
1995,-29692,-1784,5306
2000,-29619.4,-1728.2,5186.1
2005,-29554.63,-1669.05,5077.99
2010,-29496.57,-1586.42,4944.26
2015,-29441.46,-1501.77,4795.99
2020,-29403.41,-1451.37,4653.35
2025,-29350.0,-1410.3,4545.5
";

static BUILTIN: OnceCell<DipoleCoefficients> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DipoleRow {
    pub year: f64,
    pub g10: f64,
    pub g11: f64,
    pub h11: f64,
}

/// A yearly table of dipole coefficients, sorted by year.
#[derive(Debug, Clone, PartialEq)]
pub struct DipoleCoefficients {
    rows: Vec<DipoleRow>,
}

impl DipoleCoefficients {
    /// The embedded IGRF table, parsed on first use.
    ///
    /// A row of [`IGRF_DIPOLE_CSV`] that fails to parse is an error, never skipped.
    pub fn builtin() -> MagCoordsResult<&'static DipoleCoefficients> {
        BUILTIN.get_or_try_init(|| Self::from_csv_reader(IGRF_DIPOLE_CSV.as_bytes()))
    }

    /// `table`, or the embedded one when there is none.
    pub(crate) fn or_builtin(
        table: Option<&DipoleCoefficients>,
    ) -> MagCoordsResult<&DipoleCoefficients> {
        match table {
            Some(table) => Ok(table),
            None => Self::builtin(),
        }
    }

    /// Build a table from rows, which must be non-empty and strictly increasing in year.
    pub fn from_rows(rows: Vec<DipoleRow>) -> MagCoordsResult<Self> {
        if rows.is_empty() {
            return Err(MagCoordsError::EngineInit(
                "empty dipole coefficient table".into(),
            ));
        }
        if rows.windows(2).any(|w| w[0].year >= w[1].year) {
            return Err(MagCoordsError::EngineInit(
                "dipole coefficient years must be strictly increasing".into(),
            ));
        }
        Ok(DipoleCoefficients { rows })
    }

    /// Read a `year,g10,g11,h11` CSV table.
    pub fn from_csv_path(path: &Utf8Path) -> MagCoordsResult<Self> {
        let table = Self::from_csv_reader(std::fs::File::open(path)?)?;
        debug!(path = %path, rows = table.rows.len(), "dipole coefficient table loaded");
        Ok(table)
    }

    /// Read a `year,g10,g11,h11` CSV table from any reader. Every row must parse.
    pub fn from_csv_reader<R: Read>(reader: R) -> MagCoordsResult<Self> {
        let rows = csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<DipoleRow>, csv::Error>>()?;
        Self::from_rows(rows)
    }

    /// The table named by [`DIPOLE_COEFFS_ENV`], or the embedded one when it is unset.
    pub fn from_env() -> MagCoordsResult<Self> {
        match std::env::var(DIPOLE_COEFFS_ENV) {
            Ok(path) => Self::from_csv_path(Utf8Path::new(&path)),
            Err(_) => Ok(Self::builtin()?.clone()),
        }
    }

    pub fn rows(&self) -> &[DipoleRow] {
        &self.rows
    }

    /// Coefficients `(g10, g11, h11)` at a decimal year.
    ///
    /// Return
    /// ----------
    /// * Linear interpolation between the surrounding rows, or extrapolation with the last rate
    ///   for up to five years past the last row. [`MagCoordsError::InvalidEpoch`] outside
    ///   that range.
    pub fn at(&self, decimal_year: f64) -> MagCoordsResult<(f64, f64, f64)> {
        let (first, last) = match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(MagCoordsError::EngineInit(
                    "empty dipole coefficient table".into(),
                ))
            }
        };
        if !(first.year..=last.year + EXTRAPOLATION_YEARS).contains(&decimal_year) {
            return Err(MagCoordsError::InvalidEpoch(format!(
                "year {decimal_year:.3} outside the dipole coefficient range [{}, {}]",
                first.year,
                last.year + EXTRAPOLATION_YEARS
            )));
        }

        // index of the interval start; the last interval is reused past the end
        let i = self
            .rows
            .partition_point(|row| row.year <= decimal_year)
            .saturating_sub(1)
            .min(self.rows.len().saturating_sub(2));

        match (self.rows.get(i), self.rows.get(i + 1)) {
            (Some(a), Some(b)) => {
                let f = (decimal_year - a.year) / (b.year - a.year);
                Ok((
                    a.g10 + f * (b.g10 - a.g10),
                    a.g11 + f * (b.g11 - a.g11),
                    a.h11 + f * (b.h11 - a.h11),
                ))
            }
            _ => Ok((first.g10, first.g11, first.h11)),
        }
    }

    /// Unit vector, in GEO, along the northern dipole axis at a decimal year.
    pub fn dipole_axis(&self, decimal_year: f64) -> MagCoordsResult<Vector3<f64>> {
        let (g10, g11, h11) = self.at(decimal_year)?;
        let b0 = (g10 * g10 + g11 * g11 + h11 * h11).sqrt();
        let colat = (-g10 / b0).acos();
        let lon = (-h11).atan2(-g11);
        Ok(Vector3::new(
            colat.sin() * lon.cos(),
            colat.sin() * lon.sin(),
            colat.cos(),
        ))
    }
}

/// Unit vector of a latitude/longitude pair, degrees.
pub(crate) fn unit_vector(lat: Degree, lon: Degree) -> Vector3<f64> {
    let (lat, lon) = (lat * RADEG, lon * RADEG);
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Latitude and longitude, degrees, of a non-zero vector. Longitude is in `(-180, 180]`.
pub(crate) fn lat_lon(v: &Vector3<f64>) -> (Degree, Degree) {
    let lat = (v.z / v.norm()).clamp(-1.0, 1.0).asin() / RADEG;
    let lon = v.y.atan2(v.x) / RADEG;
    (lat, lon)
}

/// Rotation GEO → dipole frame for a northern dipole axis.
pub(crate) fn dipole_frame(axis: &Vector3<f64>) -> Matrix3<f64> {
    let z = axis.normalize();
    let y = Vector3::z().cross(&z).normalize();
    let x = y.cross(&z);
    Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()])
}

#[derive(Debug, Clone, PartialEq)]
struct LoadedDipole {
    geo_to_mag: Matrix3<f64>,
    mean_solar_longitude: Degree,
}

/// Centered-dipole magnetic coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DipoleEngine {
    /// `None`: the embedded table, resolved when an epoch is loaded.
    coefficients: Option<DipoleCoefficients>,
    loaded: Option<LoadedDipole>,
}

impl DipoleEngine {
    pub fn new(coefficients: DipoleCoefficients) -> Self {
        DipoleEngine {
            coefficients: Some(coefficients),
            loaded: None,
        }
    }

    /// Engine over the table of [`DipoleCoefficients::from_env`].
    pub fn from_env() -> MagCoordsResult<Self> {
        Ok(Self::new(DipoleCoefficients::from_env()?))
    }

    pub fn coefficients(&self) -> MagCoordsResult<&DipoleCoefficients> {
        DipoleCoefficients::or_builtin(self.coefficients.as_ref())
    }

    fn loaded(&self) -> MagCoordsResult<&LoadedDipole> {
        self.loaded.as_ref().ok_or_else(|| {
            MagCoordsError::EngineInit("no epoch loaded in the dipole engine".into())
        })
    }
}

/// Geographic longitude of the subsolar point and solar declination, degrees.
fn subsolar_point(epoch: &ModelEpoch) -> (Degree, Degree) {
    let jd = jde_of(epoch);
    let eqt = equation_of_time(jd);
    let dec = solar_declination(jd);

    let apparent_time = epoch.seconds_of_day() as f64 + eqt * 60.0;
    let slon = (43200.0 - apparent_time) * DEGREES_PER_HOUR / 3600.0;
    (dec, slon)
}

impl CoordinateEngine for DipoleEngine {
    fn set_epoch(&mut self, epoch: &ModelEpoch) -> MagCoordsResult<()> {
        let axis = self.coefficients()?.dipole_axis(epoch.decimal_year())?;
        let geo_to_mag = dipole_frame(&axis);

        let (dec, slon) = subsolar_point(epoch);
        let (_, mean_solar_longitude) = lat_lon(&(geo_to_mag * unit_vector(dec, slon)));

        self.loaded = Some(LoadedDipole {
            geo_to_mag,
            mean_solar_longitude,
        });
        Ok(())
    }

    fn convert(
        &mut self,
        lat: Degree,
        lon: Degree,
        height: Kilometer,
        direction: Direction,
    ) -> MagCoordsResult<MagneticPosition> {
        let loaded = self.loaded()?;
        let scale = EARTH_RADIUS_KM / (EARTH_RADIUS_KM + height);

        match direction {
            Direction::GeoToMag => {
                let (mlat, mlon) = lat_lon(&(loaded.geo_to_mag * unit_vector(lat, lon)));
                let cos2 = (mlat * RADEG).cos().powi(2) * scale;
                let mlat = mlat.signum() * cos2.sqrt().acos() / RADEG;
                Ok(MagneticPosition {
                    lat: mlat,
                    lon: mlon,
                    r: 1.0,
                })
            }
            Direction::MagToGeo => {
                let cos2 = (lat * RADEG).cos().powi(2) / scale;
                if cos2 > 1.0 {
                    return Err(MagCoordsError::ConversionUndefined { lat, lon, height });
                }
                let mlat = lat.signum() * cos2.sqrt().acos() / RADEG;
                let geo = loaded.geo_to_mag.transpose() * unit_vector(mlat, lon);
                let (glat, glon) = lat_lon(&geo);
                Ok(MagneticPosition {
                    lat: glat,
                    lon: glon,
                    r: 1.0,
                })
            }
        }
    }

    fn convert_mlt(
        &mut self,
        mlon: Degree,
        _height: Kilometer,
    ) -> MagCoordsResult<MagneticLocalTime> {
        // dipole longitudes do not depend on height
        let mslong = self.loaded()?.mean_solar_longitude;
        let mlt = (12.0 + (mlon - mslong) / DEGREES_PER_HOUR).rem_euclid(24.0);
        Ok(MagneticLocalTime {
            mlt,
            mean_solar_longitude: mslong,
        })
    }
}
