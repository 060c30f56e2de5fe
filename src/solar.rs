//! # Low-precision solar position
//!
//! Solar and lunar quantities needed to orient magnetic local time and the GSW frame,
//! following the low-accuracy algorithms of J. Meeus, *Astronomical Algorithms* (2nd ed.,
//! Willmann-Bell, 1998), chapters 7, 22 and 25.
//!
//! ## Overview
//!
//! All functions take a Julian Day and return **degrees**, except
//! [`equation_of_time`] which returns **minutes** in `[-20, 20]` and
//! [`jde2calendar`] which returns calendar fields.
//!
//! ```text
//! mean_solar_longitude ─┐
//! mean_solar_anomaly ───┴─► geometric_solar_longitude ─► apparent_solar_longitude ─┐
//! lunar_ascending_node ────────────────────────────────► apparent_obliquity ───────┴─► declination, RA
//! ```
//!
//! Accuracy is about 0.01°, which is far below the resolution of the magnetic models fed by it.
use crate::constants::{JulianDay, J2000, RADEG};
use crate::time::ModelEpoch;

/// Julian centuries since J2000.0
#[inline]
fn centuries(jd: JulianDay) -> f64 {
    (jd - J2000) / 36525.0
}

#[inline]
fn wrap360(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Decimal day of month from the day and the time of day.
pub fn dday(day: u8, hour: u8, minute: u8, second: u8) -> f64 {
    day as f64 + hour as f64 / 24.0 + minute as f64 / 1440.0 + second as f64 / 86400.0
}

/// Julian Day of a Gregorian calendar date (Meeus, chapter 7).
///
/// Arguments
/// -----------------
/// * `year`: full four-digit year.
/// * `month`: 1-12.
/// * `day`: decimal day of month, see [`dday`].
pub fn jde(year: i32, month: u8, day: f64) -> JulianDay {
    let (year, month) = if month <= 2 {
        (year - 1, month as i32 + 12)
    } else {
        (year, month as i32)
    };

    let a = year / 100;
    let b = (2 - a + a / 4) as f64;

    (365.25 * (year + 4716) as f64).trunc() + (30.6001 * (month + 1) as f64).trunc() + day + b
        - 1524.5
}

/// Julian Day of a model epoch.
pub fn jde_of(epoch: &ModelEpoch) -> JulianDay {
    jde(
        epoch.year(),
        epoch.month(),
        dday(epoch.day(), epoch.hour(), epoch.minute(), epoch.second()),
    )
}

/// Calendar fields `(year, month, day, hour, minute, second)` of a Julian Day.
///
/// Seconds are rounded to the nearest whole second, so a value of 60 can come out of an
/// input a fraction of a second before the minute.
pub fn jde2calendar(jd: JulianDay) -> (i32, u8, u8, u8, u8, u8) {
    let jd = jd + 0.5;
    let z = jd.trunc() as i64;
    let f = jd - z as f64;

    let a = if z < 2_299_161 {
        z
    } else {
        let alpha = ((z as f64 - 1_867_216.25) / 36524.25) as i64;
        z + 1 + alpha - alpha / 4
    };
    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25) as i64;
    let d = (365.25 * c as f64) as i64;
    let e = ((b - d) as f64 / 30.6001) as i64;

    let month = if e < 14 { e - 1 } else { e - 13 };
    let year = if month > 2 { c - 4716 } else { c - 4715 };

    let decimal_day = (b - d) as f64 - (30.6001 * e as f64).trunc() + f;
    let day = decimal_day.trunc();
    let mut resid = (decimal_day - day) * 24.0;
    let hour = resid.trunc();
    resid = (resid - hour) * 60.0;
    let minute = resid.trunc();
    resid = (resid - minute) * 60.0;
    let second = (resid + 0.5).trunc();

    (
        year as i32,
        month as u8,
        day as u8,
        hour as u8,
        minute as u8,
        second as u8,
    )
}

/// Mean solar longitude, degrees in `[0, 360)`.
pub fn mean_solar_longitude(jd: JulianDay) -> f64 {
    const COEFS: [f64; 6] = [
        280.4664567,
        360007.6982779,
        0.03032028,
        2.00276381406e-5,
        -6.53594771242e-5,
        -0.50e-6,
    ];
    // millennia, not centuries
    let tau = (jd - J2000) / 365250.0;
    let sl = COEFS.iter().rev().fold(0.0, |acc, c| tau * acc + c);
    wrap360(sl)
}

/// Mean solar anomaly, degrees in `[0, 360)`.
pub fn mean_solar_anomaly(jd: JulianDay) -> f64 {
    let tau = centuries(jd);
    wrap360(357.5291130 + 35999.05029 * tau - 0.0001537 * tau * tau)
}

/// Geometric (true) solar longitude: mean longitude plus the equation of center.
pub fn geometric_solar_longitude(jd: JulianDay) -> f64 {
    let tau = centuries(jd);
    let sma = RADEG * mean_solar_anomaly(jd);

    let center = (1.914602 - 0.004817 * tau - 0.000014 * tau * tau) * sma.sin()
        + (0.019993 - 0.000101 * tau) * (2.0 * sma).sin()
        + 0.000289 * (3.0 * sma).sin();

    wrap360(mean_solar_longitude(jd) + center)
}

/// Longitude of the Moon's mean ascending node, degrees in `[0, 360)`.
pub fn lunar_ascending_node(jd: JulianDay) -> f64 {
    let tau = centuries(jd);
    let omega = ((tau / 4.50e5 + 2.0708e-3) * tau - 1.934136261e3) * tau + 125.04452;
    wrap360(omega)
}

/// Mean lunar longitude, degrees in `[0, 360)`.
pub fn mean_lunar_longitude(jd: JulianDay) -> f64 {
    wrap360(218.3165 + 481267.8813 * centuries(jd))
}

/// Apparent solar longitude, corrected for nutation and aberration.
pub fn apparent_solar_longitude(jd: JulianDay) -> f64 {
    geometric_solar_longitude(jd) - 0.00569 - 0.00478 * (RADEG * lunar_ascending_node(jd)).sin()
}

/// Mean obliquity of the ecliptic, degrees.
pub fn mean_obliquity(jd: JulianDay) -> f64 {
    const COEFS: [f64; 4] = [
        23.439291111111,
        -0.0130041666667,
        -1.638888889e-7,
        5.036111111e-7,
    ];
    let tau = centuries(jd);
    ((COEFS[3] * tau + COEFS[2]) * tau + COEFS[1]) * tau + COEFS[0]
}

/// Apparent obliquity of the ecliptic, degrees.
pub fn apparent_obliquity(jd: JulianDay) -> f64 {
    mean_obliquity(jd) + 0.00256 * (RADEG * lunar_ascending_node(jd)).cos()
}

/// Nutation in longitude and in obliquity, both in degrees.
///
/// Return
/// ----------
/// * `(Δψ, Δε)`
pub fn nutation_corr(jd: JulianDay) -> (f64, f64) {
    let slong = RADEG * mean_solar_longitude(jd);
    let lunlong = RADEG * mean_lunar_longitude(jd);
    let omega = RADEG * lunar_ascending_node(jd);

    // arcseconds
    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * slong).sin() - 0.23 * (2.0 * lunlong).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * slong).cos() + 0.10 * (2.0 * lunlong).cos()
        - 0.09 * (2.0 * omega).cos();

    (dpsi / 3600.0, deps / 3600.0)
}

/// Apparent solar declination, degrees.
pub fn solar_declination(jd: JulianDay) -> f64 {
    let sindec = (RADEG * apparent_obliquity(jd)).sin()
        * (RADEG * apparent_solar_longitude(jd)).sin();
    sindec.asin() / RADEG
}

/// Apparent solar right ascension, **degrees** in `(-180, 180]`.
pub fn solar_right_ascension(jd: JulianDay) -> f64 {
    let slong = RADEG * apparent_solar_longitude(jd);
    let eps = RADEG * apparent_obliquity(jd);
    (eps.cos() * slong.sin()).atan2(slong.cos()) / RADEG
}

/// Equation of time, apparent minus mean solar time, in **minutes**.
///
/// A positive value means the true Sun crosses the meridian before the mean Sun.
/// The result always lies in `[-20, 20]`.
pub fn equation_of_time(jd: JulianDay) -> f64 {
    let sml = mean_solar_longitude(jd);
    let sra = solar_right_ascension(jd);
    let obliq = mean_obliquity(jd);
    let (dpsi, deps) = nutation_corr(jd);

    let eqt = wrap360(sml - 0.0057183 - sra + dpsi * (RADEG * (obliq + deps)).cos()) * 4.0;
    if eqt > 20.0 {
        eqt - 24.0 * 60.0
    } else {
        eqt
    }
}
