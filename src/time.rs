//! # Model epochs
//!
//! [`ModelEpoch`] is the civil UTC timestamp, at **second resolution**, for which an engine
//! loads its time-dependent model coefficients. Two epochs are the same epoch when all six
//! calendar fields match; this equality is what the engine-state cache keys on.
//!
//! Every epoch is validated on construction, so the fields are only readable through getters.
//! Years are limited to [`EPOCH_YEARS`].
//!
//! Calendar validation, Julian days, and "now" are delegated to [hifitime](https://docs.rs/hifitime).
//! Second counting (Unix seconds, seconds into a year) runs on hifitime's TAI calendar, which
//! has no leap seconds, so `from_unix_seconds` agrees with the usual POSIX reading of a
//! timestamp.
use std::fmt;
use std::ops::RangeInclusive;

use hifitime::{Epoch, TimeScale, Unit};

use crate::constants::{DPI, SECONDS_PER_DAY, T2000};
use crate::magcoords_errors::MagCoordsError;

/// Years an epoch may fall in.
pub const EPOCH_YEARS: RangeInclusive<i32> = -9999..=9999;

/// Largest offset accepted by the second-counting constructors, about 31 700 years.
const MAX_OFFSET_SECONDS: f64 = 1.0e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelEpoch {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl ModelEpoch {
    /// Build an epoch from calendar components.
    ///
    /// Arguments
    /// -----------------
    /// * `year`, `month`, `day`, `hour`, `minute`, `second`: UTC calendar fields.
    ///
    /// Return
    /// ----------
    /// * The epoch, or [`MagCoordsError::InvalidEpoch`] if any field is out of range
    ///   (e.g. February 30th, hour 24, a year outside [`EPOCH_YEARS`]).
    pub fn from_gregorian(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, MagCoordsError> {
        let stamp = format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}");
        if !EPOCH_YEARS.contains(&year) {
            return Err(MagCoordsError::InvalidEpoch(format!(
                "{stamp}: year outside {EPOCH_YEARS:?}"
            )));
        }
        if hour > 23 || second > 59 {
            return Err(MagCoordsError::InvalidEpoch(format!(
                "{stamp}: time of day out of range"
            )));
        }
        Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, second, 0)
            .map_err(|e| MagCoordsError::InvalidEpoch(format!("{stamp}: {e}")))?;

        Ok(ModelEpoch {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// January 1st, 00:00:00 of `year`. This is the epoch the year-only legacy calls use.
    pub fn january_first(year: i32) -> Result<Self, MagCoordsError> {
        Self::from_gregorian(year, 1, 1, 0, 0, 0)
    }

    /// Epoch from a count of seconds since 1970-01-01T00:00:00 UTC.
    ///
    /// The fractional part is truncated toward the past; the engines only see whole seconds.
    pub fn from_unix_seconds(seconds: f64) -> Result<Self, MagCoordsError> {
        Self::january_first(1970)?.offset_by(seconds)
    }

    /// Epoch `year_seconds` after January 1st, 00:00:00 of `year`.
    pub fn from_year_seconds(year: i32, year_seconds: f64) -> Result<Self, MagCoordsError> {
        Self::january_first(year)?.offset_by(year_seconds)
    }

    /// Truncate a hifitime [`Epoch`] to a whole-second UTC model epoch.
    pub fn from_hifitime(epoch: Epoch) -> Result<Self, MagCoordsError> {
        let (year, month, day, hour, minute, second, _nanos) = epoch.to_gregorian_utc();
        Self::from_gregorian(year, month, day, hour, minute, second.min(59))
    }

    /// The current UTC time, truncated to the second.
    pub fn now() -> Result<Self, MagCoordsError> {
        Self::from_hifitime(Epoch::now()?)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn to_hifitime(&self) -> Epoch {
        // fields were validated by `from_gregorian`
        Epoch::from_gregorian(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            0,
            TimeScale::UTC,
        )
    }

    /// Julian Day (UTC) of this epoch.
    pub fn julian_day(&self) -> f64 {
        self.to_hifitime().to_jde_utc_days()
    }

    /// Modified Julian Date (UTC) of this epoch.
    pub fn mjd(&self) -> f64 {
        self.to_hifitime().to_mjd_utc_days()
    }

    /// Day of the year, 1-based.
    pub fn day_of_year(&self) -> u16 {
        self.calendar().day_of_year().floor() as u16
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    /// Decimal year, as used to interpolate yearly coefficient tables.
    pub fn decimal_year(&self) -> f64 {
        let days_in_year = (Epoch::from_gregorian_tai_at_midnight(self.year + 1, 1, 1)
            - Epoch::from_gregorian_tai_at_midnight(self.year, 1, 1))
        .to_unit(Unit::Day);
        let elapsed = self.calendar().duration_in_year().to_unit(Unit::Day);
        self.year as f64 + elapsed / days_in_year
    }

    /// The same calendar fields on the TAI time scale: a calendar without leap seconds.
    fn calendar(&self) -> Epoch {
        Epoch::from_gregorian_tai(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            0,
        )
    }

    /// Shift by `seconds` of calendar time, floored to a whole second.
    fn offset_by(&self, seconds: f64) -> Result<Self, MagCoordsError> {
        if !seconds.is_finite() || seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(MagCoordsError::InvalidEpoch(format!(
                "{seconds} s after {self} is out of range"
            )));
        }
        let shifted = self.calendar() + Unit::Second * seconds.floor() as i64;
        let (year, month, day, hour, minute, second, _nanos) = shifted.to_gregorian_tai();
        Self::from_gregorian(year, month, day, hour, minute, second)
    }
}

impl fmt::Display for ModelEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl TryFrom<Epoch> for ModelEpoch {
    type Error = MagCoordsError;

    fn try_from(epoch: Epoch) -> Result<Self, Self::Error> {
        ModelEpoch::from_hifitime(epoch)
    }
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date.
///
/// This function implements the IAU 1982 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate. UTC is used in place of UT1,
/// which is well within the accuracy of the dipole frame it orients.
///
/// # Arguments
/// * `tjm` - Modified Julian Date
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / SECONDS_PER_DAY;

    let h = tjm.fract() * DPI;
    (gmst0 + h * RAP).rem_euclid(DPI)
}
