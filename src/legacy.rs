//! # Legacy calling conventions
//!
//! Older entry points that describe the epoch differently: by year only, by separate calendar
//! fields, by Unix seconds, or by year plus seconds into the year. Each adapter only turns its
//! epoch description into [`ModelEpoch`]s and delegates to [`crate::aacgm`], so they share the
//! caller's [`EngineState`] and its loaded epoch with the direct converters.
//!
//! The MLT adapters take an optional height, [`DEFAULT_MLT_HEIGHT_KM`] when `None`.
use itertools::izip;

use crate::aacgm::{convert, convert_mlt};
use crate::batch::{check_same_arity, Batch};
use crate::constants::{Degree, Hour, Kilometer, DEFAULT_MLT_HEIGHT_KM};
use crate::engine::{CoordinateEngine, Direction, MagneticPosition};
use crate::env_state::EngineState;
use crate::magcoords_errors::MagCoordsResult;
use crate::time::ModelEpoch;

fn height_or_default(height: Option<Batch<Kilometer>>) -> Batch<Kilometer> {
    height.unwrap_or(Batch::Scalar(DEFAULT_MLT_HEIGHT_KM))
}

/// [`convert`] at January 1st, 00:00:00 of each `year`.
///
/// `year` broadcasts like any secondary argument (length `N` or 1).
pub fn convert_by_year<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    lat: impl Into<Batch<Degree>>,
    lon: impl Into<Batch<Degree>>,
    height: impl Into<Batch<Kilometer>>,
    year: impl Into<Batch<i32>>,
    direction: impl Into<Batch<Direction>>,
) -> MagCoordsResult<Batch<MagneticPosition>> {
    let epochs = year.into().try_map(ModelEpoch::january_first)?;
    convert(state, lat, lon, height, epochs, direction)
}

/// MLT with the epoch given as separate calendar fields.
///
/// The six fields are zipped, never broadcast against each other: they must all have the same
/// length, a scalar counting as length 1.
///
/// Errors
/// ----------
/// * [`crate::magcoords_errors::MagCoordsError::ArityMismatch`] when the fields differ in length.
/// * [`crate::magcoords_errors::MagCoordsError::InvalidEpoch`] for an impossible date.
#[allow(clippy::too_many_arguments)]
pub fn mlt_from_datetime_components<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    year: impl Into<Batch<i32>>,
    month: impl Into<Batch<u8>>,
    day: impl Into<Batch<u8>>,
    hour: impl Into<Batch<u8>>,
    minute: impl Into<Batch<u8>>,
    second: impl Into<Batch<u8>>,
    mlon: impl Into<Batch<Degree>>,
    height: Option<Batch<Kilometer>>,
) -> MagCoordsResult<Batch<Hour>> {
    let (year, month, day) = (year.into(), month.into(), day.into());
    let (hour, minute, second) = (hour.into(), minute.into(), second.into());

    check_same_arity(&[
        year.len(),
        month.len(),
        day.len(),
        hour.len(),
        minute.len(),
        second.len(),
    ])?;

    let all_scalar = [
        year.is_scalar(),
        month.is_scalar(),
        day.is_scalar(),
        hour.is_scalar(),
        minute.is_scalar(),
        second.is_scalar(),
    ]
    .iter()
    .all(|&s| s);

    let epochs = izip!(&year, &month, &day, &hour, &minute, &second)
        .map(|(&y, &mo, &d, &h, &mi, &s)| ModelEpoch::from_gregorian(y, mo, d, h, mi, s))
        .collect::<MagCoordsResult<Vec<_>>>()?;
    let epochs = match (all_scalar, epochs.as_slice()) {
        (true, [epoch]) => Batch::Scalar(*epoch),
        _ => Batch::Sequence(epochs),
    };

    convert_mlt(state, mlon, height_or_default(height), epochs)
}

/// MLT with the epoch given as Unix seconds (since 1970-01-01T00:00:00 UTC).
///
/// Fractional seconds are truncated.
pub fn mlt_from_unix_epoch<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    unix_seconds: impl Into<Batch<f64>>,
    mlon: impl Into<Batch<Degree>>,
    height: Option<Batch<Kilometer>>,
) -> MagCoordsResult<Batch<Hour>> {
    let epochs = unix_seconds
        .into()
        .try_map(ModelEpoch::from_unix_seconds)?;
    convert_mlt(state, mlon, height_or_default(height), epochs)
}

/// MLT with the epoch given as a year and a number of seconds into that year.
///
/// `year` and `year_seconds` are zipped and must have the same length.
pub fn mlt_from_year_and_yday_seconds<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    year: impl Into<Batch<i32>>,
    year_seconds: impl Into<Batch<f64>>,
    mlon: impl Into<Batch<Degree>>,
    height: Option<Batch<Kilometer>>,
) -> MagCoordsResult<Batch<Hour>> {
    let (year, year_seconds) = (year.into(), year_seconds.into());
    check_same_arity(&[year.len(), year_seconds.len()])?;

    let epochs = match (year, year_seconds) {
        (Batch::Scalar(y), Batch::Scalar(s)) => {
            Batch::Scalar(ModelEpoch::from_year_seconds(y, s)?)
        }
        (year, year_seconds) => Batch::Sequence(
            year.iter()
                .zip(year_seconds.iter())
                .map(|(&y, &s)| ModelEpoch::from_year_seconds(y, s))
                .collect::<MagCoordsResult<Vec<_>>>()?,
        ),
    };

    convert_mlt(state, mlon, height_or_default(height), epochs)
}
