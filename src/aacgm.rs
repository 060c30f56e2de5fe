//! # AACGM coordinate and MLT converters
//!
//! Batch front-ends over a [`CoordinateEngine`]: they normalize scalar-or-sequence inputs,
//! broadcast the secondary arguments, keep the engine's loaded epoch in sync job by job, and
//! shape the result like the primary argument.
//!
//! ## Overview
//!
//! | Function                                   | Primary arg | Result                          |
//! |--------------------------------------------|-------------|---------------------------------|
//! | [`convert`]                                | `lat`       | `Batch<MagneticPosition>`       |
//! | [`convert_mlt`]                            | `mlon`      | `Batch<Hour>`                   |
//! | [`convert_mlt_with_mean_solar_longitude`]  | `mlon`      | `Batch<MagneticLocalTime>`      |
//!
//! Jobs run in input order. Before each job the state reloads the engine only if the job's
//! epoch differs from the loaded one, so a batch sorted by epoch costs one reload per distinct
//! run of equal epochs.
//!
//! ## Example
//!
//! ```rust
//! use magcoords::aacgm::convert;
//! use magcoords::batch::Batch;
//! use magcoords::engine::{dipole::DipoleEngine, Direction};
//! use magcoords::env_state::EngineState;
//! use magcoords::time::ModelEpoch;
//!
//! let mut state = EngineState::new(DipoleEngine::default());
//! let epoch = ModelEpoch::from_gregorian(2014, 3, 22, 3, 11, 0).unwrap();
//!
//! let single = convert(&mut state, 45.5, -23.5, 1135.0, epoch, Direction::GeoToMag).unwrap();
//! assert!(single.is_scalar());
//!
//! let many = convert(
//!     &mut state,
//!     vec![45.5, 65.5],
//!     vec![-23.5, 93.5],
//!     1135.0,
//!     epoch,
//!     Direction::GeoToMag,
//! )
//! .unwrap();
//! assert_eq!(many.len(), 2);
//! assert_eq!(state.reload_count(), 1);
//! ```
use itertools::izip;
use tracing::trace;

use crate::batch::{collapse_like, Batch};
use crate::constants::{Degree, Hour, Kilometer};
use crate::engine::{CoordinateEngine, Direction, MagneticLocalTime, MagneticPosition};
use crate::env_state::EngineState;
use crate::magcoords_errors::{MagCoordsError, MagCoordsResult};
use crate::time::ModelEpoch;

/// Convert a batch of positions between geographic and AACGM coordinates.
///
/// Arguments
/// -----------------
/// * `state`: engine and loaded-epoch cache, updated in place.
/// * `lat`, `lon`: input latitudes and longitudes (degrees). Must have the same length `N`.
/// * `height`: altitude in km, length `N` or 1.
/// * `epoch`: epoch of each job, length `N` or 1.
/// * `direction`: conversion direction of each job, length `N` or 1.
///
/// Return
/// ----------
/// * One [`MagneticPosition`] per job, a bare `Scalar` when `lat` was a `Scalar`.
///
/// Errors
/// ----------
/// * [`MagCoordsError::ShapeMismatch`] when `lon` is not of length `N`, or when a secondary
///   argument is of neither length `N` nor 1. Nothing is sent to the engine in that case.
/// * Any error of the engine, which aborts the batch.
pub fn convert<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    lat: impl Into<Batch<Degree>>,
    lon: impl Into<Batch<Degree>>,
    height: impl Into<Batch<Kilometer>>,
    epoch: impl Into<Batch<ModelEpoch>>,
    direction: impl Into<Batch<Direction>>,
) -> MagCoordsResult<Batch<MagneticPosition>> {
    let lat = lat.into();
    let lon = lon.into();
    let n = lat.len();

    if lon.len() != n {
        return Err(MagCoordsError::ShapeMismatch {
            argument: "lon",
            len: lon.len(),
            expected: n,
        });
    }
    let heights = height.into().broadcast_to(n, "height")?;
    let epochs = epoch.into().broadcast_to(n, "epoch")?;
    let directions = direction.into().broadcast_to(n, "direction")?;

    trace!(jobs = n, scalar = lat.is_scalar(), "coordinate conversion batch");

    let positions = izip!(lat.iter(), lon.iter(), &heights, &epochs, &directions)
        .map(|(&lat, &lon, &height, epoch, &direction)| {
            state.ensure_epoch(epoch)?;
            state.engine_mut().convert(lat, lon, height, direction)
        })
        .collect::<MagCoordsResult<Vec<_>>>()?;

    Ok(collapse_like(&lat, positions))
}

/// Magnetic local time of a batch of magnetic longitudes.
///
/// Same broadcasting and epoch caching as [`convert`], with `mlon` as the primary argument.
/// Only the MLT is returned; see [`convert_mlt_with_mean_solar_longitude`] to also get the
/// mean solar longitude.
pub fn convert_mlt<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    mlon: impl Into<Batch<Degree>>,
    height: impl Into<Batch<Kilometer>>,
    epoch: impl Into<Batch<ModelEpoch>>,
) -> MagCoordsResult<Batch<Hour>> {
    Ok(convert_mlt_with_mean_solar_longitude(state, mlon, height, epoch)?.map(|m| m.mlt))
}

/// Magnetic local time and mean solar longitude of a batch of magnetic longitudes.
///
/// Arguments
/// -----------------
/// * `state`: engine and loaded-epoch cache, updated in place.
/// * `mlon`: magnetic longitudes in degrees, length `N`.
/// * `height`: altitude in km, length `N` or 1.
/// * `epoch`: epoch of each job, length `N` or 1.
///
/// Return
/// ----------
/// * One [`MagneticLocalTime`] per job, a bare `Scalar` when `mlon` was a `Scalar`.
pub fn convert_mlt_with_mean_solar_longitude<E: CoordinateEngine>(
    state: &mut EngineState<E>,
    mlon: impl Into<Batch<Degree>>,
    height: impl Into<Batch<Kilometer>>,
    epoch: impl Into<Batch<ModelEpoch>>,
) -> MagCoordsResult<Batch<MagneticLocalTime>> {
    let mlon = mlon.into();
    let n = mlon.len();
    let heights = height.into().broadcast_to(n, "height")?;
    let epochs = epoch.into().broadcast_to(n, "epoch")?;

    trace!(jobs = n, scalar = mlon.is_scalar(), "mlt conversion batch");

    let times = izip!(mlon.iter(), &heights, &epochs)
        .map(|(&mlon, &height, epoch)| {
            state.ensure_epoch(epoch)?;
            state.engine_mut().convert_mlt(mlon, height)
        })
        .collect::<MagCoordsResult<Vec<_>>>()?;

    Ok(collapse_like(&mlon, times))
}

#[cfg(test)]
mod aacgm_test {
    use super::*;
    use crate::unit_test_global::RecordingEngine;

    fn t(hour: u8) -> ModelEpoch {
        ModelEpoch::from_gregorian(2014, 3, 22, hour, 11, 0).unwrap()
    }

    #[test]
    fn test_scalar_in_scalar_out() {
        let mut state = EngineState::new(RecordingEngine::default());
        let res = convert(&mut state, 45.5, -23.5, 1135.0, t(3), Direction::GeoToMag).unwrap();
        assert!(res.is_scalar());

        let res = convert(
            &mut state,
            vec![45.5],
            vec![-23.5],
            1135.0,
            t(3),
            Direction::GeoToMag,
        )
        .unwrap();
        assert!(!res.is_scalar());
        assert_eq!(res.len(), 1);
    }

    #[test]
    fn test_lat_lon_length_mismatch() {
        let mut state = EngineState::new(RecordingEngine::default());
        let err = convert(
            &mut state,
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0],
            0.0,
            t(3),
            Direction::GeoToMag,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MagCoordsError::ShapeMismatch {
                argument: "lon",
                len: 2,
                expected: 3
            }
        );
        // rejected before any engine call
        assert_eq!(state.reload_count(), 0);
        assert!(state.engine().convert_calls.is_empty());
    }

    #[test]
    fn test_scalar_lon_does_not_broadcast() {
        let mut state = EngineState::new(RecordingEngine::default());
        let res = convert(
            &mut state,
            vec![1.0, 2.0],
            5.0,
            0.0,
            t(3),
            Direction::GeoToMag,
        );
        assert!(matches!(
            res,
            Err(MagCoordsError::ShapeMismatch {
                argument: "lon",
                ..
            })
        ));
    }

    #[test]
    fn test_secondary_mismatch_names_argument() {
        let mut state = EngineState::new(RecordingEngine::default());
        let res = convert(
            &mut state,
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            0.0,
            vec![t(1), t(2)],
            Direction::GeoToMag,
        );
        assert_eq!(
            res,
            Err(MagCoordsError::ShapeMismatch {
                argument: "epoch",
                len: 2,
                expected: 3
            })
        );
    }

    #[test]
    fn test_jobs_in_order_with_broadcast() {
        let mut state = EngineState::new(RecordingEngine::default());
        convert(
            &mut state,
            vec![10.0, 20.0, 30.0],
            vec![1.0, 2.0, 3.0],
            vec![100.0],
            t(3),
            vec![Direction::GeoToMag, Direction::MagToGeo, Direction::GeoToMag],
        )
        .unwrap();

        let calls = &state.engine().convert_calls;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], (10.0, 1.0, 100.0, Direction::GeoToMag, Some(t(3))));
        assert_eq!(calls[1], (20.0, 2.0, 100.0, Direction::MagToGeo, Some(t(3))));
        assert_eq!(calls[2], (30.0, 3.0, 100.0, Direction::GeoToMag, Some(t(3))));
    }

    #[test]
    fn test_epoch_change_minimality() {
        let mut state = EngineState::new(RecordingEngine::default());
        convert(
            &mut state,
            vec![0.0; 4],
            vec![0.0; 4],
            0.0,
            vec![t(1), t(1), t(2), t(1)],
            Direction::GeoToMag,
        )
        .unwrap();

        let engine = state.engine();
        assert_eq!(engine.set_epoch_calls, vec![t(1), t(2), t(1)]);
        // reloads happen right before jobs 0, 2 and 3
        let at: Vec<_> = engine.convert_calls.iter().map(|c| c.4).collect();
        assert_eq!(at, vec![Some(t(1)), Some(t(1)), Some(t(2)), Some(t(1))]);
    }

    #[test]
    fn test_state_shared_with_mlt() {
        let mut state = EngineState::new(RecordingEngine::default());
        convert(&mut state, 0.0, 0.0, 0.0, t(5), Direction::GeoToMag).unwrap();
        convert_mlt(&mut state, vec![10.0, 20.0], 0.0, t(5)).unwrap();
        assert_eq!(state.reload_count(), 1);

        convert_mlt(&mut state, 10.0, 0.0, t(6)).unwrap();
        assert_eq!(state.reload_count(), 2);
        assert_eq!(state.loaded_epoch(), Some(&t(6)));
    }

    #[test]
    fn test_mlt_shapes() {
        let mut state = EngineState::new(RecordingEngine::default());
        let mlt = convert_mlt(&mut state, 30.0, 350.0, t(0)).unwrap();
        assert!(mlt.is_scalar());

        let both =
            convert_mlt_with_mean_solar_longitude(&mut state, vec![30.0, 45.0], 350.0, t(0))
                .unwrap();
        assert_eq!(both.len(), 2);
        let only = convert_mlt(&mut state, vec![30.0, 45.0], 350.0, t(0)).unwrap();
        let projected: Vec<f64> = both.iter().map(|m| m.mlt).collect();
        assert_eq!(only.into_vec(), projected);
    }

    #[test]
    fn test_empty_batch() {
        let mut state = EngineState::new(RecordingEngine::default());
        let res = convert(
            &mut state,
            Vec::<f64>::new(),
            Vec::<f64>::new(),
            0.0,
            t(0),
            Direction::GeoToMag,
        )
        .unwrap();
        assert_eq!(res, Batch::Sequence(vec![]));
        assert_eq!(state.reload_count(), 0);
    }

    #[test]
    fn test_engine_error_aborts_batch() {
        let mut state = EngineState::new(RecordingEngine::failing_on(t(2)));
        let res = convert(
            &mut state,
            vec![0.0; 3],
            vec![0.0; 3],
            0.0,
            vec![t(1), t(2), t(1)],
            Direction::GeoToMag,
        );
        assert!(res.is_err());
        assert_eq!(state.engine().convert_calls.len(), 1);
    }
}
