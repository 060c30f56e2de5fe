use approx::assert_abs_diff_eq;
use magcoords::aacgm::{convert, convert_mlt, convert_mlt_with_mean_solar_longitude};
use magcoords::batch::Batch;
use magcoords::engine::dipole::DipoleEngine;
use magcoords::engine::Direction;
use magcoords::env_state::EngineState;
use magcoords::magcoords_errors::MagCoordsError;
use magcoords::time::ModelEpoch;

mod common;
use common::{datetime_fixtures, ReplayEngine};

const ACCURACY: f64 = 1e-6;

#[test]
fn test_convert_scalar_fixtures() {
    let mut state = EngineState::new(ReplayEngine::all());
    for f in datetime_fixtures() {
        let res = convert(&mut state, f.glat, f.glon, f.height, f.epoch, Direction::GeoToMag)
            .unwrap()
            .scalar()
            .unwrap();
        assert_abs_diff_eq!(res.lat, f.mlat, epsilon = ACCURACY);
        assert_abs_diff_eq!(res.lon, f.mlon, epsilon = ACCURACY);
        assert_abs_diff_eq!(res.r, f.r, epsilon = ACCURACY);
    }
}

#[test]
fn test_convert_sequence_fixtures() {
    let fixtures = datetime_fixtures();
    let mut state = EngineState::new(ReplayEngine::all());

    let res = convert(
        &mut state,
        fixtures.iter().map(|f| f.glat).collect::<Vec<_>>(),
        fixtures.iter().map(|f| f.glon).collect::<Vec<_>>(),
        fixtures.iter().map(|f| f.height).collect::<Vec<_>>(),
        fixtures.iter().map(|f| f.epoch).collect::<Vec<_>>(),
        Direction::GeoToMag,
    )
    .unwrap();

    assert_eq!(res.len(), fixtures.len());
    for (got, f) in res.iter().zip(&fixtures) {
        assert_abs_diff_eq!(got.lat, f.mlat, epsilon = ACCURACY);
        assert_abs_diff_eq!(got.lon, f.mlon, epsilon = ACCURACY);
    }
    // 2014, then four jobs in 1997, then 2004
    assert_eq!(state.reload_count(), 3);
}

#[test]
fn test_convert_broadcast_scalar_epoch_and_height() {
    let f = datetime_fixtures()[0];
    let mut state = EngineState::new(ReplayEngine::all());

    let res = convert(
        &mut state,
        vec![f.glat; 10],
        vec![f.glon; 10],
        f.height,
        f.epoch,
        Direction::GeoToMag,
    )
    .unwrap();

    assert_eq!(res.len(), 10);
    assert!(res.iter().all(|p| (p.lat - f.mlat).abs() < ACCURACY));
    assert_eq!(state.reload_count(), 1);
    assert_eq!(state.engine().jobs, 10);
}

#[test]
fn test_inverse_direction() {
    let f = datetime_fixtures()[2];
    let mut state = EngineState::new(ReplayEngine::all());
    let res = convert(&mut state, f.mlat, f.mlon, f.height, f.epoch, Direction::MagToGeo)
        .unwrap()
        .scalar()
        .unwrap();
    assert_abs_diff_eq!(res.lat, f.glat, epsilon = ACCURACY);
    assert_abs_diff_eq!(res.lon, f.glon, epsilon = ACCURACY);

    let flag = Direction::try_from(1).unwrap();
    assert_eq!(flag, Direction::MagToGeo);
    assert_eq!(Direction::try_from(2), Err(MagCoordsError::InvalidDirection(2)));
}

#[test]
fn test_mlt_fixtures() {
    let fixtures = datetime_fixtures();
    let mut state = EngineState::new(ReplayEngine::all());

    for f in &fixtures {
        let m = convert_mlt_with_mean_solar_longitude(&mut state, f.mlon, f.height, f.epoch)
            .unwrap()
            .scalar()
            .unwrap();
        assert_abs_diff_eq!(m.mlt, f.mlt, epsilon = ACCURACY);
        assert_abs_diff_eq!(m.mean_solar_longitude, f.mslong, epsilon = ACCURACY);
    }

    let mlt = convert_mlt(
        &mut state,
        fixtures.iter().map(|f| f.mlon).collect::<Batch<_>>(),
        fixtures.iter().map(|f| f.height).collect::<Vec<_>>(),
        fixtures.iter().map(|f| f.epoch).collect::<Vec<_>>(),
    )
    .unwrap();
    for (got, f) in mlt.iter().zip(&fixtures) {
        assert_abs_diff_eq!(*got, f.mlt, epsilon = ACCURACY);
    }
}

#[test]
fn test_mlt_broadcast_scalar_epoch_and_height() {
    let f = datetime_fixtures()[0];
    let mut state = EngineState::new(ReplayEngine::all());
    let res =
        convert_mlt_with_mean_solar_longitude(&mut state, vec![f.mlon; 10], f.height, f.epoch)
            .unwrap();
    assert_eq!(res.len(), 10);
    for m in &res {
        assert_abs_diff_eq!(m.mlt, f.mlt, epsilon = ACCURACY);
        assert_abs_diff_eq!(m.mean_solar_longitude, f.mslong, epsilon = ACCURACY);
    }
}

#[test]
fn test_state_survives_across_calls() {
    let fixtures = datetime_fixtures();
    let (f97, f04) = (fixtures[2], fixtures[5]);
    let mut state = EngineState::new(ReplayEngine::all());

    convert(&mut state, f97.glat, f97.glon, f97.height, f97.epoch, Direction::GeoToMag).unwrap();
    convert_mlt(&mut state, f97.mlon, f97.height, f97.epoch).unwrap();
    convert(&mut state, f04.glat, f04.glon, f04.height, f04.epoch, Direction::GeoToMag).unwrap();
    convert_mlt(&mut state, f04.mlon, f04.height, f04.epoch).unwrap();

    assert_eq!(state.engine().set_epoch_calls, vec![f97.epoch, f04.epoch]);
    assert_eq!(state.loaded_epoch(), Some(&f04.epoch));
}

#[test]
fn test_unknown_epoch_aborts() {
    let f = datetime_fixtures()[0];
    let mut state = EngineState::new(ReplayEngine::all());
    let unknown = ModelEpoch::from_gregorian(2010, 1, 1, 0, 0, 0).unwrap();

    let res = convert(
        &mut state,
        vec![f.glat, f.glat],
        vec![f.glon, f.glon],
        f.height,
        vec![f.epoch, unknown],
        Direction::GeoToMag,
    );
    assert!(matches!(res, Err(MagCoordsError::InvalidEpoch(_))));
    assert!(state.loaded_epoch().is_none());
    assert_eq!(state.engine().jobs, 1);
}

#[test]
fn test_dipole_engine_batches() {
    let mut state = EngineState::new(DipoleEngine::default());
    let epoch = ModelEpoch::from_gregorian(2014, 3, 22, 3, 11, 0).unwrap();

    let lats: Vec<f64> = (0..9).map(|i| -80.0 + 20.0 * i as f64).collect();
    let lons: Vec<f64> = (0..9).map(|i| -170.0 + 40.0 * i as f64).collect();
    let mag = convert(&mut state, lats.clone(), lons.clone(), 0.0, epoch, Direction::GeoToMag)
        .unwrap();
    let back = convert(
        &mut state,
        mag.iter().map(|p| p.lat).collect::<Vec<_>>(),
        mag.iter().map(|p| p.lon).collect::<Vec<_>>(),
        0.0,
        epoch,
        Direction::MagToGeo,
    )
    .unwrap();

    for ((got, lat), lon) in back.iter().zip(&lats).zip(&lons) {
        assert_abs_diff_eq!(got.lat, *lat, epsilon = 1e-6);
        assert_abs_diff_eq!((got.lon - lon + 540.0).rem_euclid(360.0) - 180.0, 0.0, epsilon = 1e-6);
    }
    assert_eq!(state.reload_count(), 1);

    let mlt = convert_mlt(&mut state, vec![0.0, 90.0, 180.0, 270.0], 350.0, epoch).unwrap();
    assert!(mlt.iter().all(|h| (0.0..24.0).contains(h)));
    // 90° of magnetic longitude is six hours of MLT
    assert_abs_diff_eq!((mlt.as_slice()[1] - mlt.as_slice()[0]).rem_euclid(24.0), 6.0, epsilon = 1e-9);
}
