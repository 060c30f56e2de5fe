#![allow(dead_code)]

use magcoords::constants::{Degree, Kilometer};
use magcoords::engine::{CoordinateEngine, Direction, MagneticLocalTime, MagneticPosition};
use magcoords::magcoords_errors::{MagCoordsError, MagCoordsResult};
use magcoords::time::ModelEpoch;

/// One AACGM-v2 reference conversion.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub epoch: ModelEpoch,
    pub glat: Degree,
    pub glon: Degree,
    pub height: Kilometer,
    pub mlat: Degree,
    pub mlon: Degree,
    pub r: f64,
    pub mlt: f64,
    pub mslong: Degree,
}

fn at(y: i32, mo: u8, d: u8, h: u8, mi: u8) -> ModelEpoch {
    ModelEpoch::from_gregorian(y, mo, d, h, mi, 0).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    epoch: ModelEpoch,
    glat: f64,
    glon: f64,
    height: f64,
    mlat: f64,
    mlon: f64,
    mlt: f64,
    mslong: f64,
) -> Fixture {
    Fixture {
        epoch,
        glat,
        glon,
        height,
        mlat,
        mlon,
        r: 1.0,
        mlt,
        mslong,
    }
}

/// Reference values at full date and time.
pub fn datetime_fixtures() -> Vec<Fixture> {
    vec![
        fixture(at(2014, 3, 22, 3, 11), 45.5, -23.5, 1135.0, 48.377539, 57.822458, 2.092153, -153.559832),
        fixture(at(1997, 3, 22, 3, 11), 45.5, -23.5, 1135.0, 49.425800, 58.259686, 2.121862, -153.568237),
        fixture(at(1997, 3, 22, 3, 11), 65.5, 93.5, 1135.0, 62.251076, 166.990581, 9.370588, -153.568237),
        fixture(at(1997, 3, 22, 3, 11), 65.5, 93.5, 0.0, 60.799240, 166.518084, 9.339088, -153.568237),
        fixture(at(1997, 3, 22, 3, 11), 75.5, 73.5, 0.0, 70.420669, 150.743259, 8.287433, -153.568237),
        fixture(at(2004, 3, 22, 3, 11), 75.5, 73.5, 0.0, 70.726381, 150.672892, 8.338513, -154.404804),
    ]
}

/// Reference values with only the year given, i.e. at January 1st 00:00:00.
///
/// The MLT columns are not used by the year-only calls.
pub fn year_only_fixtures() -> Vec<Fixture> {
    vec![
        fixture(at(2014, 1, 1, 0, 0), 45.5, -23.5, 1135.0, 48.392864, 57.824783, f64::NAN, f64::NAN),
        fixture(at(1997, 1, 1, 0, 0), 45.5, -23.5, 1135.0, 49.438045, 58.272636, f64::NAN, f64::NAN),
        fixture(at(1997, 1, 1, 0, 0), 65.5, 93.5, 1135.0, 62.242400, 166.986299, f64::NAN, f64::NAN),
        fixture(at(1997, 1, 1, 0, 0), 65.5, 93.5, 0.0, 60.789785, 166.513080, f64::NAN, f64::NAN),
        fixture(at(1997, 1, 1, 0, 0), 75.5, 73.5, 0.0, 70.410507, 150.748819, f64::NAN, f64::NAN),
        fixture(at(2004, 1, 1, 0, 0), 75.5, 73.5, 0.0, 70.717087, 150.672864, f64::NAN, f64::NAN),
    ]
}

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Engine replaying reference values.
///
/// It only knows the epochs and positions of its fixtures and fails on anything else, so a
/// converter sending a job at the wrong epoch is caught.
#[derive(Debug)]
pub struct ReplayEngine {
    fixtures: Vec<Fixture>,
    loaded: Option<ModelEpoch>,
    pub set_epoch_calls: Vec<ModelEpoch>,
    pub jobs: usize,
}

impl ReplayEngine {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        ReplayEngine {
            fixtures,
            loaded: None,
            set_epoch_calls: Vec::new(),
            jobs: 0,
        }
    }

    pub fn all() -> Self {
        let mut fixtures = datetime_fixtures();
        fixtures.extend(year_only_fixtures());
        Self::new(fixtures)
    }

    fn loaded_rows(&self) -> MagCoordsResult<impl Iterator<Item = &Fixture> + '_> {
        let epoch = self
            .loaded
            .ok_or_else(|| MagCoordsError::EngineInit("no epoch loaded".into()))?;
        Ok(self.fixtures.iter().filter(move |f| f.epoch == epoch))
    }
}

impl CoordinateEngine for ReplayEngine {
    fn set_epoch(&mut self, epoch: &ModelEpoch) -> MagCoordsResult<()> {
        if !self.fixtures.iter().any(|f| &f.epoch == epoch) {
            return Err(MagCoordsError::InvalidEpoch(format!("no fixture at {epoch}")));
        }
        self.set_epoch_calls.push(*epoch);
        self.loaded = Some(*epoch);
        Ok(())
    }

    fn convert(
        &mut self,
        lat: Degree,
        lon: Degree,
        height: Kilometer,
        direction: Direction,
    ) -> MagCoordsResult<MagneticPosition> {
        self.jobs += 1;
        let found = self.loaded_rows()?.find_map(|f| {
            let matched = match direction {
                Direction::GeoToMag => same(f.glat, lat) && same(f.glon, lon),
                Direction::MagToGeo => same(f.mlat, lat) && same(f.mlon, lon),
            };
            (matched && same(f.height, height)).then_some(*f)
        });

        match (found, direction) {
            (Some(f), Direction::GeoToMag) => Ok(MagneticPosition {
                lat: f.mlat,
                lon: f.mlon,
                r: f.r,
            }),
            (Some(f), Direction::MagToGeo) => Ok(MagneticPosition {
                lat: f.glat,
                lon: f.glon,
                r: f.r,
            }),
            (None, _) => Err(MagCoordsError::ConversionUndefined { lat, lon, height }),
        }
    }

    fn convert_mlt(
        &mut self,
        mlon: Degree,
        height: Kilometer,
    ) -> MagCoordsResult<MagneticLocalTime> {
        self.jobs += 1;
        self.loaded_rows()?
            .find(|f| same(f.mlon, mlon) && same(f.height, height) && !f.mlt.is_nan())
            .map(|f| MagneticLocalTime {
                mlt: f.mlt,
                mean_solar_longitude: f.mslong,
            })
            .ok_or(MagCoordsError::ConversionUndefined {
                lat: f64::NAN,
                lon: mlon,
                height,
            })
    }
}
