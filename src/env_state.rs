//! # Engine state
//!
//! This module defines [`crate::env_state::EngineState`], the **state holder** passed to every
//! converter of the crate. It owns:
//!
//! - the [`CoordinateEngine`] doing the actual conversions,
//! - the epoch whose coefficients the engine currently has loaded,
//! - a counter of coefficient reloads.
//!
//! ## Overview
//!
//! Loading model coefficients for an epoch is orders of magnitude more expensive than a single
//! conversion. `EngineState` is a one-slot cache in front of that reload:
//!
//! ```text
//! EngineState
//! ├── engine   (E: CoordinateEngine)
//! ├── loaded   (Option<ModelEpoch>, None until the first job)
//! └── reloads  (number of set_epoch calls issued)
//! ```
//!
//! [`EngineState::ensure_epoch`] forwards to [`CoordinateEngine::set_epoch`] only when the
//! requested epoch differs from the loaded one. Equality is exact, at second resolution.
//!
//! ## Usage
//!
//! ```rust
//! use magcoords::env_state::EngineState;
//! use magcoords::engine::dipole::DipoleEngine;
//! use magcoords::time::ModelEpoch;
//!
//! let mut state = EngineState::new(DipoleEngine::default());
//! let epoch = ModelEpoch::from_gregorian(2014, 3, 22, 3, 11, 0).unwrap();
//!
//! assert!(state.ensure_epoch(&epoch).unwrap());
//! assert!(!state.ensure_epoch(&epoch).unwrap());
//! assert_eq!(state.reload_count(), 1);
//! ```
//!
//! ## Notes
//!
//! - One `EngineState` is meant to be reused by every converter call of a session
//!   (coordinate, MLT and legacy calls alike), so consecutive batches at the same epoch never
//!   reload.
//! - Converters take `&mut EngineState<E>`. Sharing one engine across threads means wrapping
//!   the state in a `Mutex`.
use tracing::debug;

use crate::engine::CoordinateEngine;
use crate::magcoords_errors::MagCoordsResult;
use crate::time::ModelEpoch;

#[derive(Debug, Clone)]
pub struct EngineState<E> {
    engine: E,
    loaded: Option<ModelEpoch>,
    reloads: usize,
}

impl<E: CoordinateEngine + Default> Default for EngineState<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

impl<E: CoordinateEngine> EngineState<E> {
    /// Wrap an engine. No epoch is considered loaded, whatever the engine's own state.
    pub fn new(engine: E) -> Self {
        EngineState {
            engine,
            loaded: None,
            reloads: 0,
        }
    }

    /// Make sure `epoch` is the loaded epoch.
    ///
    /// Return
    /// ----------
    /// * `true` if the engine had to reload, `false` if `epoch` was already loaded.
    ///   A failed reload leaves no epoch loaded, so the next call retries.
    pub fn ensure_epoch(&mut self, epoch: &ModelEpoch) -> MagCoordsResult<bool> {
        if self.loaded.as_ref() == Some(epoch) {
            return Ok(false);
        }

        self.loaded = None;
        self.engine.set_epoch(epoch)?;
        self.loaded = Some(*epoch);
        self.reloads += 1;

        debug!(epoch = %epoch, reloads = self.reloads, "engine epoch reloaded");
        Ok(true)
    }

    pub fn loaded_epoch(&self) -> Option<&ModelEpoch> {
        self.loaded.as_ref()
    }

    /// Number of coefficient reloads issued since creation.
    pub fn reload_count(&self) -> usize {
        self.reloads
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

#[cfg(test)]
mod env_state_test {
    use super::*;
    use crate::unit_test_global::RecordingEngine;

    fn epoch(hour: u8) -> ModelEpoch {
        ModelEpoch::from_gregorian(2014, 3, 22, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_first_job_loads() {
        let mut state = EngineState::new(RecordingEngine::default());
        assert!(state.loaded_epoch().is_none());

        assert!(state.ensure_epoch(&epoch(1)).unwrap());
        assert_eq!(state.loaded_epoch(), Some(&epoch(1)));
        assert_eq!(state.engine().set_epoch_calls, vec![epoch(1)]);
    }

    #[test]
    fn test_reload_only_on_change() {
        let mut state = EngineState::new(RecordingEngine::default());
        for e in [epoch(1), epoch(1), epoch(2), epoch(1), epoch(1)] {
            state.ensure_epoch(&e).unwrap();
        }
        assert_eq!(state.reload_count(), 3);
        assert_eq!(
            state.engine().set_epoch_calls,
            vec![epoch(1), epoch(2), epoch(1)]
        );
    }

    #[test]
    fn test_one_second_apart_reloads() {
        let mut state = EngineState::new(RecordingEngine::default());
        let a = ModelEpoch::from_gregorian(2014, 3, 22, 3, 11, 0).unwrap();
        let b = ModelEpoch::from_gregorian(2014, 3, 22, 3, 11, 1).unwrap();
        state.ensure_epoch(&a).unwrap();
        assert!(state.ensure_epoch(&b).unwrap());
        assert_eq!(state.reload_count(), 2);
    }

    #[test]
    fn test_failed_reload_clears_loaded_epoch() {
        let mut state = EngineState::new(RecordingEngine::failing_on(epoch(2)));
        state.ensure_epoch(&epoch(1)).unwrap();
        assert!(state.ensure_epoch(&epoch(2)).is_err());
        assert!(state.loaded_epoch().is_none());

        // retried, not served from the cache
        assert!(state.ensure_epoch(&epoch(1)).unwrap());
        assert_eq!(state.reload_count(), 2);
    }
}
