//! # magcoords
//!
//! Batched front-ends to geomagnetic coordinate models:
//!
//! - [`aacgm`]: geographic ↔ magnetic conversion and magnetic local time over batches, with
//!   the model epoch cached in an [`env_state::EngineState`] so coefficients are only reloaded
//!   when the epoch changes;
//! - [`legacy`]: the older epoch conventions (year only, calendar fields, Unix seconds, year
//!   plus seconds) on top of [`aacgm`];
//! - [`trace`]: field-line tracing from a set of start points to both hemispheres.
//!
//! The numerical models sit behind the [`engine::CoordinateEngine`] and
//! [`engine::FieldLineEngine`] traits. Centered-dipole implementations of both ship with the
//! crate ([`engine::dipole`], [`engine::tracer`]).
pub mod aacgm;
pub mod batch;
pub mod constants;
pub mod engine;
pub mod env_state;
pub mod legacy;
pub mod magcoords_errors;
pub mod solar;
pub mod time;
pub mod trace;
