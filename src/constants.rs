//! # Constants and type definitions for magcoords
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `magcoords` library.
//!
//! ## Overview
//!
//! - Geophysical constants (Earth radius used by the magnetospheric models)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds, MLT hours ↔ degrees)
//! - Core type aliases used across the crate
//!
//! These definitions are used by the converters, the legacy adapters, the field-line tracer,
//! and the built-in engines.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00)
pub const T2000: f64 = 51544.5;

/// Julian Day of J2000.0
pub const J2000: f64 = 2_451_545.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Earth radius in kilometers, as used by the Tsyganenko and AACGM models
pub const EARTH_RADIUS_KM: f64 = 6371.2;

/// Degrees of longitude per hour of local time
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// Height (km) assumed by the legacy MLT adapters when none is given
pub const DEFAULT_MLT_HEIGHT_KM: f64 = 350.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in Earth radii (see [`EARTH_RADIUS_KM`])
pub type EarthRadii = f64;
/// Local time in hours
pub type Hour = f64;
/// Julian Day
pub type JulianDay = f64;
