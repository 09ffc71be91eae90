//! # Constants and type definitions for geomagsat
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `geomagsat` library.
//!
//! ## Overview
//!
//! - Geophysical constants (WGS84 ellipsoid, geomagnetic reference radius)
//! - Unit conversions (days ↔ seconds)
//! - Core type aliases used across the crate
//!
//! These definitions are used by the reference-frame, geodesy and geomagnetic-field modules.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Earth equatorial radius in meters (WGS84 semi-major axis)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 flattening of the reference ellipsoid
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257223563;

/// Earth polar radius in meters, derived from the WGS84 semi-major axis and flattening
pub const EARTH_MINOR_AXIS: f64 = EARTH_MAJOR_AXIS * (1.0 - EARTH_FLATTENING);

/// Mean geomagnetic reference radius in kilometers, used by the spherical-harmonic
/// expansion of the field models (WMM/IGRF convention)
pub const GEOMAG_REFERENCE_RADIUS: f64 = 6_371.2;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Magnetic flux density in nanotesla
pub type Nanotesla = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Calendar epoch expressed as a fractional year (e.g. 2013.937)
pub type DecimalYear = f64;
