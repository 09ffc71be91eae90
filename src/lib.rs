//! Geomagnetic field sampling along a satellite orbit.
//!
//! The crate propagates a spacecraft from a two-line element set over a fixed
//! time window, turns every inertial state into a geodetic fix on WGS84, and
//! evaluates a spherical-harmonic geomagnetic model there. The result is a
//! fixed-width text table of the classical field elements (X, Y, Z, H, F,
//! inclination, declination) along the trajectory.
//!
//! The pipeline, module by module:
//!
//! 1. [`elements`] reads and selects the element set,
//! 2. [`propagation`] advances it to each sample epoch (inertial frame),
//! 3. [`ref_system`] rotates the position into the Earth-fixed frame,
//! 4. [`geodesy`] projects it onto the WGS84 ellipsoid,
//! 5. [`geomag`] evaluates the field model at the geodetic fix,
//! 6. [`sampling`] drives the walk and [`output`] renders the table.

pub mod config;
pub mod constants;
pub mod elements;
pub mod errors;
pub mod geodesy;
pub mod geomag;
pub mod output;
pub mod propagation;
pub mod ref_system;
pub mod sampling;
pub mod time;
