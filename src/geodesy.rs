//! Geodetic projection onto the WGS84 reference ellipsoid.
//!
//! Converts an Earth-fixed position (see [`crate::ref_system`]) into a
//! [`GeodeticFix`] — altitude above the ellipsoid, geodetic latitude and
//! longitude. The projection accounts for Earth's oblateness through the full
//! ellipsoid model; a flat-sphere arctangent shortcut would silently break
//! near the poles and near-circular geometries, so no such shortcut exists
//! here.
//!
//! ## Units
//!
//! The projection works internally in meters and radians (the ellipsoid's
//! native units) and reports kilometers and degrees, matching the output
//! table of the sampling pipeline.

use nalgebra::Vector3;

use crate::constants::{Degree, Kilometer, Meter, EARTH_FLATTENING, EARTH_MAJOR_AXIS};
use crate::errors::GeomagError;
use crate::ref_system::EcefPosition;

/// Reference ellipsoid defined by its equatorial radius and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major (equatorial) axis in meters
    pub equatorial_radius: Meter,
    /// Flattening `f = (a - b) / a`
    pub flattening: f64,
}

/// The WGS84 geodetic datum.
pub const WGS84: Ellipsoid = Ellipsoid {
    equatorial_radius: EARTH_MAJOR_AXIS,
    flattening: EARTH_FLATTENING,
};

/// Geodetic coordinates of one spacecraft sample.
///
/// Derived from exactly one Earth-fixed position, consumed by the field model
/// evaluation, then discarded — it is never retained across samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticFix {
    /// Altitude above the reference ellipsoid, in kilometers
    pub altitude: Kilometer,
    /// Geodetic latitude in degrees, positive north
    pub latitude: Degree,
    /// Longitude in degrees, positive east
    pub longitude: Degree,
}

impl Ellipsoid {
    /// First eccentricity squared, `e² = f (2 - f)`.
    pub fn eccentricity_squared(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Project an Earth-fixed position onto the ellipsoid.
    ///
    /// The geodetic latitude is found by the classical fixed-point iteration
    /// on `φ = atan2(z + e² N(φ) sin φ, p)`, which behaves correctly at the
    /// poles (`p → 0`) and across the anti-meridian, then the altitude is
    /// recovered from the converged latitude. The position handed in is
    /// Earth-fixed **by type**: the inertial→Earth-fixed rotation has already
    /// been performed upstream and cannot be skipped.
    ///
    /// Arguments
    /// ---------
    /// * `position`: Earth-fixed position in kilometers.
    ///
    /// Return
    /// ------
    /// * The [`GeodeticFix`] of the position (km / degrees).
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::Transform`] if the position is degenerate (at the
    ///   geocenter) or the iteration fails to converge.
    pub fn transform(&self, position: &EcefPosition) -> Result<GeodeticFix, GeomagError> {
        const MAX_ITERATIONS: usize = 50;
        // Convergence threshold on latitude, radians (≈ 6 µm on ground)
        const TOLERANCE: f64 = 1e-12;

        let meters: Vector3<Meter> = position.0 * 1000.0;
        let (x, y, z) = (meters.x, meters.y, meters.z);

        let p = x.hypot(y);
        let r = p.hypot(z);
        if r < 1.0 {
            return Err(GeomagError::Transform(format!(
                "degenerate position vector (|r| = {r:.3e} m)"
            )));
        }

        let a = self.equatorial_radius;
        let e2 = self.eccentricity_squared();
        let lon = y.atan2(x);

        // Initial guess: geocentric latitude corrected for oblateness
        let mut lat = z.atan2(p * (1.0 - e2));

        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let sin_lat = lat.sin();
            let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            let next = (z + e2 * n * sin_lat).atan2(p);
            if (next - lat).abs() < TOLERANCE {
                lat = next;
                converged = true;
                break;
            }
            lat = next;
        }
        if !converged {
            return Err(GeomagError::Transform(format!(
                "ellipsoid projection did not converge for |r| = {:.3} km",
                r / 1000.0
            )));
        }

        // Pole-safe altitude: valid for any latitude once φ has converged
        let sin_lat = lat.sin();
        let altitude = p * lat.cos() + z * sin_lat - a * (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Ok(GeodeticFix {
            altitude: altitude / 1000.0,
            latitude: lat.to_degrees(),
            longitude: lon.to_degrees(),
        })
    }

    /// Inverse of [`Ellipsoid::transform`]: build the Earth-fixed position of
    /// a geodetic point. Used to validate the projection by round-trip.
    ///
    /// Arguments
    /// ---------
    /// * `latitude`, `longitude`: geodetic coordinates in degrees.
    /// * `altitude`: height above the ellipsoid in kilometers.
    pub fn position_of(
        &self,
        latitude: Degree,
        longitude: Degree,
        altitude: Kilometer,
    ) -> EcefPosition {
        let lat = latitude.to_radians();
        let lon = longitude.to_radians();
        let h = altitude * 1000.0;
        let e2 = self.eccentricity_squared();

        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = self.equatorial_radius / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        let x = (n + h) * cos_lat * lon.cos();
        let y = (n + h) * cos_lat * lon.sin();
        let z = (n * (1.0 - e2) + h) * sin_lat;

        EcefPosition(Vector3::new(x, y, z) / 1000.0)
    }
}
