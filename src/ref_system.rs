//! Reference-frame handling for propagated spacecraft positions.
//!
//! Two-line element propagation delivers positions in **TEME** (True Equator,
//! Mean Equinox), an inertially-oriented frame specific to the SGP4 theory.
//! Ground latitude/longitude only make sense in an **Earth-fixed** rotating
//! frame. Feeding a TEME position straight into an Earth-fixed ellipsoid model
//! silently produces wrong coordinates, not merely imprecise ones, so the two
//! frames are kept apart at the type level:
//!
//! - [`TemePosition`] — inertially-oriented, as delivered by the propagator,
//! - [`EcefPosition`] — Earth-centered Earth-fixed, accepted by the ellipsoid
//!   projection in [`crate::geodesy`].
//!
//! The **only** way to obtain an [`EcefPosition`] from a [`TemePosition`] is
//! [`TemePosition::to_ecef`], which applies the Earth-rotation matrix for the
//! state epoch. Mixing the frames is therefore a compile-time error.

use hifitime::Epoch;
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Kilometer, Radian};
use crate::time::gmst;

/// Position vector in the TEME frame of the SGP4 theory, in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemePosition(pub Vector3<Kilometer>);

/// Position vector in the Earth-centered Earth-fixed rotating frame, in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcefPosition(pub Vector3<Kilometer>);

impl TemePosition {
    /// Rotate this inertially-oriented position into the Earth-fixed frame
    /// valid at `epoch`.
    ///
    /// The rotation angle is the Greenwich Mean Sidereal Time of the epoch;
    /// the TEME definition already refers to the true equator of date, so the
    /// equinox-based GMST rotation is the complete inertial→Earth-fixed step
    /// for SGP4 output (polar motion, a few meters on ground, is ignored).
    ///
    /// Arguments
    /// ---------
    /// * `epoch`: absolute date of the propagated state.
    ///
    /// Return
    /// ------
    /// * The same geometric position expressed as an [`EcefPosition`].
    pub fn to_ecef(&self, epoch: &Epoch) -> EcefPosition {
        let theta = gmst(epoch.to_mjd_utc_days());
        // rotmt(-θ, 2) maps inertial axes onto the frame rotated by +θ about
        // the pole, i.e. inertial → Earth-fixed.
        EcefPosition(rotmt(-theta, 2) * self.0)
    }
}

impl EcefPosition {
    /// Geocentric distance of the position, in kilometers.
    pub fn radius(&self) -> Kilometer {
        self.0.norm()
    }
}

/// Build the rotation matrix around one of the coordinate axes.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in radians.
/// * `k`: axis index — 0 for X, 1 for Y, 2 for Z.
///
/// Return
/// ------
/// * The active rotation matrix `R` such that `R · v` rotates `v` by `alpha`
///   around the selected axis.
///
/// Panics
/// ------
/// * If `k` is not 0, 1 or 2.
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotmt_z_quarter_turn() {
        let rot = rotmt(std::f64::consts::FRAC_PI_2, 2);
        let v = rot * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-15);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-15);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_teme_to_ecef_preserves_norm_and_z() {
        let epoch = Epoch::from_gregorian_utc(2013, 12, 9, 3, 5, 40, 0);
        let teme = TemePosition(Vector3::new(-4400.594, 1932.870, 4760.712));
        let ecef = teme.to_ecef(&epoch);
        // Rotation about the pole: length and polar component are invariant
        assert_relative_eq!(ecef.0.norm(), teme.0.norm(), epsilon = 1e-9);
        assert_relative_eq!(ecef.0.z, teme.0.z, epsilon = 1e-9);
        assert!(ecef.0 != teme.0);
    }

    #[test]
    fn test_teme_to_ecef_matches_explicit_gmst_rotation() {
        let epoch = Epoch::from_gregorian_utc(2000, 1, 1, 12, 0, 0, 0);
        let theta = gmst(epoch.to_mjd_utc_days());
        let teme = TemePosition(Vector3::new(7000.0, 0.0, 0.0));
        let ecef = teme.to_ecef(&epoch);
        assert_relative_eq!(ecef.0.x, 7000.0 * theta.cos(), epsilon = 1e-9);
        assert_relative_eq!(ecef.0.y, -7000.0 * theta.sin(), epsilon = 1e-9);
    }
}
