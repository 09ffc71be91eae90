//! Orbit propagation seam.
//!
//! The sampling pipeline never talks to an orbit theory directly — it drives
//! anything implementing [`Propagator`], which produces one immutable
//! [`SpacecraftState`] per requested epoch. The production implementation,
//! [`Sgp4Propagator`], wraps the SGP4 analytical theory of the [`sgp4`] crate;
//! tests substitute simpler implementations to exercise the stepping contract
//! in isolation.

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::elements::ElementSet;
use crate::errors::GeomagError;
use crate::ref_system::TemePosition;

/// One propagated sample: an epoch plus the spacecraft position and velocity
/// in the TEME frame of the SGP4 theory. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacecraftState {
    /// Absolute date of the sample
    pub epoch: Epoch,
    /// Position in TEME, kilometers
    pub position: TemePosition,
    /// Velocity in TEME, kilometers per second
    pub velocity: Vector3<f64>,
}

/// Interface the sampling pipeline consumes: a state for any requested epoch.
///
/// Requests arrive in strictly increasing epoch order. A failure aborts the
/// whole run; there is no retry or partial-success mode.
pub trait Propagator {
    /// Produce the spacecraft state at `epoch`.
    fn state_at(&self, epoch: &Epoch) -> Result<SpacecraftState, GeomagError>;
}

/// SGP4 propagation from a two-line element set.
pub struct Sgp4Propagator {
    constants: sgp4::Constants,
    reference_epoch: Epoch,
}

impl Sgp4Propagator {
    /// Initialize the SGP4 constants for one element set.
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::InvalidElements`] when the element set is not usable
    ///   by the SGP4 theory (e.g. deep-space elements out of range).
    pub fn new(set: &ElementSet) -> Result<Self, GeomagError> {
        let constants = sgp4::Constants::from_elements(&set.elements)
            .map_err(|e| GeomagError::InvalidElements(format!("{e:?}")))?;
        Ok(Self {
            constants,
            reference_epoch: set.epoch(),
        })
    }

    /// Reference epoch of the underlying element set.
    pub fn reference_epoch(&self) -> Epoch {
        self.reference_epoch
    }
}

impl Propagator for Sgp4Propagator {
    fn state_at(&self, epoch: &Epoch) -> Result<SpacecraftState, GeomagError> {
        let minutes = (*epoch - self.reference_epoch).to_seconds() / 60.0;
        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| GeomagError::Propagation(format!("{e:?}")))?;

        Ok(SpacecraftState {
            epoch: *epoch,
            position: TemePosition(Vector3::new(
                prediction.position[0],
                prediction.position[1],
                prediction.position[2],
            )),
            velocity: Vector3::new(
                prediction.velocity[0],
                prediction.velocity[1],
                prediction.velocity[2],
            ),
        })
    }
}
