//! Fixed-step sampling of a propagated trajectory and field evaluation.
//!
//! The sampling loop walks a time window with a constant step and hands every
//! state to a caller-supplied handler. The window end is always reached: when
//! the span is not an exact multiple of the step, the final sample lands past
//! the requested end rather than short of it.

use hifitime::{Duration, Epoch};
use serde::Deserialize;

use crate::constants::{DecimalYear, SECONDS_PER_DAY};
use crate::errors::GeomagError;
use crate::geodesy::{GeodeticFix, WGS84};
use crate::geomag::{GeoMagneticElements, GeoMagneticModelStore};
use crate::propagation::{Propagator, SpacecraftState};
use crate::time::decimal_year;

/// When the decimal year fed to the field model is computed.
///
/// The model coefficients drift slowly (secular variation of a few nT per
/// year), so over windows of hours the two modes are indistinguishable in the
/// output; per-sample evaluation is the physically faithful choice for long
/// windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecimalYearMode {
    /// Evaluate once at the window start and reuse it for every sample.
    #[default]
    FixedAtStart,
    /// Re-evaluate the decimal year at each sample epoch.
    PerSample,
}

/// One evaluated sample of the output table.
#[derive(Debug, Clone)]
pub struct FieldSample {
    pub epoch: Epoch,
    /// Decimal year used for the field evaluation
    pub year: DecimalYear,
    pub fix: GeodeticFix,
    pub field: GeoMagneticElements,
}

/// Walk `[start, end]` with a constant `timestep` and hand each propagated
/// state to `handler`, together with a flag marking the final sample.
///
/// The number of samples is `ceil((end - start) / timestep) + 1`; with a span
/// that is an exact multiple of the step the last sample falls on `end`
/// exactly, otherwise one fractional step past it. A window with `end ==
/// start` produces a single sample flagged as last.
///
/// Arguments
/// ---------
/// * `timestep`: step in seconds, strictly positive.
///
/// Errors
/// ------
/// * [`GeomagError::Configuration`] when `timestep <= 0` or `end < start`.
/// * Any propagation error, which aborts the walk.
pub fn sample_states<P, F>(
    propagator: &P,
    start: Epoch,
    end: Epoch,
    timestep: f64,
    mut handler: F,
) -> Result<(), GeomagError>
where
    P: Propagator + ?Sized,
    F: FnMut(SpacecraftState, bool) -> Result<(), GeomagError>,
{
    if !(timestep > 0.0) {
        return Err(GeomagError::Configuration(format!(
            "timestep must be strictly positive, got {timestep}"
        )));
    }
    let span = (end - start).to_seconds();
    if span < 0.0 {
        return Err(GeomagError::Configuration(format!(
            "sampling window ends {:.3} s before it starts",
            -span
        )));
    }

    let steps = (span / timestep).ceil() as u64;
    for k in 0..=steps {
        let epoch = start + Duration::from_seconds(k as f64 * timestep);
        let state = propagator.state_at(&epoch)?;
        handler(state, k == steps)?;
    }
    Ok(())
}

/// Convenience wrapper collecting the whole walk into a vector.
pub fn collect_states<P>(
    propagator: &P,
    start: Epoch,
    end: Epoch,
    timestep: f64,
) -> Result<Vec<SpacecraftState>, GeomagError>
where
    P: Propagator + ?Sized,
{
    // No allocation before the window is validated by the walk itself
    let mut states = Vec::new();
    sample_states(propagator, start, end, timestep, |state, _| {
        states.push(state);
        Ok(())
    })?;
    Ok(states)
}

/// Evaluate the geomagnetic field along a list of propagated states.
///
/// Each inertial position is rotated into the Earth-fixed frame at its own
/// epoch, reduced to a geodetic fix on WGS84, and fed to the field model
/// selected (and secular-variation shifted) for the sample's decimal year.
pub fn evaluate_states(
    states: &[SpacecraftState],
    store: &GeoMagneticModelStore,
    mode: DecimalYearMode,
) -> Result<Vec<FieldSample>, GeomagError> {
    let fixed = match (mode, states.first()) {
        (DecimalYearMode::FixedAtStart, Some(first)) => {
            let year = decimal_year(&first.epoch);
            Some((year, store.field_for(year)?))
        }
        _ => None,
    };

    let mut samples = Vec::with_capacity(states.len());
    for state in states {
        let ecef = state.position.to_ecef(&state.epoch);
        let fix = WGS84.transform(&ecef)?;

        let (year, field) = match &fixed {
            Some((year, field)) => (
                *year,
                field.calculate_field(fix.longitude, fix.latitude, fix.altitude)?,
            ),
            None => {
                let year = decimal_year(&state.epoch);
                let model = store.field_for(year)?;
                (
                    year,
                    model.calculate_field(fix.longitude, fix.latitude, fix.altitude)?,
                )
            }
        };

        samples.push(FieldSample {
            epoch: state.epoch,
            year,
            fix,
            field,
        });
    }
    Ok(samples)
}

/// Span of a window in days, for log summaries.
pub fn window_days(start: &Epoch, end: &Epoch) -> f64 {
    (*end - *start).to_seconds() / SECONDS_PER_DAY
}
