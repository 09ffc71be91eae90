//! Time and epoch bookkeeping.
//!
//! Two concerns live here:
//!
//! - **Earth rotation**: [`gmst`] turns an absolute date into the Greenwich
//!   Mean Sidereal Time angle, the only time-dependent quantity needed to move
//!   between the inertially-oriented TEME frame and the rotating Earth-fixed
//!   frame (see [`crate::ref_system`]).
//! - **Calendar decomposition**: [`decimal_year`] maps an absolute epoch onto
//!   the fractional-year axis used to select and evaluate a geomagnetic model
//!   epoch (see [`crate::geomag`]).
//!
//! Absolute time is carried as [`hifitime::Epoch`] throughout the crate.

use hifitime::Epoch;

use crate::constants::{DecimalYear, Radian, DPI, MJD, T2000};

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982/2000 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (MJD, UT1 time scale).
///
/// Return
/// ------
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// Remarks
/// -------
/// The GMST is computed in two steps:
/// 1. A cubic polynomial (coefficients C0–C3) gives GMST at 0h UT1
///    in seconds for the given date.
/// 2. The contribution of Earth's rotation during the fractional day is added
///    using the factor `RAP`, which converts solar days to sidereal days.
///
/// UTC is accepted as a stand-in for UT1 here: |UT1 − UTC| < 0.9 s, an angle
/// error well below the positional accuracy of two-line element propagation.
///
/// # References
/// * IAU 1982, IERS Conventions 1996/2000.
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: MJD) -> Radian {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    // Extract the integer MJD (0h UT1) and compute centuries since J2000.0
    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    // GMST at 0h UT1, converted from seconds to radians
    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / 86400.0;

    // Add the rotation during the fraction of the day, scaled to sidereal rate
    let h = tjm.fract() * DPI;
    let gmst = gmst0 + h * RAP;

    // Normalize to [0, 2π); floor rounds toward -inf, so negative angles
    // land in range without further correction
    gmst - (gmst / DPI).floor() * DPI
}

/// Convert an absolute epoch into a decimal year on the civil UTC calendar.
///
/// The fractional part is the position of the calendar day within its year,
/// accounting for leap years: `year + (day_of_year - 1) / (365 | 366)`, where
/// `day_of_year` is 1 for January 1st. Sub-day time is deliberately ignored;
/// geomagnetic model epochs are not meaningful below the day level.
///
/// Arguments
/// ---------
/// * `epoch`: absolute epoch; decomposed on the Gregorian calendar in UTC.
///
/// Return
/// ------
/// * The epoch as a fractional year, e.g. 2013-12-09 → ≈ 2013.937.
pub fn decimal_year(epoch: &Epoch) -> DecimalYear {
    // Cumulative day count at the start of each month (non-leap year)
    const CUMULATIVE_DAYS: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let (year, month, day, ..) = epoch.to_gregorian_utc();
    let leap = is_leap_year(year);

    let mut day_of_year = CUMULATIVE_DAYS[month as usize - 1] + day as u16;
    if leap && month > 2 {
        day_of_year += 1;
    }

    let days_in_year = if leap { 366.0 } else { 365.0 };
    year as f64 + f64::from(day_of_year - 1) / days_in_year
}

/// Gregorian leap-year rule.
pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;
    use hifitime::Epoch;

    #[test]
    fn test_gmst_vallado_reference() {
        // Vallado, "Fundamentals of Astrodynamics", example 3-5:
        // 1992 Aug 20, 12:14:00 UT1 -> GMST = 152.578 788 10 deg
        let tjm = Epoch::from_gregorian_utc(1992, 8, 20, 12, 14, 0, 0).to_mjd_utc_days();
        let theta = gmst(tjm);
        assert_relative_eq!(theta, 152.57878810_f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_gmst_range() {
        for mjd in [40000.0, 51544.5, 56635.1289, 60000.75] {
            let theta = gmst(mjd);
            assert!((0.0..DPI).contains(&theta), "gmst({mjd}) = {theta}");
        }
    }

    #[test]
    fn test_decimal_year_late_2013() {
        // 2013-12-09 is day 343 of a 365-day year
        let epoch = Epoch::from_gregorian_utc(2013, 12, 9, 3, 5, 40, 0);
        let year = decimal_year(&epoch);
        assert!(year > 2013.93 && year < 2013.95, "decimal year = {year}");
        assert_relative_eq!(year, 2013.0 + 342.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decimal_year_boundaries() {
        let jan1 = Epoch::from_gregorian_utc(2014, 1, 1, 0, 0, 0, 0);
        assert_relative_eq!(decimal_year(&jan1), 2014.0, epsilon = 1e-12);

        // 2016 is a leap year: Dec 31 is day 366
        let dec31 = Epoch::from_gregorian_utc(2016, 12, 31, 23, 59, 59, 0);
        assert_relative_eq!(decimal_year(&dec31), 2016.0 + 365.0 / 366.0, epsilon = 1e-12);

        // March 1st of a leap year shifts by the extra February day
        let mar1 = Epoch::from_gregorian_utc(2016, 3, 1, 12, 0, 0, 0);
        assert_relative_eq!(decimal_year(&mar1), 2016.0 + 60.0 / 366.0, epsilon = 1e-12);
    }

    #[test]
    fn test_leap_year_rule() {
        assert!(is_leap_year(2016));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2013));
    }
}
