//! Orbital-element source.
//!
//! Loads two-line element sets from a plain-text file (optional name lines are
//! tolerated, as produced by Celestrak-style feeds), parses them with the
//! [`sgp4`] crate, and selects the set whose reference epoch is closest to a
//! requested start epoch — the behavior expected when a feed file accumulates
//! several element sets for the same satellite.

use std::fs;

use camino::Utf8Path;
use chrono::{Datelike, Timelike};
use hifitime::Epoch;

use crate::errors::GeomagError;

/// One parsed two-line element set, together with the raw lines it came from
/// (kept for the run summary log).
pub struct ElementSet {
    /// Satellite name, when a name line preceded the element lines
    pub name: Option<String>,
    /// Parsed orbital elements, opaque to the sampling pipeline
    pub elements: sgp4::Elements,
    /// Raw element lines, exactly as read
    pub lines: [String; 2],
}

// The parsed `sgp4::Elements` carry no `Debug` impl; the raw lines identify
// the set just as well.
impl std::fmt::Debug for ElementSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementSet")
            .field("name", &self.name)
            .field("lines", &self.lines)
            .finish()
    }
}

impl ElementSet {
    /// Reference epoch of the element set as an absolute [`Epoch`] (UTC).
    pub fn epoch(&self) -> Epoch {
        let dt = self.elements.datetime;
        Epoch::from_gregorian_utc(
            dt.year(),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond(),
        )
    }

    /// Display label for logs: the name line when present, else the catalog number.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.elements.norad_id.to_string(),
        }
    }
}

/// Read every element set from a TLE file.
///
/// Lines starting with `1 ` and `2 ` are paired into element sets; any other
/// non-empty line immediately preceding a pair is taken as the satellite name.
/// When `satellite` is given, only sets whose name line or catalog number
/// contains it are kept (e.g. `"39412"` or a name fragment).
///
/// Arguments
/// ---------
/// * `path`: TLE file location.
/// * `satellite`: optional name/catalog-number filter.
///
/// Errors
/// ------
/// * [`GeomagError::Io`] if the file cannot be read.
/// * [`GeomagError::InvalidElements`] if a matched pair fails to parse.
/// * [`GeomagError::NoElements`] if no set survives parsing and filtering.
pub fn load_tle_file(
    path: &Utf8Path,
    satellite: Option<&str>,
) -> Result<Vec<ElementSet>, GeomagError> {
    let content = fs::read_to_string(path)?;

    let mut sets = Vec::new();
    let mut pending_name: Option<String> = None;

    let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            let line2 = lines[i + 1];
            let elements =
                sgp4::Elements::from_tle(pending_name.take(), line.as_bytes(), line2.as_bytes())
                    .map_err(|e| GeomagError::InvalidElements(format!("{e:?}")))?;
            sets.push(ElementSet {
                name: elements.object_name.clone(),
                elements,
                lines: [line.to_string(), line2.to_string()],
            });
            i += 2;
        } else {
            pending_name = (!line.is_empty()).then(|| line.trim().to_string());
            i += 1;
        }
    }

    if let Some(filter) = satellite {
        let needle = filter.trim().trim_end_matches('U');
        sets.retain(|set| {
            set.elements.norad_id.to_string() == needle
                || set
                    .name
                    .as_deref()
                    .is_some_and(|name| name.contains(filter.trim()))
        });
    }

    if sets.is_empty() {
        return Err(GeomagError::NoElements(path.to_owned()));
    }
    Ok(sets)
}

/// Select the element set to propagate.
///
/// With a target epoch, the set whose reference epoch is nearest to it wins;
/// without one, the first set of the file is used (its own epoch then becomes
/// the start of the run).
pub fn select<'a>(sets: &'a [ElementSet], target: Option<&Epoch>) -> &'a ElementSet {
    match target {
        Some(t) => sets
            .iter()
            .min_by(|a, b| {
                let da = (a.epoch() - *t).abs();
                let db = (b.epoch() - *t).abs();
                da.cmp(&db)
            })
            .unwrap_or(&sets[0]),
        None => &sets[0],
    }
}
