//! Fixed-width text table of evaluated field samples.
//!
//! One row per sample: decimal year, geodetic fix, the seven classical field
//! elements. Column widths and precisions are fixed so consumers can slice
//! rows by byte offset.

use std::fmt::Write as _;
use std::fs;

use camino::Utf8Path;
use serde::Deserialize;

use crate::errors::GeomagError;
use crate::sampling::FieldSample;

/// What the Z column of the table carries.
///
/// Historical exports of this table accidentally printed the east component
/// twice, so the Z column duplicated Y. [`ZColumn::LegacyYDuplicate`]
/// reproduces those files byte for byte for consumers that learned to live
/// with the bug; the default prints the true vertical component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZColumn {
    /// Z column carries the vertical (down) component.
    #[default]
    TrueZ,
    /// Z column repeats the east component, matching the historical files.
    LegacyYDuplicate,
}

const HEADER: &str = "\
Date   Alt   Lat   Lon         X         Y         Z         H         F        I       D
        km   deg   deg        nT        nT        nT        nT        nT      deg     deg
";

/// Render the complete table, header included, as one string.
///
/// The altitude column is truncated (not rounded) to whole kilometers.
pub fn render_table(samples: &[FieldSample], z_column: ZColumn) -> String {
    let mut out = String::with_capacity(HEADER.len() + samples.len() * 92);
    out.push_str(HEADER);
    for sample in samples {
        let b = sample.field.b;
        let z = match z_column {
            ZColumn::TrueZ => b.z,
            ZColumn::LegacyYDuplicate => b.y,
        };
        let _ = write!(
            out,
            "{:6.1} {:3} {:5.1} {:5.1} ",
            sample.year,
            sample.fix.altitude.trunc() as i64,
            sample.fix.latitude,
            sample.fix.longitude,
        );
        let _ = write!(
            out,
            "{:9.2} {:9.2} {:9.2} {:9.2} {:9.2} ",
            b.x, b.y, z, sample.field.horizontal_intensity, sample.field.total_intensity,
        );
        let _ = writeln!(
            out,
            "{:8.1} {:7.1}",
            sample.field.inclination, sample.field.declination,
        );
    }
    out
}

/// Render the table and write it to `path`.
///
/// Errors
/// ------
/// * [`GeomagError::OutputIo`] when the file cannot be written.
pub fn write_table(
    path: &Utf8Path,
    samples: &[FieldSample],
    z_column: ZColumn,
) -> Result<(), GeomagError> {
    fs::write(path, render_table(samples, z_column)).map_err(|source| GeomagError::OutputIo {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod output_test {
    use super::*;
    use hifitime::Epoch;
    use nalgebra::Vector3;

    use crate::geodesy::GeodeticFix;
    use crate::geomag::GeoMagneticElements;

    fn sample() -> FieldSample {
        FieldSample {
            epoch: Epoch::from_gregorian_utc(2013, 12, 9, 3, 5, 40, 0),
            year: 2013.9,
            fix: GeodeticFix {
                altitude: 409.87,
                latitude: -14.3,
                longitude: 127.6,
            },
            field: GeoMagneticElements::from_field_vector(Vector3::new(
                31234.56, -1205.44, -18321.99,
            )),
        }
    }

    #[test]
    fn test_header_layout() {
        let table = render_table(&[], ZColumn::TrueZ);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Date   Alt   Lat   Lon"));
        assert!(lines[0].ends_with("I       D"));
        assert!(lines[1].starts_with("        km   deg   deg"));
    }

    #[test]
    fn test_row_format() {
        let table = render_table(&[sample()], ZColumn::TrueZ);
        let row = table.lines().nth(2).unwrap();
        // altitude truncated, not rounded
        assert!(row.starts_with("2013.9 409 -14.3 127.6 "));
        assert!(row.contains(" 31234.56 "));
        assert!(row.contains(" -18321.99 "));
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields.len(), 11);
    }

    #[test]
    fn test_true_z_column() {
        let table = render_table(&[sample()], ZColumn::TrueZ);
        let row = table.lines().nth(2).unwrap();
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields[5], "-1205.44"); // Y
        assert_eq!(fields[6], "-18321.99"); // Z
    }

    #[test]
    fn test_legacy_mode_duplicates_east_component() {
        let table = render_table(&[sample()], ZColumn::LegacyYDuplicate);
        let row = table.lines().nth(2).unwrap();
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields[5], "-1205.44");
        assert_eq!(fields[6], "-1205.44");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let samples = vec![sample(), sample()];
        assert_eq!(
            render_table(&samples, ZColumn::TrueZ),
            render_table(&samples, ZColumn::TrueZ)
        );
    }
}
