//! End-to-end run: element file -> propagation -> geodetic fix -> field
//! evaluation -> rendered table, on the checked-in fixtures.

use camino::Utf8PathBuf;
use hifitime::Duration;

use geomagsat::elements::{load_tle_file, select};
use geomagsat::geomag::GeoMagneticModelStore;
use geomagsat::output::{render_table, write_table, ZColumn};
use geomagsat::propagation::Sgp4Propagator;
use geomagsat::sampling::{collect_states, evaluate_states, DecimalYearMode, FieldSample};

fn data_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

/// Propagate the fixture satellite over its reference window (100 minutes
/// from the element epoch, 20 s step) and evaluate the field.
fn run_pipeline(mode: DecimalYearMode) -> Vec<FieldSample> {
    let sets = load_tle_file(&data_dir().join("geomagsat_test.tle"), None).unwrap();
    let set = select(&sets, None);
    let propagator = Sgp4Propagator::new(set).unwrap();

    let start = set.epoch();
    let end = start + Duration::from_seconds(6000.0);
    let states = collect_states(&propagator, start, end, 20.0).unwrap();

    let store = GeoMagneticModelStore::load_dir(&data_dir()).unwrap();
    evaluate_states(&states, &store, mode).unwrap()
}

#[test]
fn test_row_count_and_epoch_span() {
    let samples = run_pipeline(DecimalYearMode::FixedAtStart);
    assert_eq!(samples.len(), 301);
    let span = (samples[300].epoch - samples[0].epoch).to_seconds();
    assert!((span - 6000.0).abs() < 1e-6, "span = {span}");
}

#[test]
fn test_altitude_stays_in_leo_band() {
    for sample in run_pipeline(DecimalYearMode::FixedAtStart) {
        assert!(
            (400.0..=430.0).contains(&sample.fix.altitude),
            "altitude {} km at {}",
            sample.fix.altitude,
            sample.epoch
        );
    }
}

#[test]
fn test_latitude_bounded_by_inclination() {
    let samples = run_pipeline(DecimalYearMode::FixedAtStart);
    // 51.65 deg inclination, plus the geodetic-geocentric offset
    assert!(samples.iter().all(|s| s.fix.latitude.abs() < 52.1));
    // a 100 minute window covers a full revolution, both hemispheres appear
    assert!(samples.iter().any(|s| s.fix.latitude > 45.0));
    assert!(samples.iter().any(|s| s.fix.latitude < -45.0));
    assert!(samples
        .iter()
        .all(|s| (-180.0..=180.0).contains(&s.fix.longitude)));
}

#[test]
fn test_decimal_year_fixed_at_start() {
    let samples = run_pipeline(DecimalYearMode::FixedAtStart);
    let first = samples[0].year;
    assert!((2013.93..2013.95).contains(&first), "year = {first}");
    assert!(samples.iter().all(|s| s.year == first));
}

#[test]
fn test_decimal_year_per_sample() {
    let samples = run_pipeline(DecimalYearMode::PerSample);
    for pair in samples.windows(2) {
        assert!(pair[1].year >= pair[0].year);
    }
    // 6000 s is well under a day, the column still rounds to one value
    let drift = samples[300].year - samples[0].year;
    assert!(drift < 1e-3, "drift = {drift}");
}

#[test]
fn test_field_magnitudes_plausible() {
    for sample in run_pipeline(DecimalYearMode::FixedAtStart) {
        let f = sample.field.total_intensity;
        assert!((15_000.0..60_000.0).contains(&f), "F = {f} nT");
        let b = sample.field.b;
        let recomputed = (b.x * b.x + b.y * b.y + b.z * b.z).sqrt();
        assert!((f - recomputed).abs() < 1e-6);
        assert!(sample.field.inclination.abs() <= 90.0);
        assert!(sample.field.declination.abs() <= 180.0);
    }
}

#[test]
fn test_rendered_table_shape() {
    let samples = run_pipeline(DecimalYearMode::FixedAtStart);
    let table = render_table(&samples, ZColumn::TrueZ);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 303); // 2 header lines + 301 rows
    assert!(lines[0].starts_with("Date   Alt   Lat   Lon"));
    for row in &lines[2..] {
        assert_eq!(row.split_whitespace().count(), 11, "row: {row}");
        assert!(row.starts_with("2013.9"));
    }
    // rendering is pure
    assert_eq!(table, render_table(&samples, ZColumn::TrueZ));
}

#[test]
fn test_legacy_z_column_differs_from_default() {
    let samples = run_pipeline(DecimalYearMode::FixedAtStart);
    let true_z = render_table(&samples, ZColumn::TrueZ);
    let legacy = render_table(&samples, ZColumn::LegacyYDuplicate);
    assert_ne!(true_z, legacy);
    for row in legacy.lines().skip(2) {
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields[5], fields[6]);
    }
}

#[test]
fn test_write_table_round_trip() {
    let samples = run_pipeline(DecimalYearMode::FixedAtStart);
    let dir = Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
    let path = dir.join("geomagsat_pipeline_test.txt");
    write_table(&path, &samples, ZColumn::TrueZ).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, render_table(&samples, ZColumn::TrueZ));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_window_shorter_than_step() {
    let sets = load_tle_file(&data_dir().join("geomagsat_test.tle"), None).unwrap();
    let set = select(&sets, None);
    let propagator = Sgp4Propagator::new(set).unwrap();
    let start = set.epoch();
    let end = start + Duration::from_seconds(10.0);
    let states = collect_states(&propagator, start, end, 20.0).unwrap();
    // one step overshooting the end, plus the start sample
    assert_eq!(states.len(), 2);
    assert!(((states[1].epoch - start).to_seconds() - 20.0).abs() < 1e-9);
}
