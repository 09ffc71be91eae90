use std::env;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use hifitime::Duration;
use log::{error, info};

use geomagsat::config::{parse_utc_epoch, Config};
use geomagsat::elements::{load_tle_file, select};
use geomagsat::errors::GeomagError;
use geomagsat::geomag::GeoMagneticModelStore;
use geomagsat::output::write_table;
use geomagsat::propagation::Sgp4Propagator;
use geomagsat::sampling::{collect_states, evaluate_states, window_days};

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GeomagError> {
    let config_path = env::args()
        .nth(1)
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| Utf8PathBuf::from("geomagsat.json"));
    let config = Config::from_file(&config_path)?;

    let requested_start = config.start.as_deref().map(parse_utc_epoch).transpose()?;
    let sets = load_tle_file(&config.tle_path(), config.satellite.as_deref())?;
    let set = select(&sets, requested_start.as_ref());
    let start = requested_start.unwrap_or_else(|| set.epoch());
    let end = start + Duration::from_seconds(config.duration);

    info!("propagating {}", set.label());
    info!(
        "window {start} .. {end} ({:.4} d), step {} s",
        window_days(&start, &end),
        config.timestep
    );

    let store = GeoMagneticModelStore::load_dir(&config.geomag_data_dir)?;
    let propagator = Sgp4Propagator::new(set)?;
    let states = collect_states(&propagator, start, end, config.timestep)?;
    let samples = evaluate_states(&states, &store, config.decimal_year)?;
    let output = config.output_path();
    write_table(&output, &samples, config.z_column)?;
    info!("wrote {} rows to {output}", samples.len());
    Ok(())
}
