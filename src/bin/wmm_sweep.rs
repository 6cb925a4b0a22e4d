use clap::Parser;
use geomag::location::geoid::UndulationGrid;
use geomag::model::coefficients::CoefficientSet;
use geomag::sweep::{par_sweep, sweep, SweepConfig, SweepRange};
use geomag::utils::logging::init_logging;
use geomag::utils::parsing::{parse_altitude, parse_time};
use geomag::EvaluationOptions;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {e}");
        if let Some(e) = e.source() {
            eprintln!("error: {e}")
        }
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Evaluates the magnetic field over a latitude/longitude grid and writes a JSON dataset", long_about = None)]
struct Args {
    /// Output dataset path
    #[arg(default_value = "equatorDataset.json")]
    outfile: PathBuf,

    /// Decimal year (2022.5) or calendar date (MM DD YYYY or MM/DD/YYYY)
    #[arg(short, long)]
    date: String,

    /// First latitude, degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    lat_start: f64,

    /// Latitude to stop before, degrees. Defaults to a single latitude.
    #[arg(long, allow_hyphen_values = true)]
    lat_stop: Option<f64>,

    /// Latitude step, degrees
    #[arg(long, default_value_t = 1.0)]
    lat_step: f64,

    /// First longitude, degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    lon_start: f64,

    /// Longitude to stop before, degrees
    #[arg(long, default_value_t = 360.0, allow_hyphen_values = true)]
    lon_stop: f64,

    /// Longitude step, degrees
    #[arg(long, default_value_t = 0.001)]
    lon_step: f64,

    /// Height above mean sea level in kilometres; prefix with E for height above the WGS-84
    /// ellipsoid (E20.1)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    altitude: String,

    /// COF coefficients file to use instead of the built-in model
    #[arg(short, long)]
    cof_file: Option<PathBuf>,

    /// Geoid undulation grid to use instead of the built-in one
    #[arg(long)]
    geoid_file: Option<PathBuf>,

    /// Output spherical values instead of ellipsoidal
    #[arg(short, long)]
    spherical: bool,

    /// Also write the secular variation columns dbx, dby and dbz
    #[arg(long)]
    secular_variation: bool,

    /// Also write the declination, inclination and total_intensity columns
    #[arg(long)]
    elements: bool,

    /// Skip points outside the model validity window instead of extrapolating
    #[arg(long)]
    strict: bool,

    /// Evaluate on a single thread
    #[arg(long)]
    serial: bool,
}

fn bin_main() -> BinResult<()> {
    init_logging();
    let args = Args::parse();

    let (altitude, height_reference) = parse_altitude(&args.altitude)?;
    let config = SweepConfig {
        latitude: match args.lat_stop {
            Some(stop) => SweepRange::new(args.lat_start, stop, args.lat_step),
            None => SweepRange::single(args.lat_start),
        },
        longitude: SweepRange::new(args.lon_start, args.lon_stop, args.lon_step),
        altitude,
        height_reference,
        time: parse_time(&args.date)?,
        spherical: args.spherical,
        secular_variation: args.secular_variation,
        elements: args.elements,
        options: EvaluationOptions {
            strict_validity: args.strict,
        },
    };

    let loaded_model;
    let model = match args.cof_file {
        Some(path) => {
            loaded_model = CoefficientSet::from_file(path)?;
            &loaded_model
        }
        None => CoefficientSet::built_in()?,
    };
    let loaded_geoid;
    let geoid = match args.geoid_file {
        Some(path) => {
            loaded_geoid = UndulationGrid::from_file(path)?;
            &loaded_geoid
        }
        None => UndulationGrid::built_in()?,
    };
    info!(
        "Model {}, epoch {}, valid until {}; sweeping {} points at {}",
        model.name(),
        model.epoch(),
        model.valid_until(),
        config.len(),
        config.time
    );

    let start = Instant::now();
    let outcome = if args.serial {
        sweep(model, geoid, &config)?
    } else {
        par_sweep(model, geoid, &config)?
    };
    info!("Evaluated in {:.2?}", start.elapsed());

    outcome.dataset.write_json(&args.outfile)?;
    info!(
        "Wrote {} points to {}",
        outcome.dataset.len(),
        args.outfile.display()
    );
    if !outcome.failures.is_empty() {
        eprintln!(
            "{} of {} points could not be evaluated",
            outcome.failures.len(),
            config.len()
        );
    }
    Ok(())
}
