use clap::Parser;
use geomag::location::geoid::UndulationGrid;
use geomag::model::coefficients::{CoefficientSet, ModelSource};
use geomag::model::evaluate_with;
use geomag::utils::angles::Dms;
use geomag::utils::logging::init_logging;
use geomag::utils::parsing::{parse_altitude, parse_lat_lng, parse_time};
use geomag::{EvaluationOptions, HeightReference, Location};
use std::path::PathBuf;

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
#[command(author, version, about = "Reports the magnetic field at a single point", long_about = None)]
struct Args {
    /// Latitude, north positive: decimal degrees (30.508) or D, M, S ("30, 30, 30")
    #[arg(allow_hyphen_values = true)]
    latitude: String,

    /// Longitude, east positive: decimal degrees (-100.5) or D, M, S ("-100, 30, 0")
    #[arg(allow_hyphen_values = true)]
    longitude: String,

    /// Height above mean sea level in kilometres; prefix with E for height above the WGS-84
    /// ellipsoid (E20.1)
    #[arg(allow_hyphen_values = true)]
    altitude: String,

    /// Decimal year (2022.5) or calendar date (MM DD YYYY or MM/DD/YYYY)
    #[arg()]
    date: String,

    /// COF coefficients file to use instead of the built-in model
    #[arg(short, long)]
    cof_file: Option<PathBuf>,

    /// Geoid undulation grid to use instead of the built-in one
    #[arg(long)]
    geoid_file: Option<PathBuf>,

    /// Output spherical values instead of ellipsoidal
    #[arg(short, long)]
    spherical: bool,

    /// Refuse to extrapolate outside the model validity window
    #[arg(long)]
    strict: bool,
}

fn bin_main() -> BinResult<()> {
    init_logging();
    let args = Args::parse();

    let latitude = parse_lat_lng(&args.latitude)?;
    let longitude = parse_lat_lng(&args.longitude)?;
    let (altitude, height_reference) = parse_altitude(&args.altitude)?;
    let time = parse_time(&args.date)?;

    let loaded_model;
    let model = match args.cof_file {
        Some(path) => {
            loaded_model = CoefficientSet::load(&ModelSource::File(path))?;
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

    let (location, gap) = match height_reference {
        HeightReference::Ellipsoid => (
            Location::from_geodetic(latitude, longitude, altitude)?,
            None,
        ),
        HeightReference::MeanSeaLevel => {
            Location::from_mean_sea_level_with(geoid, latitude, longitude, altitude)?
        }
    };
    let options = EvaluationOptions {
        strict_validity: args.strict,
    };
    let field = evaluate_with(model, &location, time, &options)?.with_coverage_gap(gap);

    match model.release_date() {
        Some(date) => println!(
            "Model: {}, Epoch: {}, Released: {}",
            model.name(),
            model.epoch(),
            date.format("%m/%d/%Y")
        ),
        None => println!("Model: {}, Epoch: {}", model.name(), model.epoch()),
    }
    println!();
    println!("Results For");
    println!();

    let (lat, lng, height) = location.geodetic();
    let (quantity, qualifier) = if lat < 0.0 { (-lat, "S") } else { (lat, "N") };
    println!("Latitude:\t{quantity:4.2}{qualifier}");
    let (quantity, qualifier) = if lng >= 180.0 {
        (360.0 - lng, "W")
    } else {
        (lng, "E")
    };
    println!("Longitude:\t{quantity:4.2}{qualifier}");

    let (quantity, reference) = match height_reference {
        HeightReference::Ellipsoid => (height, "the WGS-84 ellipsoid"),
        HeightReference::MeanSeaLevel => {
            (location.height_above_msl_with(geoid).0, "mean sea level")
        }
    };
    let relationship = if quantity < 0.0 { "below" } else { "above" };
    println!(
        "Altitude:\t{:6.3} kilometers {relationship} {reference}",
        quantity.abs() / 1000.0
    );
    println!("Date:\t\t{time}");
    println!();

    let frame = if args.spherical { "(Spherical)" } else { "" };
    let (x, y, z, dx, dy, dz) = if args.spherical {
        field.spherical()
    } else {
        field.ellipsoidal()
    };
    println!("       Main Field             Secular Change");
    println!(
        "F    = {:8.1} nT ± {:5.1} nT  {:6.1} nT/yr",
        field.f(),
        field.err_f(),
        field.df()
    );
    if !args.spherical {
        println!(
            "H    = {:8.1} nT ± {:5.1} nT  {:6.1} nT/yr",
            field.h(),
            field.err_h(),
            field.dh()
        );
    }
    println!("X    = {x:8.1} nT ± {:5.1} nT  {dx:6.1} nT/yr {frame}", field.err_x());
    println!("Y    = {y:8.1} nT ± {:5.1} nT  {dy:6.1} nT/yr {frame}", field.err_y());
    println!("Z    = {z:8.1} nT ± {:5.1} nT  {dz:6.1} nT/yr {frame}", field.err_z());
    if !args.spherical {
        let declination = Dms::from_degrees(field.d());
        let inclination = Dms::from_degrees(field.i());
        println!(
            "Decl =    {:3.0}º {:2.0}' ± {:2.0}'         {:4.1}'/yr",
            declination.degrees,
            declination.minutes + declination.seconds / 60.0,
            field.err_d() * 60.0,
            field.dd() * 60.0
        );
        println!(
            "Incl =    {:3.0}º {:2.0}' ± {:2.0}'         {:4.1}'/yr",
            inclination.degrees,
            inclination.minutes + inclination.seconds / 60.0,
            field.err_i() * 60.0,
            field.di() * 60.0
        );
        if field.grid_variation_applies() {
            let grid_variation = Dms::from_degrees(field.gv());
            println!();
            println!(
                "Grid Variation =  {:2.0}º {:2.0}' ± {:2.0}'",
                grid_variation.degrees,
                grid_variation.minutes + grid_variation.seconds / 60.0,
                field.err_gv() * 60.0
            );
        }
    }

    let warnings = field.warnings();
    if !warnings.is_empty() {
        println!();
    }
    for warning in warnings {
        println!("Warning: {warning}");
    }
    Ok(())
}
