//! Evaluation of the field over a regular latitude/longitude grid, collected into a dataset.
use crate::location::geoid::UndulationGrid;
use crate::location::{HeightReference, Location};
use crate::model::coefficients::CoefficientSet;
use crate::model::error::EvaluationError;
use crate::model::field::MagneticField;
use crate::model::{evaluate_with, EvaluationOptions};
use crate::sweep::dataset::{Column, Dataset, SweepPoint};
use crate::sweep::error::{PointFailure, SweepError};
use crate::time::DecimalYear;
use itertools::{Either, Itertools};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, warn};

pub mod dataset;
pub mod error;

type Result<T> = std::result::Result<T, SweepError>;
type PointResult = std::result::Result<MagneticField, EvaluationError>;

/// Largest grid a single sweep will evaluate
pub const MAX_SWEEP_POINTS: usize = 100_000_000;

/// Evenly spaced values from `start` up to but excluding `stop`. Always yields `start`, so a
/// range with `stop <= start` is a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn new(start: f64, stop: f64, step: f64) -> SweepRange {
        SweepRange { start, stop, step }
    }

    /// A range holding one value
    pub fn single(value: f64) -> SweepRange {
        SweepRange {
            start: value,
            stop: value,
            step: 1.0,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.start.is_finite() && self.stop.is_finite()) {
            return Err(SweepError::Config(format!("{name} range bounds must be finite")));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(SweepError::Config(format!(
                "{name} step {} must be positive",
                self.step
            )));
        }
        let count = self.count();
        if !(count.is_finite() && count <= MAX_SWEEP_POINTS as f64) {
            return Err(SweepError::Config(format!(
                "{name} step {} gives more than {MAX_SWEEP_POINTS} values",
                self.step
            )));
        }
        Ok(())
    }

    fn count(&self) -> f64 {
        let span = (self.stop - self.start) / self.step;
        // Values within rounding of `stop` are excluded
        (span - 1e-9).ceil().max(1.0)
    }

    /// Number of values in the range
    pub fn len(&self) -> usize {
        self.count() as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The i-th value, computed directly so that steps do not accumulate rounding
    pub fn value(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }
}

/// Everything that defines a sweep over a grid of points
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub latitude: SweepRange,
    pub longitude: SweepRange,
    /// Height of every point, metres
    pub altitude: f64,
    pub height_reference: HeightReference,
    pub time: DecimalYear,
    /// Write components in the geocentric spherical frame instead of the ellipsoidal frame
    pub spherical: bool,
    /// Add the dbx, dby and dbz columns
    pub secular_variation: bool,
    /// Add the declination, inclination and total_intensity columns
    pub elements: bool,
    pub options: EvaluationOptions,
}

impl SweepConfig {
    /// Once around the equator at sea level in steps of a thousandth of a degree
    pub fn equator(time: DecimalYear) -> SweepConfig {
        SweepConfig {
            latitude: SweepRange::single(0.0),
            longitude: SweepRange::new(0.0, 360.0, 0.001),
            altitude: 0.0,
            height_reference: HeightReference::MeanSeaLevel,
            time,
            spherical: false,
            secular_variation: false,
            elements: false,
            options: EvaluationOptions::default(),
        }
    }

    /// Total number of grid points, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        self.latitude.len().saturating_mul(self.longitude.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (latitude, longitude) of the i-th point, latitude-major
    pub fn point(&self, i: usize) -> (f64, f64) {
        let columns = self.longitude.len();
        (
            self.latitude.value(i / columns),
            self.longitude.value(i % columns),
        )
    }

    fn validate(&self) -> Result<()> {
        self.latitude.validate("Latitude")?;
        self.longitude.validate("Longitude")?;
        match self.latitude.len().checked_mul(self.longitude.len()) {
            Some(total) if total <= MAX_SWEEP_POINTS => {}
            _ => {
                return Err(SweepError::Config(format!(
                    "grid of {} by {} points exceeds {MAX_SWEEP_POINTS}",
                    self.latitude.len(),
                    self.longitude.len()
                )));
            }
        }
        if !self.altitude.is_finite() {
            return Err(SweepError::Config(format!(
                "Altitude {} is not finite",
                self.altitude
            )));
        }
        Ok(())
    }

    fn optional_columns(&self) -> Vec<Column> {
        let mut columns = vec![];
        if self.secular_variation {
            columns.extend(Column::SECULAR);
        }
        if self.elements {
            columns.extend(Column::ELEMENTS);
        }
        columns
    }
}

/// The dataset of every point that could be evaluated, and the points that could not
#[derive(Debug)]
pub struct SweepOutcome {
    pub dataset: Dataset,
    pub failures: Vec<PointFailure>,
    /// Points evaluated with a data-quality warning attached
    pub flagged: usize,
}

/// Evaluates one grid point
fn evaluate_point(
    model: &CoefficientSet,
    geoid: &UndulationGrid,
    config: &SweepConfig,
    latitude: f64,
    longitude: f64,
) -> PointResult {
    let (location, gap) = match config.height_reference {
        HeightReference::Ellipsoid => (
            Location::from_geodetic(latitude, longitude, config.altitude)?,
            None,
        ),
        HeightReference::MeanSeaLevel => {
            Location::from_mean_sea_level_with(geoid, latitude, longitude, config.altitude)?
        }
    };
    Ok(evaluate_with(model, &location, config.time, &config.options)?.with_coverage_gap(gap))
}

/// The row for one point. Declination, inclination and intensity are only derived when the
/// dataset carries those columns.
fn to_point(field: &MagneticField, config: &SweepConfig) -> SweepPoint {
    let (latitude, longitude, altitude) = field.location().geodetic();
    let (bx, by, bz, dbx, dby, dbz) = if config.spherical {
        field.spherical()
    } else {
        field.ellipsoidal()
    };
    let (declination, inclination, total_intensity) = if config.elements {
        (field.d(), field.i(), field.f())
    } else {
        (0.0, 0.0, 0.0)
    };
    SweepPoint {
        latitude,
        longitude,
        altitude,
        bx,
        by,
        bz,
        dbx,
        dby,
        dbz,
        declination,
        inclination,
        total_intensity,
    }
}

/// Splits per-point results into failures and the dataset, logging each failure
fn collect(config: &SweepConfig, results: Vec<(usize, PointResult)>) -> SweepOutcome {
    let (failures, fields): (Vec<_>, Vec<_>) =
        results
            .into_iter()
            .partition_map(|(index, result)| match result {
                Err(source) => {
                    let (latitude, longitude) = config.point(index);
                    Either::Left(PointFailure {
                        index,
                        latitude,
                        longitude,
                        source,
                    })
                }
                Ok(field) => Either::Right(field),
            });
    for failure in failures.iter() {
        warn!("Skipping {failure}");
    }

    let mut dataset = Dataset::new(&config.optional_columns());
    let mut flagged = 0;
    for field in fields.iter() {
        let warnings = field.warnings();
        if !warnings.is_empty() {
            flagged += 1;
            debug!(
                "Point ({}, {}): {}",
                field.location().latitude(),
                field.location().longitude(),
                warnings.iter().join("; ")
            );
        }
        dataset.push(&to_point(field, config));
    }
    info!(
        "Swept {} points, {} skipped, {} flagged",
        dataset.len(),
        failures.len(),
        flagged
    );

    SweepOutcome {
        dataset,
        failures,
        flagged,
    }
}

/// Evaluates every grid point in order on the current thread.
///
/// A point that cannot be evaluated is recorded in `SweepOutcome::failures` and the sweep
/// continues.
///
/// # Errors
/// Will return `Err` if the configuration does not describe a valid grid.
pub fn sweep(
    model: &CoefficientSet,
    geoid: &UndulationGrid,
    config: &SweepConfig,
) -> Result<SweepOutcome> {
    config.validate()?;
    let results = (0..config.len())
        .map(|i| {
            let (latitude, longitude) = config.point(i);
            (i, evaluate_point(model, geoid, config, latitude, longitude))
        })
        .collect();
    Ok(collect(config, results))
}

/// As `sweep`, evaluating the points in parallel. The dataset is in the same order.
pub fn par_sweep(
    model: &CoefficientSet,
    geoid: &UndulationGrid,
    config: &SweepConfig,
) -> Result<SweepOutcome> {
    config.validate()?;
    let results = (0..config.len())
        .into_par_iter()
        .map(|i| {
            let (latitude, longitude) = config.point(i);
            (i, evaluate_point(model, geoid, config, latitude, longitude))
        })
        .collect();
    Ok(collect(config, results))
}
