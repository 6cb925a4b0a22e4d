//! Gauss coefficient tables in the WMM `.COF` layout.
use crate::model::error::CoefficientError;
use crate::model::uncertainty::ErrorModel;
use crate::time::DecimalYear;
use crate::utils::constants::GEOMAGNETIC_REFERENCE_RADIUS;
use crate::utils::embedded::{embedded_text, DEFAULT_COF};
use chrono::NaiveDate;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, CoefficientError>;

/// Largest degree of any published WMM-family model (WMMHR)
pub const MAX_SUPPORTED_DEGREE: usize = 133;

/// Length of the validity window when the source does not declare one, years
pub const DEFAULT_VALIDITY_YEARS: f64 = 5.0;

static BUILT_IN: OnceLock<std::result::Result<CoefficientSet, String>> = OnceLock::new();

/// Where to load a model from
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModelSource {
    /// The WMM2020 model bundled with the crate
    #[default]
    BuiltIn,
    /// A `.COF` file on disk
    File(PathBuf),
}

/// Main-field (nT) and secular-variation (nT/year) coefficients of one degree and order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coefficient {
    pub g: f64,
    pub h: f64,
    pub dg: f64,
    pub dh: f64,
}

impl Coefficient {
    /// Linear extrapolation of (g, h) by `years` of secular variation
    pub fn at(&self, years: f64) -> (f64, f64) {
        (self.g + years * self.dg, self.h + years * self.dh)
    }
}

/// Position of (n, m) in a lower-triangular table
fn index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

/// An immutable spherical-harmonic model: Gauss coefficients, their secular rates, the epoch
/// they refer to and the window over which the model is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    name: String,
    epoch: f64,
    valid_from: f64,
    valid_until: f64,
    release_date: Option<NaiveDate>,
    reference_radius: f64, // m
    max_degree: usize,
    coefficients: Vec<Coefficient>,
    error_model: ErrorModel,
}

impl CoefficientSet {
    /// Builds a model from explicit (n, m, coefficient) entries. Entries not supplied are zero.
    ///
    /// # Errors
    /// Will return `Err` if any entry has n = 0, n > `max_degree` or m > n.
    pub fn from_coefficients(
        name: &str,
        epoch: f64,
        max_degree: usize,
        entries: impl IntoIterator<Item = (usize, usize, Coefficient)>,
    ) -> Result<CoefficientSet> {
        let mut coefficients = vec![Coefficient::default(); index(max_degree + 1, 0)];
        for (n, m, coefficient) in entries {
            if n == 0 || n > max_degree || m > n {
                return Err(CoefficientError::Index { n, m, max_degree });
            }
            coefficients[index(n, m)] = coefficient;
        }
        Ok(CoefficientSet {
            name: name.to_string(),
            epoch,
            valid_from: epoch,
            valid_until: epoch + DEFAULT_VALIDITY_YEARS,
            release_date: None,
            reference_radius: GEOMAGNETIC_REFERENCE_RADIUS,
            max_degree,
            coefficients,
            error_model: ErrorModel::for_model(name),
        })
    }

    /// Parses a model in the WMM `.COF` layout.
    ///
    /// The first line is a header `<epoch> <name> [<release date MM/DD/YYYY>] [<valid until>]`,
    /// followed by one `n m g h dg dh` line per coefficient, terminated by end of input or a line
    /// of 9s. Coefficients not listed are zero.
    ///
    /// # Errors
    /// Will return `Err` if the header lacks an epoch or name, a line does not have six numeric
    /// columns, a degree/order is out of range, or there are no coefficients.
    pub fn parse(text: &str) -> Result<CoefficientSet> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines
            .next()
            .ok_or_else(|| CoefficientError::Validity("missing header line".to_string()))?;
        let header: Vec<&str> = header.split_whitespace().collect();
        let parse_error = |line: usize, message: String| CoefficientError::Parse { line, message };

        let epoch = header
            .first()
            .ok_or_else(|| CoefficientError::Validity("missing epoch".to_string()))?
            .parse::<f64>()
            .map_err(|_| parse_error(header_line, format!("epoch '{}' is not a number", header[0])))?;
        let name = header
            .get(1)
            .ok_or_else(|| CoefficientError::Validity("missing model name".to_string()))?
            .to_string();
        let release_date = header
            .get(2)
            .map(|date| {
                NaiveDate::parse_from_str(date, "%m/%d/%Y").map_err(|_| {
                    parse_error(header_line, format!("release date '{date}' is not MM/DD/YYYY"))
                })
            })
            .transpose()?;
        let valid_until = header
            .get(3)
            .map(|end| {
                end.parse::<f64>().map_err(|_| {
                    parse_error(header_line, format!("validity end '{end}' is not a number"))
                })
            })
            .transpose()?
            .unwrap_or(epoch + DEFAULT_VALIDITY_YEARS);
        if valid_until < epoch {
            return Err(parse_error(
                header_line,
                format!("validity end {valid_until} precedes epoch {epoch}"),
            ));
        }

        let mut entries = vec![];
        for (line_num, line) in lines {
            if line.starts_with("9999") {
                break;
            }
            let Some((n, m, g, h, dg, dh)) = line.split_whitespace().collect_tuple() else {
                return Err(parse_error(
                    line_num,
                    format!("expected 6 columns, found {}", line.split_whitespace().count()),
                ));
            };
            let degree = |field: &str| {
                field
                    .parse::<usize>()
                    .map_err(|_| parse_error(line_num, format!("'{field}' is not a degree/order")))
            };
            let value = |field: &str| {
                field
                    .parse::<f64>()
                    .map_err(|_| parse_error(line_num, format!("'{field}' is not a number")))
            };
            let (n, m) = (degree(n)?, degree(m)?);
            if n == 0 || n > MAX_SUPPORTED_DEGREE || m > n {
                return Err(parse_error(
                    line_num,
                    format!("degree {n}, order {m} outside 1 <= n <= {MAX_SUPPORTED_DEGREE}, m <= n"),
                ));
            }
            let coefficient = Coefficient {
                g: value(g)?,
                h: value(h)?,
                dg: value(dg)?,
                dh: value(dh)?,
            };
            entries.push((n, m, coefficient));
        }

        let max_degree = entries
            .iter()
            .map(|(n, _, _)| *n)
            .max()
            .ok_or_else(|| CoefficientError::Validity("no coefficients, so no maximum degree".to_string()))?;

        let mut seen = vec![false; index(max_degree + 1, 0)];
        for (n, m, _) in entries.iter() {
            if std::mem::replace(&mut seen[index(*n, *m)], true) {
                warn!(n, m, model = %name, "duplicate coefficient, keeping the last one");
            }
        }

        let mut set = CoefficientSet::from_coefficients(&name, epoch, max_degree, entries)?;
        set.valid_until = valid_until;
        set.release_date = release_date;
        Ok(set)
    }

    /// Loads a `.COF` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<CoefficientSet> {
        let set = CoefficientSet::parse(&fs::read_to_string(path.as_ref())?)?;
        debug!(
            path = %path.as_ref().display(),
            model = %set.name,
            epoch = set.epoch,
            max_degree = set.max_degree,
            "loaded coefficient file"
        );
        Ok(set)
    }

    /// The WMM2020 model bundled with the crate, parsed once per process.
    pub fn built_in() -> Result<&'static CoefficientSet> {
        BUILT_IN
            .get_or_init(|| {
                let set = CoefficientSet::parse(&embedded_text(DEFAULT_COF)?)
                    .map_err(|e| e.to_string())?;
                debug!(model = %set.name, epoch = set.epoch, "loaded built-in coefficients");
                Ok(set)
            })
            .as_ref()
            .map_err(|e| CoefficientError::Embedded(e.clone()))
    }

    /// Loads a model from a source.
    pub fn load(source: &ModelSource) -> Result<CoefficientSet> {
        match source {
            ModelSource::BuiltIn => Ok(CoefficientSet::built_in()?.clone()),
            ModelSource::File(path) => CoefficientSet::from_file(path),
        }
    }

    /// Coefficients of degree n and order m; zero for pairs the source did not list.
    ///
    /// # Errors
    /// Will return `Err` if n exceeds the maximum degree or m > n.
    pub fn coefficient_at(&self, n: usize, m: usize) -> Result<Coefficient> {
        if n > self.max_degree || m > n {
            return Err(CoefficientError::Index {
                n,
                m,
                max_degree: self.max_degree,
            });
        }
        Ok(self.coefficients[index(n, m)])
    }

    /// Unchecked lookup for the synthesis loop, which only visits valid (n, m)
    pub(crate) fn get(&self, n: usize, m: usize) -> &Coefficient {
        &self.coefficients[index(n, m)]
    }

    /// The same model with every secular-variation coefficient set to zero
    pub fn zero_secular(&self) -> CoefficientSet {
        let mut set = self.clone();
        for c in set.coefficients.iter_mut() {
            c.dg = 0.0;
            c.dh = 0.0;
        }
        set
    }

    /// The same model re-referenced to a new epoch, with (g, h) extrapolated to it. The validity
    /// window is unchanged.
    pub fn extrapolated_to(&self, time: DecimalYear) -> CoefficientSet {
        let years = time.value() - self.epoch;
        let mut set = self.clone();
        for c in set.coefficients.iter_mut() {
            (c.g, c.h) = c.at(years);
        }
        set.epoch = time.value();
        set
    }

    /// Replaces the published uncertainty estimates
    pub fn with_error_model(mut self, error_model: ErrorModel) -> CoefficientSet {
        self.error_model = error_model;
        self
    }

    /// Replaces the validity window
    pub fn with_validity(mut self, valid_from: f64, valid_until: f64) -> CoefficientSet {
        self.valid_from = valid_from;
        self.valid_until = valid_until;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn valid_from(&self) -> f64 {
        self.valid_from
    }

    pub fn valid_until(&self) -> f64 {
        self.valid_until
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    pub fn reference_radius(&self) -> f64 {
        self.reference_radius
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn error_model(&self) -> &ErrorModel {
        &self.error_model
    }

    /// Whether a time lies within the validity window, inclusive
    pub fn is_valid_at(&self, time: DecimalYear) -> bool {
        (self.valid_from..=self.valid_until).contains(&time.value())
    }
}
