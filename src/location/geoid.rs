//! Geoid undulation lookup on a regular latitude/longitude grid in the EGM96 `WW15MGH.GRD`
//! layout.
use crate::location::error::{CoverageError, GeoidError};
use crate::utils::embedded::{embedded_text, DEFAULT_GEOID_GRID};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Grid values at or above this mark cells without data
pub const NO_DATA: f64 = 9999.0;

type Result<T> = std::result::Result<T, GeoidError>;

static BUILT_IN: OnceLock<std::result::Result<UndulationGrid, String>> = OnceLock::new();

/// Geoid heights above the WGS-84 ellipsoid in metres, sampled on a regular grid.
/// Rows run from north to south, each row from west to east.
#[derive(Debug, Clone)]
pub struct UndulationGrid {
    pub lat_south: f64, // degrees
    pub lat_north: f64, // degrees
    pub lon_west: f64,  // degrees
    pub lon_east: f64,  // degrees
    pub lat_step: f64,  // degrees
    pub lon_step: f64,  // degrees
    num_rows: usize,
    num_cols: usize,
    values: Vec<f64>, // metres
}

impl UndulationGrid {
    /// Parses a grid from text: a header `lat_south lat_north lon_west lon_east dlat dlon`
    /// followed by every node value, whitespace separated.
    ///
    /// # Errors
    /// Will return `Err` if the header is incomplete or inconsistent, a value is not
    /// numeric, or the number of values does not match the header.
    pub fn parse(text: &str) -> Result<UndulationGrid> {
        let mut tokens = text.split_whitespace().map(|t| {
            t.parse::<f64>()
                .map_err(|_| GeoidError::Parse(format!("'{t}' is not a number")))
        });

        let mut header = [0.0; 6];
        for (i, slot) in header.iter_mut().enumerate() {
            *slot = tokens.next().ok_or_else(|| {
                GeoidError::Parse(format!("header has {i} of 6 required values"))
            })??;
        }
        let [lat_south, lat_north, lon_west, lon_east, lat_step, lon_step] = header;

        if !(lat_step > 0.0 && lon_step > 0.0) {
            return Err(GeoidError::Parse("grid spacing must be positive".to_string()));
        }
        if !(lat_north > lat_south && lon_east > lon_west) {
            return Err(GeoidError::Parse("grid bounds are empty".to_string()));
        }
        if lat_south < -90.0 || lat_north > 90.0 || lon_east - lon_west > 360.0 {
            return Err(GeoidError::Parse("grid bounds exceed the globe".to_string()));
        }

        let num_rows = ((lat_north - lat_south) / lat_step).round() as usize + 1;
        let num_cols = ((lon_east - lon_west) / lon_step).round() as usize + 1;
        if num_rows < 2 || num_cols < 2 {
            return Err(GeoidError::Parse(
                "grid needs at least two rows and two columns".to_string(),
            ));
        }

        let values = tokens.collect::<Result<Vec<f64>>>()?;
        let expected = num_rows.checked_mul(num_cols);
        if expected != Some(values.len()) {
            return Err(GeoidError::Parse(format!(
                "expected {num_rows} rows of {num_cols} values, found {}",
                values.len()
            )));
        }

        Ok(UndulationGrid {
            lat_south,
            lat_north,
            lon_west,
            lon_east,
            lat_step,
            lon_step,
            num_rows,
            num_cols,
            values,
        })
    }

    /// Loads a grid file, e.g. the full-resolution EGM96 `WW15MGH.GRD`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<UndulationGrid> {
        let grid = UndulationGrid::parse(&fs::read_to_string(path.as_ref())?)?;
        debug!(
            path = %path.as_ref().display(),
            rows = grid.num_rows,
            cols = grid.num_cols,
            "loaded undulation grid"
        );
        Ok(grid)
    }

    /// The coarse global grid bundled with the crate, parsed once per process.
    pub fn built_in() -> Result<&'static UndulationGrid> {
        BUILT_IN
            .get_or_init(|| {
                let grid = UndulationGrid::parse(&embedded_text(DEFAULT_GEOID_GRID)?)
                    .map_err(|e| e.to_string())?;
                debug!(rows = grid.num_rows, cols = grid.num_cols, "loaded built-in undulation grid");
                Ok(grid)
            })
            .as_ref()
            .map_err(|e| GeoidError::Embedded(e.clone()))
    }

    /// Whether the grid wraps all the way around the globe in longitude
    fn is_global(&self) -> bool {
        self.lon_east - self.lon_west >= 360.0 - 1e-9
    }

    fn node(&self, row: usize, col: usize) -> Option<f64> {
        let value = self.values[row * self.num_cols + col];
        if value.is_nan() || value >= NO_DATA {
            None
        } else {
            Some(value)
        }
    }

    /// Geoid undulation in metres at a geodetic latitude/longitude in degrees, by bilinear
    /// interpolation between the four surrounding nodes.
    ///
    /// When the point lies outside the grid or its cell has missing nodes, the best available
    /// estimate is still returned (nearest edge, or the mean of the valid corners) together
    /// with a `CoverageError` describing the gap.
    pub fn undulation(&self, latitude: f64, longitude: f64) -> (f64, Option<CoverageError>) {
        let mut gap = None;
        let mut report = |reason: String| {
            gap.get_or_insert(CoverageError {
                latitude,
                longitude,
                reason,
            });
        };

        let mut lat = latitude;
        if !(self.lat_south..=self.lat_north).contains(&lat) {
            report(format!(
                "latitude outside grid bounds [{}, {}]",
                self.lat_south, self.lat_north
            ));
            lat = lat.clamp(self.lat_south, self.lat_north);
        }

        let mut lon = self.lon_west + (longitude - self.lon_west).rem_euclid(360.0);
        if !self.is_global() && lon > self.lon_east {
            report(format!(
                "longitude outside grid bounds [{}, {}]",
                self.lon_west, self.lon_east
            ));
            // Snap to whichever edge is closer going around the globe
            let past_east = lon - self.lon_east;
            let before_west = self.lon_west + 360.0 - lon;
            lon = if past_east <= before_west {
                self.lon_east
            } else {
                self.lon_west
            };
        }

        let row_pos = (self.lat_north - lat) / self.lat_step;
        let col_pos = (lon - self.lon_west) / self.lon_step;
        let row = (row_pos.floor() as usize).min(self.num_rows - 2);
        let col = (col_pos.floor() as usize).min(self.num_cols - 2);
        let t = row_pos - row as f64;
        let u = col_pos - col as f64;

        // Nodes with zero weight do not contribute, so a point exactly on a valid node next
        // to a no-data node is still covered
        let corners: Vec<(Option<f64>, f64)> = [
            (self.node(row, col), (1.0 - t) * (1.0 - u)),
            (self.node(row, col + 1), (1.0 - t) * u),
            (self.node(row + 1, col), t * (1.0 - u)),
            (self.node(row + 1, col + 1), t * u),
        ]
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .collect();

        let valid: Vec<f64> = corners.iter().filter_map(|(v, _)| *v).collect();
        let value = if valid.len() == corners.len() {
            corners.iter().map(|(v, w)| v.unwrap_or(0.0) * w).sum()
        } else {
            report(format!(
                "{} of {} surrounding grid nodes have no data",
                corners.len() - valid.len(),
                corners.len()
            ));
            if valid.is_empty() {
                0.0
            } else {
                valid.iter().sum::<f64>() / valid.len() as f64
            }
        };

        (value, gap)
    }
}
