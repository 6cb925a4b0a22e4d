//! Column-oriented datasets of evaluated points, written as a single JSON object.
use crate::sweep::error::SweepError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// One evaluated point of a sweep. Angles in degrees, altitude in metres above the ellipsoid,
/// field components in nT and their rates in nT/year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub bx: f64,
    pub by: f64,
    pub bz: f64,
    pub dbx: f64,
    pub dby: f64,
    pub dbz: f64,
    pub declination: f64,
    pub inclination: f64,
    pub total_intensity: f64,
}

/// A column a dataset can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Latitude,
    Longitude,
    Altitude,
    Bx,
    By,
    Bz,
    Dbx,
    Dby,
    Dbz,
    Declination,
    Inclination,
    TotalIntensity,
}

impl Column {
    /// Columns every dataset carries
    pub const REQUIRED: [Column; 6] = [
        Column::Latitude,
        Column::Longitude,
        Column::Altitude,
        Column::Bx,
        Column::By,
        Column::Bz,
    ];
    pub const SECULAR: [Column; 3] = [Column::Dbx, Column::Dby, Column::Dbz];
    pub const ELEMENTS: [Column; 3] = [
        Column::Declination,
        Column::Inclination,
        Column::TotalIntensity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::Altitude => "altitude",
            Column::Bx => "bx",
            Column::By => "by",
            Column::Bz => "bz",
            Column::Dbx => "dbx",
            Column::Dby => "dby",
            Column::Dbz => "dbz",
            Column::Declination => "declination",
            Column::Inclination => "inclination",
            Column::TotalIntensity => "total_intensity",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::REQUIRED
            .into_iter()
            .chain(Column::SECULAR)
            .chain(Column::ELEMENTS)
            .find(|column| column.name() == name)
    }

    fn value(&self, point: &SweepPoint) -> f64 {
        match self {
            Column::Latitude => point.latitude,
            Column::Longitude => point.longitude,
            Column::Altitude => point.altitude,
            Column::Bx => point.bx,
            Column::By => point.by,
            Column::Bz => point.bz,
            Column::Dbx => point.dbx,
            Column::Dby => point.dby,
            Column::Dbz => point.dbz,
            Column::Declination => point.declination,
            Column::Inclination => point.inclination,
            Column::TotalIntensity => point.total_intensity,
        }
    }
}

/// Named columns of equal length, in insertion order. Serializes as one JSON object mapping each
/// column name to its array of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    columns: IndexMap<String, Vec<f64>>,
}

impl Dataset {
    /// An empty dataset with the required columns and the given optional ones
    pub fn new(optional: &[Column]) -> Dataset {
        let columns = Column::REQUIRED
            .iter()
            .chain(optional)
            .map(|column| (column.name().to_string(), vec![]))
            .collect();
        Dataset { columns }
    }

    /// Appends a point to every column the dataset carries
    pub fn push(&mut self, point: &SweepPoint) {
        for (name, values) in self.columns.iter_mut() {
            if let Some(column) = Column::from_name(name) {
                values.push(column.value(point));
            }
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String, SweepError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Writes the dataset to a JSON file, creating or truncating it.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SweepError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a dataset previously written with `write_json`.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Dataset, SweepError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
