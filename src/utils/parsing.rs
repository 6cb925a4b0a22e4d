//! Parsing of the free-form coordinates, heights and dates accepted on the command line.
use crate::location::HeightReference;
use crate::time::DecimalYear;
use crate::utils::angles::Dms;
use crate::utils::constants::KM_TO_M;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("Invalid angle '{0}': expected decimal degrees or 'degrees, minutes, seconds'")]
    Angle(String),

    #[error("Invalid altitude '{0}': expected kilometres, prefixed with 'E' for height above the ellipsoid")]
    Altitude(String),

    #[error("Invalid date '{0}': expected a decimal year, 'MM DD YYYY' or 'MM/DD/YYYY'")]
    Date(String),
}

type Result<T> = std::result::Result<T, InputError>;

/// Parses an angle given either in decimal degrees (`-45.25`) or as degrees, minutes and
/// seconds separated by commas or whitespace (`-45, 15, 0`). A leading minus sign applies to
/// the whole angle.
pub fn parse_lat_lng(input: &str) -> Result<f64> {
    let invalid = || InputError::Angle(input.to_string());
    let trimmed = input.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let parts = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<f64>>>()?;

    let dms = match parts[..] {
        [degrees] => Dms {
            degrees,
            minutes: 0.0,
            seconds: 0.0,
        },
        [degrees, minutes] => Dms {
            degrees,
            minutes,
            seconds: 0.0,
        },
        [degrees, minutes, seconds] => Dms {
            degrees,
            minutes,
            seconds,
        },
        _ => return Err(invalid()),
    };
    if !(0.0..60.0).contains(&dms.minutes) || !(0.0..60.0).contains(&dms.seconds) {
        return Err(invalid());
    }
    let magnitude = dms.to_degrees();
    if !magnitude.is_finite() || magnitude < 0.0 {
        return Err(invalid());
    }

    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses an altitude in kilometres into metres. Heights are above mean sea level unless
/// prefixed with `E` (or `e`), which marks a height above the WGS-84 ellipsoid.
pub fn parse_altitude(input: &str) -> Result<(f64, HeightReference)> {
    let trimmed = input.trim();
    let (reference, value) = match trimmed.strip_prefix(['E', 'e']) {
        Some(rest) => (HeightReference::Ellipsoid, rest.trim()),
        None => (HeightReference::MeanSeaLevel, trimmed),
    };
    let kilometres = value
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite())
        .ok_or_else(|| InputError::Altitude(input.to_string()))?;
    Ok((kilometres * KM_TO_M, reference))
}

/// Parses a time given as a decimal year (`2022.5`) or a calendar date (`MM DD YYYY` or
/// `MM/DD/YYYY`).
pub fn parse_time(input: &str) -> Result<DecimalYear> {
    let trimmed = input.trim();
    if let Ok(year) = trimmed.parse::<f64>() {
        if year.is_finite() {
            return Ok(DecimalYear::new(year));
        }
    }

    let normalized = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    ["%m/%d/%Y", "%m %d %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        .map(DecimalYear::from_date)
        .ok_or_else(|| InputError::Date(input.to_string()))
}
