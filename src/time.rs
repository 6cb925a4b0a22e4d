//! Decimal years, the time scale the model is evaluated on.
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

const SECONDS_PER_DAY: f64 = 86_400.0;

fn days_in_year(year: i32) -> f64 {
    match NaiveDate::from_ymd_opt(year, 12, 31) {
        Some(last) => last.ordinal() as f64,
        None => 365.0,
    }
}

/// A point in time as a fractional year, e.g. 2023.5 is half-way through 2023. The fraction
/// is measured against the actual length of that year, so leap years are honoured.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DecimalYear(f64);

impl DecimalYear {
    pub fn new(year: f64) -> DecimalYear {
        DecimalYear(year)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Decimal year at midnight starting a calendar date
    pub fn from_date(date: NaiveDate) -> DecimalYear {
        DecimalYear(date.year() as f64 + date.ordinal0() as f64 / days_in_year(date.year()))
    }

    /// Decimal year of a date and time of day
    pub fn from_datetime(datetime: NaiveDateTime) -> DecimalYear {
        let year = datetime.year();
        let seconds = datetime.ordinal0() as f64 * SECONDS_PER_DAY
            + datetime.num_seconds_from_midnight() as f64
            + datetime.nanosecond() as f64 * 1e-9;
        DecimalYear(year as f64 + seconds / (days_in_year(year) * SECONDS_PER_DAY))
    }

    /// Calendar date and time, to the nearest millisecond. `None` outside the range `chrono`
    /// can represent.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        if !self.0.is_finite() {
            return None;
        }
        let year = self.0.floor();
        let start = NaiveDate::from_ymd_opt(year as i32, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let millis = ((self.0 - year) * days_in_year(year as i32) * SECONDS_PER_DAY * 1000.0).round();
        start.checked_add_signed(Duration::milliseconds(millis as i64))
    }

    /// Years elapsed since another decimal year
    pub fn years_since(&self, other: f64) -> f64 {
        self.0 - other
    }
}

impl From<f64> for DecimalYear {
    fn from(year: f64) -> DecimalYear {
        DecimalYear(year)
    }
}

impl From<NaiveDate> for DecimalYear {
    fn from(date: NaiveDate) -> DecimalYear {
        DecimalYear::from_date(date)
    }
}

impl From<NaiveDateTime> for DecimalYear {
    fn from(datetime: NaiveDateTime) -> DecimalYear {
        DecimalYear::from_datetime(datetime)
    }
}

impl fmt::Display for DecimalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
