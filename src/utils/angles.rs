use crate::location::error::LocationError;

/// Smallest longitude accepted as input, degrees
pub const MIN_LONGITUDE: f64 = -180.0;
/// Largest longitude accepted as input, degrees
pub const MAX_LONGITUDE: f64 = 360.0;

/// Wraps a longitude in degrees into [0, 360).
///
/// # Errors
/// Will return `Err` if the longitude is not finite or lies outside [-180, 360].
pub fn normalize_longitude(longitude: f64) -> Result<f64, LocationError> {
    if !longitude.is_finite() || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return Err(LocationError::Range(format!(
            "Longitude {longitude} is outside legal range. The legal range is from {MIN_LONGITUDE} to {MAX_LONGITUDE}"
        )));
    }
    Ok(wrap_360(longitude))
}

/// Wraps any finite angle in degrees into [0, 360)
pub fn wrap_360(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wraps any finite angle in degrees into (-180, 180]
pub fn wrap_180(angle: f64) -> f64 {
    let wrapped = wrap_360(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// An angle split into degrees, minutes and seconds. The sign of the angle is carried by
/// every non-zero part, so -1.5 degrees is -1 degree, -30 minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    pub fn from_degrees(angle: f64) -> Dms {
        let degrees = angle.trunc();
        let minutes_fraction = (angle - degrees) * 60.0;
        let minutes = minutes_fraction.trunc();
        let seconds = (minutes_fraction - minutes) * 60.0;
        Dms {
            degrees,
            minutes,
            seconds,
        }
    }

    pub fn to_degrees(&self) -> f64 {
        self.degrees + self.minutes / 60.0 + self.seconds / 3600.0
    }
}
