//! Query points, held in both geodetic and geocentric spherical form.
use crate::location::ellipsoid::{geocentric_to_geodetic, geodetic_to_geocentric};
use crate::location::error::{CoverageError, LocationError};
use crate::location::geoid::UndulationGrid;
use crate::utils::angles::normalize_longitude;

pub mod ellipsoid;
pub mod error;
pub mod geoid;

type Result<T> = std::result::Result<T, LocationError>;

/// How the height of a `Location` was supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightReference {
    /// Height above the WGS-84 ellipsoid
    Ellipsoid,
    /// Height above mean sea level (the geoid)
    MeanSeaLevel,
}

/// An immutable point near the Earth. Angles are in degrees, lengths in metres, and the
/// longitude is always in [0, 360).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    radius: f64,      // geocentric, m
    colatitude: f64,  // geocentric, degrees
    longitude: f64,   // degrees east
    latitude: f64,    // geodetic, degrees
    height: f64,      // above the ellipsoid, m
    height_reference: HeightReference,
}

fn check_latitude(latitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(LocationError::Range(format!(
            "Latitude {latitude} is outside legal range. The legal range is from -90 to 90"
        )));
    }
    Ok(())
}

impl Location {
    /// Builds a location from geodetic latitude, longitude and height above the ellipsoid.
    ///
    /// # Errors
    /// Will return `Err` if the latitude is outside [-90, 90], the longitude is outside
    /// [-180, 360], or the height is not finite.
    pub fn from_geodetic(latitude: f64, longitude: f64, height: f64) -> Result<Location> {
        check_latitude(latitude)?;
        let longitude = normalize_longitude(longitude)?;
        if !height.is_finite() {
            return Err(LocationError::Range(format!("Height {height} is not finite")));
        }

        let (radius, geocentric_lat) = geodetic_to_geocentric(latitude.to_radians(), height);
        Ok(Location {
            radius,
            colatitude: 90.0 - geocentric_lat.to_degrees(),
            longitude,
            latitude,
            height,
            height_reference: HeightReference::Ellipsoid,
        })
    }

    /// Builds a location from geodetic latitude, longitude and height above mean sea level,
    /// using the built-in geoid undulation grid.
    ///
    /// A gap in the grid's coverage does not fail the call: the location is built from the
    /// best available undulation estimate and the gap is returned alongside it.
    pub fn from_mean_sea_level(
        latitude: f64,
        longitude: f64,
        height_above_msl: f64,
    ) -> Result<(Location, Option<CoverageError>)> {
        Location::from_mean_sea_level_with(
            UndulationGrid::built_in()?,
            latitude,
            longitude,
            height_above_msl,
        )
    }

    /// As `from_mean_sea_level`, with an explicit undulation grid.
    pub fn from_mean_sea_level_with(
        grid: &UndulationGrid,
        latitude: f64,
        longitude: f64,
        height_above_msl: f64,
    ) -> Result<(Location, Option<CoverageError>)> {
        check_latitude(latitude)?;
        let longitude = normalize_longitude(longitude)?;
        let (undulation, gap) = grid.undulation(latitude, longitude);

        let mut location = Location::from_geodetic(latitude, longitude, height_above_msl + undulation)?;
        location.height_reference = HeightReference::MeanSeaLevel;
        Ok((location, gap))
    }

    /// Builds a location from geocentric radius (m), geocentric colatitude and longitude.
    ///
    /// # Errors
    /// Will return `Err` if the colatitude is outside [0, 180], the longitude is outside
    /// [-180, 360], or the radius is not positive.
    pub fn from_geocentric(radius: f64, colatitude: f64, longitude: f64) -> Result<Location> {
        check_latitude(90.0 - colatitude)?;
        let longitude = normalize_longitude(longitude)?;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LocationError::Range(format!("Radius {radius} must be positive")));
        }

        let (geodetic_lat, height) = geocentric_to_geodetic(radius, (90.0 - colatitude).to_radians());
        Ok(Location {
            radius,
            colatitude,
            longitude,
            latitude: geodetic_lat.to_degrees(),
            height,
            height_reference: HeightReference::Ellipsoid,
        })
    }

    /// Geodetic (latitude, longitude, height above the ellipsoid)
    pub fn geodetic(&self) -> (f64, f64, f64) {
        (self.latitude, self.longitude, self.height)
    }

    /// Geocentric (radius, colatitude, longitude)
    pub fn geocentric(&self) -> (f64, f64, f64) {
        (self.radius, self.colatitude, self.longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn height_above_ellipsoid(&self) -> f64 {
        self.height
    }

    pub fn geocentric_latitude(&self) -> f64 {
        90.0 - self.colatitude
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn colatitude(&self) -> f64 {
        self.colatitude
    }

    pub fn height_reference(&self) -> HeightReference {
        self.height_reference
    }

    /// Height above mean sea level from the built-in undulation grid, with any coverage gap
    ///
    /// # Errors
    /// Will return `Err` only if the built-in grid cannot be loaded.
    pub fn height_above_msl(&self) -> Result<(f64, Option<CoverageError>)> {
        Ok(self.height_above_msl_with(UndulationGrid::built_in()?))
    }

    /// Height above mean sea level from an explicit undulation grid, with any coverage gap
    pub fn height_above_msl_with(&self, grid: &UndulationGrid) -> (f64, Option<CoverageError>) {
        let (undulation, gap) = grid.undulation(self.latitude, self.longitude);
        (self.height - undulation, gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geodetic_round_trip() {
        for (lat, lon, h) in [
            (0.0, 0.0, 0.0),
            (45.5, 120.25, 1500.0),
            (-89.9, 359.5, -200.0),
            (90.0, 10.0, 0.0),
            (-33.0, 151.0, 8000.0),
        ] {
            let loc = Location::from_geodetic(lat, lon, h).unwrap();
            let (lat2, lon2, h2) = loc.geodetic();
            assert_abs_diff_eq!(lat2, lat, epsilon = 1e-12);
            assert_abs_diff_eq!(lon2, lon, epsilon = 1e-12);
            assert_abs_diff_eq!(h2, h, epsilon = 1e-9);
            assert_eq!(loc.height_reference(), HeightReference::Ellipsoid);
        }
    }

    #[test]
    fn colatitude_spans_pole_to_pole() {
        let north = Location::from_geodetic(90.0, 0.0, 0.0).unwrap();
        let south = Location::from_geodetic(-90.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(north.colatitude(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(south.colatitude(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn longitude_window() {
        let loc = Location::from_geodetic(10.0, -90.0, 0.0).unwrap();
        assert_eq!(loc.longitude(), 270.0);
        assert!(matches!(
            Location::from_geodetic(10.0, 400.0, 0.0),
            Err(LocationError::Range(_))
        ));
        assert!(matches!(
            Location::from_geodetic(10.0, -200.0, 0.0),
            Err(LocationError::Range(_))
        ));
        assert!(matches!(
            Location::from_geodetic(91.0, 0.0, 0.0),
            Err(LocationError::Range(_))
        ));
    }

    #[test]
    fn geocentric_constructor_matches_geodetic() {
        let loc = Location::from_geodetic(-37.8, 144.9, 350.0).unwrap();
        let (radius, colatitude, longitude) = loc.geocentric();
        let back = Location::from_geocentric(radius, colatitude, longitude).unwrap();
        assert_abs_diff_eq!(back.latitude(), -37.8, epsilon = 1e-9);
        assert_abs_diff_eq!(back.height_above_ellipsoid(), 350.0, epsilon = 1e-4);
        assert!(Location::from_geocentric(-1.0, 90.0, 0.0).is_err());
        assert!(Location::from_geocentric(6.4e6, 181.0, 0.0).is_err());
    }

    #[test]
    fn mean_sea_level_adds_undulation() {
        let grid = UndulationGrid::parse("0 10 0 10 10 10  20 20  20 20").unwrap();
        let (loc, gap) = Location::from_mean_sea_level_with(&grid, 5.0, 5.0, 100.0).unwrap();
        assert!(gap.is_none());
        assert_eq!(loc.height_reference(), HeightReference::MeanSeaLevel);
        assert_abs_diff_eq!(loc.height_above_ellipsoid(), 120.0, epsilon = 1e-9);
        let (msl, gap) = loc.height_above_msl_with(&grid);
        assert!(gap.is_none());
        assert_abs_diff_eq!(msl, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn coverage_gap_is_attached_not_fatal() {
        let grid = UndulationGrid::parse("0 10 0 10 10 10  20 20  20 20").unwrap();
        let (loc, gap) = Location::from_mean_sea_level_with(&grid, 50.0, 5.0, 100.0).unwrap();
        assert!(gap.is_some());
        assert!(loc.height_above_ellipsoid().is_finite());
        let (_, gap) = loc.height_above_msl_with(&grid);
        assert!(gap.is_some());
    }

    #[test]
    fn built_in_mean_sea_level() {
        let (loc, gap) = Location::from_mean_sea_level(0.0, 120.0, 0.0).unwrap();
        assert!(gap.is_none());
        let (msl, gap) = loc.height_above_msl().unwrap();
        assert!(gap.is_none());
        assert_abs_diff_eq!(msl, 0.0, epsilon = 1e-9);
    }
}
