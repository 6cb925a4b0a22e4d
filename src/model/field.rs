//! The result of one field evaluation and the quantities derived from it.
use crate::location::error::CoverageError;
use crate::location::Location;
use crate::model::synthesis::GeocentricField;
use crate::model::uncertainty::ErrorModel;
use crate::time::DecimalYear;
use crate::utils::angles::wrap_180;
use std::sync::OnceLock;
use thiserror::Error;

/// Below this horizontal intensity (nT) compass readings are unreliable
pub const CAUTION_ZONE_INTENSITY: f64 = 6000.0;
/// Below this horizontal intensity (nT) compass readings are unusable
pub const BLACKOUT_ZONE_INTENSITY: f64 = 2000.0;
/// Grid variation is conventionally only quoted poleward of this latitude, degrees
pub const GRID_VARIATION_LATITUDE: f64 = 55.0;

/// How weak the horizontal field is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowFieldZone {
    Caution,
    Blackout,
}

impl LowFieldZone {
    pub fn threshold(&self) -> f64 {
        match self {
            LowFieldZone::Caution => CAUTION_ZONE_INTENSITY,
            LowFieldZone::Blackout => BLACKOUT_ZONE_INTENSITY,
        }
    }
}

/// Data-quality conditions attached to an otherwise usable result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldWarning {
    /// Evaluated outside the model's validity window, by extrapolation
    #[error("Time {time:.3} is outside the model validity window [{valid_from:.1}, {valid_until:.1}]; results are extrapolated")]
    OutsideValidity {
        time: f64,
        valid_from: f64,
        valid_until: f64,
    },

    /// Horizontal field too weak for reliable compass use
    #[error("The Horizontal Field strength at this location is only {horizontal_intensity:.1} nT. Compass readings have VERY LARGE uncertainties in areas where H is smaller than {} nT", .zone.threshold())]
    LowHorizontalField {
        horizontal_intensity: f64,
        zone: LowFieldZone,
    },

    /// The height above mean sea level was converted with an estimated geoid undulation
    #[error("{0}")]
    Coverage(CoverageError),
}

/// (X, Y, Z) north/east/down components and their secular rates, nT and nT/year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NedComponents {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl NedComponents {
    /// Local north/east/down components of a geocentric spherical field
    fn from_geocentric(field: &GeocentricField) -> NedComponents {
        NedComponents {
            x: -field.field.theta,
            y: field.field.phi,
            z: -field.field.r,
            dx: -field.secular.theta,
            dy: field.secular.phi,
            dz: -field.secular.r,
        }
    }

    /// Rotates the north/down plane by `angle` radians about the east axis
    fn rotated(&self, angle: f64) -> NedComponents {
        let (sin, cos) = angle.sin_cos();
        NedComponents {
            x: self.x * cos + self.z * sin,
            y: self.y,
            z: -self.x * sin + self.z * cos,
            dx: self.dx * cos + self.dz * sin,
            dy: self.dy,
            dz: -self.dx * sin + self.dz * cos,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64) {
        (self.x, self.y, self.z, self.dx, self.dy, self.dz)
    }
}

/// Intensities (nT) and angles (degrees) derived from the ellipsoidal components, with their
/// secular rates per year
#[derive(Debug, Clone, Copy, PartialEq)]
struct Elements {
    h: f64,
    f: f64,
    d: f64,
    i: f64,
    dh: f64,
    df: f64,
    dd: f64,
    di: f64,
}

impl Elements {
    fn from_components(c: &NedComponents) -> Elements {
        let h = c.x.hypot(c.y);
        let f = h.hypot(c.z);
        let dh = if h > 0.0 {
            (c.x * c.dx + c.y * c.dy) / h
        } else {
            c.dx.hypot(c.dy)
        };
        let df = if f > 0.0 {
            (c.x * c.dx + c.y * c.dy + c.z * c.dz) / f
        } else {
            0.0
        };
        let dd = if h > 0.0 {
            (c.x * c.dy - c.y * c.dx) / (h * h)
        } else {
            0.0
        };
        let di = if f > 0.0 {
            (h * c.dz - c.z * dh) / (f * f)
        } else {
            0.0
        };
        Elements {
            h,
            f,
            d: c.y.atan2(c.x).to_degrees(),
            i: c.z.atan2(h).to_degrees(),
            dh,
            df,
            dd: dd.to_degrees(),
            di: di.to_degrees(),
        }
    }
}

/// The magnetic field at one location and time.
///
/// Holds the geocentric field and its secular rate; the ellipsoidal components and the
/// derived elements are computed on first use and cached.
#[derive(Debug)]
pub struct MagneticField {
    location: Location,
    time: DecimalYear,
    geocentric: GeocentricField,
    error_model: ErrorModel,
    warnings: Vec<FieldWarning>,
    ellipsoidal: OnceLock<NedComponents>,
    elements: OnceLock<Elements>,
}

impl MagneticField {
    pub(crate) fn new(
        location: Location,
        time: DecimalYear,
        geocentric: GeocentricField,
        error_model: ErrorModel,
        warnings: Vec<FieldWarning>,
    ) -> MagneticField {
        MagneticField {
            location,
            time,
            geocentric,
            error_model,
            warnings,
            ellipsoidal: OnceLock::new(),
            elements: OnceLock::new(),
        }
    }

    /// Attaches a geoid coverage gap raised while building the location
    pub fn with_coverage_gap(mut self, gap: Option<CoverageError>) -> MagneticField {
        if let Some(gap) = gap {
            self.warnings.push(FieldWarning::Coverage(gap));
        }
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn time(&self) -> DecimalYear {
        self.time
    }

    /// Field and secular rate in geocentric spherical components
    pub fn geocentric(&self) -> &GeocentricField {
        &self.geocentric
    }

    /// (X, Y, Z, dX, dY, dZ) in the local frame of the geocentric sphere: north along the
    /// meridian, east, and down towards the Earth's centre
    pub fn spherical(&self) -> (f64, f64, f64, f64, f64, f64) {
        NedComponents::from_geocentric(&self.geocentric).as_tuple()
    }

    fn ellipsoidal_components(&self) -> &NedComponents {
        self.ellipsoidal.get_or_init(|| {
            let psi = (self.location.latitude() - self.location.geocentric_latitude()).to_radians();
            NedComponents::from_geocentric(&self.geocentric).rotated(psi)
        })
    }

    /// (X, Y, Z, dX, dY, dZ) in the local geodetic frame: north along the ellipsoid meridian,
    /// east, and down along the ellipsoid normal
    pub fn ellipsoidal(&self) -> (f64, f64, f64, f64, f64, f64) {
        self.ellipsoidal_components().as_tuple()
    }

    fn elements(&self) -> &Elements {
        self.elements
            .get_or_init(|| Elements::from_components(self.ellipsoidal_components()))
    }

    pub fn x(&self) -> f64 {
        self.ellipsoidal_components().x
    }

    pub fn y(&self) -> f64 {
        self.ellipsoidal_components().y
    }

    pub fn z(&self) -> f64 {
        self.ellipsoidal_components().z
    }

    /// Horizontal intensity, nT
    pub fn h(&self) -> f64 {
        self.elements().h
    }

    /// Total intensity, nT
    pub fn f(&self) -> f64 {
        self.elements().f
    }

    /// Declination, degrees east of true north
    pub fn d(&self) -> f64 {
        self.elements().d
    }

    /// Inclination, degrees below the horizontal
    pub fn i(&self) -> f64 {
        self.elements().i
    }

    pub fn dh(&self) -> f64 {
        self.elements().dh
    }

    pub fn df(&self) -> f64 {
        self.elements().df
    }

    /// Degrees per year
    pub fn dd(&self) -> f64 {
        self.elements().dd
    }

    /// Degrees per year
    pub fn di(&self) -> f64 {
        self.elements().di
    }

    /// Angle between grid north of a polar stereographic grid and magnetic north, degrees.
    /// Defined everywhere; only meaningful where `grid_variation_applies`.
    pub fn gv(&self) -> f64 {
        let longitude = self.location.longitude();
        let convergence = if self.location.latitude() >= 0.0 {
            longitude
        } else {
            -longitude
        };
        wrap_180(self.d() - convergence)
    }

    /// Grid variation changes only through declination, degrees per year
    pub fn dgv(&self) -> f64 {
        self.dd()
    }

    /// Whether the location is far enough poleward for grid variation to be quoted
    pub fn grid_variation_applies(&self) -> bool {
        self.location.latitude().abs() >= GRID_VARIATION_LATITUDE
    }

    pub fn err_x(&self) -> f64 {
        self.error_model.x
    }

    pub fn err_y(&self) -> f64 {
        self.error_model.y
    }

    pub fn err_z(&self) -> f64 {
        self.error_model.z
    }

    pub fn err_h(&self) -> f64 {
        self.error_model.horizontal
    }

    pub fn err_f(&self) -> f64 {
        self.error_model.total
    }

    pub fn err_i(&self) -> f64 {
        self.error_model.inclination
    }

    pub fn err_d(&self) -> f64 {
        self.error_model.declination(self.h())
    }

    pub fn err_gv(&self) -> f64 {
        self.err_d()
    }

    /// Zone the location falls in if the horizontal field is weak
    pub fn low_field_zone(&self) -> Option<LowFieldZone> {
        let h = self.h();
        if h < BLACKOUT_ZONE_INTENSITY {
            Some(LowFieldZone::Blackout)
        } else if h < CAUTION_ZONE_INTENSITY {
            Some(LowFieldZone::Caution)
        } else {
            None
        }
    }

    /// Every data-quality warning that applies to this result
    pub fn warnings(&self) -> Vec<FieldWarning> {
        let mut warnings = self.warnings.clone();
        if let Some(zone) = self.low_field_zone() {
            warnings.push(FieldWarning::LowHorizontalField {
                horizontal_intensity: self.h(),
                zone,
            });
        }
        warnings
    }

    /// Whether the time was outside the model validity window
    pub fn is_extrapolated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, FieldWarning::OutsideValidity { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::synthesis::SphericalVector;
    use approx::assert_abs_diff_eq;

    fn field_at(latitude: f64, longitude: f64, geocentric: GeocentricField) -> MagneticField {
        MagneticField::new(
            Location::from_geodetic(latitude, longitude, 0.0).unwrap(),
            DecimalYear::new(2020.0),
            geocentric,
            ErrorModel::WMM2020,
            vec![],
        )
    }

    fn sample() -> GeocentricField {
        GeocentricField {
            field: SphericalVector {
                r: 40_000.0,
                theta: -20_000.0,
                phi: 3_000.0,
            },
            secular: SphericalVector {
                r: 30.0,
                theta: 12.0,
                phi: -25.0,
            },
        }
    }

    #[test]
    fn spherical_components_are_north_east_down() {
        let field = field_at(30.0, 10.0, sample());
        let (x, y, z, dx, dy, dz) = field.spherical();
        assert_eq!((x, y, z), (20_000.0, 3_000.0, -40_000.0));
        assert_eq!((dx, dy, dz), (-12.0, -25.0, -30.0));
    }

    #[test]
    fn rotation_preserves_magnitude() {
        let field = field_at(45.0, 10.0, sample());
        let (xs, ys, zs, ..) = field.spherical();
        let (x, y, z, ..) = field.ellipsoidal();
        assert_abs_diff_eq!(
            x * x + y * y + z * z,
            xs * xs + ys * ys + zs * zs,
            epsilon = 1e-3
        );
        assert_eq!(y, ys);
        // No rotation on the equator
        let equator = field_at(0.0, 10.0, sample());
        assert_abs_diff_eq!(equator.x(), xs, epsilon = 1e-9);
    }

    #[test]
    fn derived_elements_are_consistent() {
        let field = field_at(45.0, 10.0, sample());
        let (x, y, z, ..) = field.ellipsoidal();
        assert_abs_diff_eq!(field.h() * field.h(), x * x + y * y, epsilon = 1e-6);
        assert_abs_diff_eq!(field.f() * field.f(), x * x + y * y + z * z, epsilon = 1e-6);
        assert_abs_diff_eq!(field.d(), y.atan2(x).to_degrees(), epsilon = 1e-12);
        assert_abs_diff_eq!(field.i(), z.atan2(field.h()).to_degrees(), epsilon = 1e-12);
    }

    #[test]
    fn secular_rates_follow_the_chain_rule() {
        let field = field_at(45.0, 10.0, sample());
        let (x, y, z, dx, dy, dz) = field.ellipsoidal();
        let step = 1e-3;
        let later = NedComponents {
            x: x + step * dx,
            y: y + step * dy,
            z: z + step * dz,
            ..Default::default()
        };
        let later = Elements::from_components(&later);
        assert_abs_diff_eq!((later.h - field.h()) / step, field.dh(), epsilon = 1e-3);
        assert_abs_diff_eq!((later.f - field.f()) / step, field.df(), epsilon = 1e-3);
        assert_abs_diff_eq!((later.d - field.d()) / step, field.dd(), epsilon = 1e-6);
        assert_abs_diff_eq!((later.i - field.i()) / step, field.di(), epsilon = 1e-6);
    }

    #[test]
    fn grid_variation_subtracts_convergence() {
        let north = field_at(70.0, 30.0, sample());
        assert_abs_diff_eq!(north.gv(), wrap_180(north.d() - 30.0), epsilon = 1e-12);
        assert!(north.grid_variation_applies());
        let south = field_at(-70.0, 30.0, sample());
        assert_abs_diff_eq!(south.gv(), wrap_180(south.d() + 30.0), epsilon = 1e-12);
        let mid = field_at(20.0, 30.0, sample());
        assert!(!mid.grid_variation_applies());
        assert!(mid.gv().is_finite());
    }

    #[test]
    fn vertical_field_is_flagged_not_failed() {
        let vertical = GeocentricField {
            field: SphericalVector {
                r: -55_000.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let field = field_at(0.0, 0.0, vertical);
        assert_eq!(field.h(), 0.0);
        assert_eq!(field.low_field_zone(), Some(LowFieldZone::Blackout));
        assert_eq!(field.err_d(), 180.0);
        assert!(field.dd().is_finite() && field.di().is_finite());
        assert!(matches!(
            field.warnings()[..],
            [FieldWarning::LowHorizontalField { zone: LowFieldZone::Blackout, .. }]
        ));
    }

    #[test]
    fn coverage_gap_becomes_a_warning() {
        let gap = CoverageError {
            latitude: 1.0,
            longitude: 2.0,
            reason: "test".to_string(),
        };
        let field = field_at(45.0, 10.0, sample()).with_coverage_gap(Some(gap.clone()));
        assert_eq!(field.warnings(), vec![FieldWarning::Coverage(gap)]);
        assert!(!field.is_extrapolated());
    }
}
