// WGS-84 reference ellipsoid
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0; // m
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
pub const WGS84_ECCENTRICITY_SQUARED: f64 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

/// Geomagnetic reference radius used by the WMM family of models
pub const GEOMAGNETIC_REFERENCE_RADIUS: f64 = 6_371_200.0; // m

pub const KM_TO_M: f64 = 1000.0;
