//! Published uncertainty estimates of the WMM family of models.

/// Largest angular uncertainty reported, degrees
const MAX_ANGULAR_ERROR: f64 = 180.0;

/// One-sigma uncertainties published alongside a model. Intensities in nT, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorModel {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub horizontal: f64,
    pub total: f64,
    pub inclination: f64,
    /// Flat part of the declination uncertainty, degrees
    pub declination_offset: f64,
    /// Declination uncertainty term that scales with 1/H, degrees times nT
    pub declination_scale: f64,
}

impl ErrorModel {
    pub const WMM2020: ErrorModel = ErrorModel {
        x: 131.0,
        y: 94.0,
        z: 157.0,
        horizontal: 128.0,
        total: 145.0,
        inclination: 0.21,
        declination_offset: 0.26,
        declination_scale: 5625.0,
    };

    pub const WMM2015: ErrorModel = ErrorModel {
        x: 138.0,
        y: 89.0,
        z: 165.0,
        horizontal: 133.0,
        total: 152.0,
        inclination: 0.22,
        declination_offset: 0.23,
        declination_scale: 5430.0,
    };

    /// Error model published for a model name, falling back to the most recent WMM.
    pub fn for_model(name: &str) -> ErrorModel {
        match name.replace('-', "").to_uppercase().as_str() {
            "WMM2015" | "WMM2015V2" => ErrorModel::WMM2015,
            _ => ErrorModel::WMM2020,
        }
    }

    /// Declination uncertainty in degrees for a horizontal intensity in nT. Grows without
    /// bound as H approaches zero, so it is clipped at 180 degrees.
    pub fn declination(&self, horizontal_intensity: f64) -> f64 {
        if horizontal_intensity <= 0.0 {
            return MAX_ANGULAR_ERROR;
        }
        let scaled = self.declination_scale / horizontal_intensity;
        (self.declination_offset * self.declination_offset + scaled * scaled)
            .sqrt()
            .min(MAX_ANGULAR_ERROR)
    }
}
