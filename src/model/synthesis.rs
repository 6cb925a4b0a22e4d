//! Spherical-harmonic synthesis of the field vector from a coefficient table.
use crate::model::coefficients::CoefficientSet;
use crate::model::legendre::LegendreTable;
use crate::time::DecimalYear;

/// A vector in geocentric spherical components: radial (outward), colatitudinal (southward)
/// and longitudinal (eastward), nT or nT/year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SphericalVector {
    pub r: f64,
    pub theta: f64,
    pub phi: f64,
}

/// Field vector and its secular rate at one point, geocentric spherical components
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeocentricField {
    pub field: SphericalVector,
    pub secular: SphericalVector,
}

/// cos(mλ) and sin(mλ) for m = 0..=max_order, built by angle addition
fn longitude_harmonics(max_order: usize, longitude: f64) -> (Vec<f64>, Vec<f64>) {
    let mut cos_m = vec![1.0; max_order + 1];
    let mut sin_m = vec![0.0; max_order + 1];
    if max_order > 0 {
        (sin_m[1], cos_m[1]) = longitude.sin_cos();
    }
    for m in 2..=max_order {
        cos_m[m] = cos_m[m - 1] * cos_m[1] - sin_m[m - 1] * sin_m[1];
        sin_m[m] = sin_m[m - 1] * cos_m[1] + cos_m[m - 1] * sin_m[1];
    }
    (cos_m, sin_m)
}

/// Sums the gradient of the magnetic potential at a geocentric radius (m) and longitude
/// (radians), at the colatitude the Legendre table was evaluated for.
///
/// Coefficients are extrapolated linearly from the model epoch to `time`. The secular rate
/// vector is the same sum over the secular-variation coefficients, so it is exact rather than a
/// numerical derivative. Degrees beyond either the model or the table are ignored.
pub fn synthesize(
    coefficients: &CoefficientSet,
    legendre: &LegendreTable,
    time: DecimalYear,
    radius: f64,
    longitude: f64,
) -> GeocentricField {
    let max_degree = coefficients.max_degree().min(legendre.max_degree());
    let years = time.years_since(coefficients.epoch());
    let (cos_m, sin_m) = longitude_harmonics(max_degree, longitude);
    let ratio = coefficients.reference_radius() / radius;

    let mut field = SphericalVector::default();
    let mut secular = SphericalVector::default();

    // (a/r)^(n+2), starting from n = 1
    let mut radial_factor = ratio * ratio * ratio;
    for n in 1..=max_degree {
        let nf = n as f64;
        for m in 0..=n {
            let c = coefficients.get(n, m);
            let (g, h) = c.at(years);
            let (cos, sin) = (cos_m[m], sin_m[m]);
            let p = legendre.p(n, m);
            let dp = legendre.dp(n, m);
            let mf = m as f64;

            let in_phase = g * cos + h * sin;
            let quadrature = g * sin - h * cos;
            field.r += (nf + 1.0) * radial_factor * in_phase * p;
            field.theta -= radial_factor * in_phase * dp;

            let rate_in_phase = c.dg * cos + c.dh * sin;
            let rate_quadrature = c.dg * sin - c.dh * cos;
            secular.r += (nf + 1.0) * radial_factor * rate_in_phase * p;
            secular.theta -= radial_factor * rate_in_phase * dp;

            if m > 0 {
                let p_over_sin = legendre.p_over_sin(n, m);
                field.phi += radial_factor * mf * quadrature * p_over_sin;
                secular.phi += radial_factor * mf * rate_quadrature * p_over_sin;
            }
        }
        radial_factor *= ratio;
    }

    GeocentricField { field, secular }
}
