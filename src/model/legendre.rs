//! Schmidt quasi-normalized associated Legendre functions of cos(colatitude) and their
//! derivatives with respect to colatitude.
//!
//! The table is built with the standard degree recurrences, which never divide by
//! sin(colatitude) and never form factorials, so every entry stays finite at the poles and at
//! high degree.

/// Below this |sin(colatitude)| a point is treated as lying on the pole
pub const POLE_EPSILON: f64 = 1e-10;

/// P(n, m) and dP(n, m)/dθ for 0 <= m <= n <= max_degree at a single colatitude
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    max_degree: usize,
    colatitude: f64, // radians
    cos_theta: f64,
    sin_theta: f64,
    p: Vec<f64>,
    dp: Vec<f64>,
}

fn index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

impl LegendreTable {
    /// Evaluates the table at a colatitude in radians.
    pub fn evaluate(max_degree: usize, colatitude: f64) -> LegendreTable {
        let (sin_theta, cos_theta) = colatitude.sin_cos();
        let size = index(max_degree + 1, 0);
        let mut p = vec![0.0; size];
        let mut dp = vec![0.0; size];

        p[0] = 1.0;
        for n in 1..=max_degree {
            let nf = n as f64;

            // Sectoral term from the previous diagonal
            let (diag, diag_prev) = (index(n, n), index(n - 1, n - 1));
            let k = if n == 1 {
                1.0
            } else {
                ((2.0 * nf - 1.0) / (2.0 * nf)).sqrt()
            };
            p[diag] = k * sin_theta * p[diag_prev];
            dp[diag] = k * (cos_theta * p[diag_prev] + sin_theta * dp[diag_prev]);

            // Remaining orders from the two previous degrees
            for m in 0..n {
                let mf = m as f64;
                let prev = index(n - 1, m);
                let (p2, dp2) = if n >= m + 2 {
                    let i = index(n - 2, m);
                    (p[i], dp[i])
                } else {
                    (0.0, 0.0)
                };
                let a = (2.0 * nf - 1.0) / (nf * nf - mf * mf).sqrt();
                let b = (((nf - 1.0) * (nf - 1.0) - mf * mf) / (nf * nf - mf * mf)).sqrt();
                p[index(n, m)] = a * cos_theta * p[prev] - b * p2;
                dp[index(n, m)] = a * (cos_theta * dp[prev] - sin_theta * p[prev]) - b * dp2;
            }
        }

        LegendreTable {
            max_degree,
            colatitude,
            cos_theta,
            sin_theta,
            p,
            dp,
        }
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Colatitude the table was evaluated at, radians
    pub fn colatitude(&self) -> f64 {
        self.colatitude
    }

    pub fn sin_theta(&self) -> f64 {
        self.sin_theta
    }

    pub fn cos_theta(&self) -> f64 {
        self.cos_theta
    }

    /// Whether the table was evaluated on (or numerically at) a pole
    pub fn at_pole(&self) -> bool {
        self.sin_theta.abs() < POLE_EPSILON
    }

    /// P(n, m). Panics if m > n or n > max_degree.
    pub fn p(&self, n: usize, m: usize) -> f64 {
        assert!(m <= n && n <= self.max_degree);
        self.p[index(n, m)]
    }

    /// dP(n, m)/dθ. Panics if m > n or n > max_degree.
    pub fn dp(&self, n: usize, m: usize) -> f64 {
        assert!(m <= n && n <= self.max_degree);
        self.dp[index(n, m)]
    }

    /// P(n, m) / sin θ, the factor of the longitudinal field component. On a pole this takes
    /// its limiting value dP(n, m)/dθ / cos θ, which is non-zero only for m = 1.
    pub fn p_over_sin(&self, n: usize, m: usize) -> f64 {
        if self.at_pole() {
            self.dp(n, m) / self.cos_theta
        } else {
            self.p(n, m) / self.sin_theta
        }
    }
}
