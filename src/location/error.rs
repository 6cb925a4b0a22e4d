use thiserror::Error;

/// Errors raised while building or querying a `Location`
#[derive(Error, Debug)]
pub enum LocationError {
    /// Latitude or longitude outside the accepted input domain
    #[error("{0}")]
    Range(String),

    /// The geoid undulation grid could not be loaded
    #[error("{0}")]
    Geoid(#[from] GeoidError),
}

/// The undulation grid has no data at the requested point. Carried alongside a best-effort
/// result rather than aborting the query.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("No geoid undulation coverage at latitude {latitude}, longitude {longitude}: {reason}")]
pub struct CoverageError {
    pub latitude: f64,
    pub longitude: f64,
    pub reason: String,
}

/// Errors raised while loading a geoid undulation grid
#[derive(Error, Debug)]
pub enum GeoidError {
    /// Malformed grid source
    #[error("Invalid undulation grid: {0}")]
    Parse(String),

    /// The built-in grid is missing or unreadable
    #[error("Built-in undulation grid unavailable: {0}")]
    Embedded(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
