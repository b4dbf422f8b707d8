#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Got an invalid parameter value in a function, or an unknown name when
    /// selecting a backend or a potential
    InvalidParameter(String),
    /// Error while serializing/deserializing parameters
    Json(serde_json::Error),
    /// A particle index was outside of the `[0, size)` range
    IndexOutOfRange {
        /// the offending index
        index: usize,
        /// number of particles in the list
        size: usize,
    },
    /// An operation was called on an object which is not in the right state
    /// for it (e.g. querying a neighbor list which was never built)
    Precondition(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::IndexOutOfRange { index, size } => write!(
                f, "particle index {} is out of range for a list of {} particles", index, size
            ),
            Error::Precondition(e) => write!(f, "precondition violated: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidParameter(_) |
            Error::IndexOutOfRange { .. } |
            Error::Precondition(_) => None,
            Error::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}

/// Check that `index` is a valid particle index for a list of `size`
/// particles
#[inline]
pub(crate) fn check_index(index: usize, size: usize) -> Result<(), Error> {
    if index < size {
        return Ok(());
    }
    return Err(Error::IndexOutOfRange { index: index, size: size });
}

/// Check that the given `positions` contain three finite coordinates per
/// particle
pub(crate) fn check_positions(positions: &ndarray::ArrayView2<'_, f64>) -> Result<(), Error> {
    if positions.ncols() != 3 {
        return Err(Error::InvalidParameter(format!(
            "positions must have a shape of (n_particles, 3), got ({}, {})",
            positions.nrows(), positions.ncols()
        )));
    }

    for (particle, position) in positions.rows().into_iter().enumerate() {
        if !position.iter().all(|value| value.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "position of particle {} is not finite: [{}, {}, {}]",
                particle, position[0], position[1], position[2]
            )));
        }
    }

    return Ok(());
}
