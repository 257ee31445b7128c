use std::{error, fmt};

use model::geo::InvalidCoordinate;
use utility::polyline::PolylineError;

pub mod tracker;

pub use tracker::{RemainingPolicy, RouteProgressTracker};

#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// The route geometry could not be decoded.
    MalformedPolyline(PolylineError),
    /// There is no route to measure progress against yet.
    EmptyRoute,
    InvalidCoordinate(InvalidCoordinate),
}

pub type TrackingResult<T> = Result<T, TrackingError>;

impl error::Error for TrackingError {}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MalformedPolyline(why) => write!(f, "malformed polyline: {}", why),
            Self::EmptyRoute => write!(f, "no route available yet"),
            Self::InvalidCoordinate(why) => write!(f, "{}", why),
        }
    }
}

impl From<PolylineError> for TrackingError {
    fn from(why: PolylineError) -> Self {
        Self::MalformedPolyline(why)
    }
}

impl From<InvalidCoordinate> for TrackingError {
    fn from(why: InvalidCoordinate) -> Self {
        Self::InvalidCoordinate(why)
    }
}
