use std::{fmt, str::FromStr, sync::Arc};

use model::{
    geo::{GeoPoint, LiveFix},
    progress::ProgressState,
    route::Route,
};
use utility::geo;

use crate::{TrackingError, TrackingResult};

/// How the distance left to travel is derived from the closest route point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemainingPolicy {
    /// Length of the path from the closest point to the end of the route.
    #[default]
    DirectPath,
    /// Total route length minus the length travelled up to the closest point,
    /// never below zero.
    TraveledSubtraction,
}

impl FromStr for RemainingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "direct-path" => Ok(Self::DirectPath),
            "traveled" | "travelled" | "traveled-subtraction" => {
                Ok(Self::TraveledSubtraction)
            }
            other => Err(format!("unknown remaining distance policy '{other}'")),
        }
    }
}

impl fmt::Display for RemainingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DirectPath => f.write_str("direct"),
            Self::TraveledSubtraction => f.write_str("traveled"),
        }
    }
}

fn path_length(points: &[GeoPoint]) -> f64 {
    geo::path_length(points.iter().map(GeoPoint::as_tuple))
}

/// Index of the route point closest to `position`. The first point wins on
/// exact ties.
fn closest_index(points: &[GeoPoint], position: &GeoPoint) -> Option<usize> {
    let mut closest: Option<(usize, f64)> = None;
    for (index, point) in points.iter().enumerate() {
        let distance = position.distance_to(point);
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((index, distance)),
        }
    }
    closest.map(|(index, _)| index)
}

/// Measures the progress of live fixes along one immutable route.
#[derive(Debug, Clone)]
pub struct RouteProgressTracker {
    route: Arc<Route>,
    policy: RemainingPolicy,
}

impl RouteProgressTracker {
    pub fn new<R: Into<Arc<Route>>>(route: R) -> Self {
        Self {
            route: route.into(),
            policy: RemainingPolicy::default(),
        }
    }

    pub fn from_polyline(encoded: &str) -> TrackingResult<Self> {
        Ok(Self::new(Route::from_polyline(encoded)?))
    }

    pub fn with_policy(mut self, policy: RemainingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn policy(&self) -> RemainingPolicy {
        self.policy
    }

    /// Replaces the route. Returns `false` if `route` equals the current one,
    /// in which case nothing changes.
    pub fn reset(&mut self, route: Arc<Route>) -> bool {
        if Arc::ptr_eq(&self.route, &route) || *self.route == *route {
            return false;
        }
        log::debug!(
            "tracker route replaced: {} -> {} points",
            self.route.len(),
            route.len()
        );
        self.route = route;
        true
    }

    pub fn update(&self, fix: &LiveFix) -> TrackingResult<ProgressState> {
        let points = self.route.points();
        let closest_route_index =
            closest_index(points, &fix.position).ok_or(TrackingError::EmptyRoute)?;

        let remaining_distance_meters = match self.policy {
            RemainingPolicy::DirectPath => path_length(&points[closest_route_index..]),
            RemainingPolicy::TraveledSubtraction => {
                let traveled = path_length(&points[..=closest_route_index]);
                let total = path_length(points);
                (total - traveled).max(0.0)
            }
        };

        Ok(ProgressState {
            closest_route_index,
            remaining_distance_meters,
        })
    }
}
