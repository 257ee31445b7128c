use std::fmt;

use serde::Serialize;

/// Where a fix sits on its route. Derived anew from route and fix on every
/// update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub closest_route_index: usize,
    pub remaining_distance_meters: f64,
}

impl ProgressState {
    pub fn remaining_km(&self) -> f64 {
        self.remaining_distance_meters / 1000.0
    }

    pub fn has_arrived(&self) -> bool {
        self.remaining_distance_meters == 0.0
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Remaining Distance: {:.2} KM", self.remaining_km())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_distance_is_shown_in_kilometers() {
        let progress = ProgressState {
            closest_route_index: 3,
            remaining_distance_meters: 12_346.0,
        };
        assert_eq!(progress.to_string(), "Remaining Distance: 12.35 KM");
        assert!(!progress.has_arrived());

        let arrived = ProgressState {
            closest_route_index: 9,
            remaining_distance_meters: 0.0,
        };
        assert_eq!(arrived.to_string(), "Remaining Distance: 0.00 KM");
        assert!(arrived.has_arrived());
    }
}
