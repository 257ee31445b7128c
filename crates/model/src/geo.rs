use std::{error::Error, fmt};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use utility::geo;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        geo::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn validate(self) -> Result<Self, InvalidCoordinate> {
        let valid = (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);
        if valid {
            Ok(self)
        } else {
            Err(InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Error for InvalidCoordinate {}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "coordinate out of range: latitude {}, longitude {}",
            self.latitude, self.longitude
        )
    }
}

/// The latest reported position of the tracked shipment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveFix {
    pub position: GeoPoint,
    pub received_at: DateTime<Local>,
}

impl LiveFix {
    pub fn new(position: GeoPoint) -> Self {
        Self {
            position,
            received_at: Local::now(),
        }
    }
}

impl From<GeoPoint> for LiveFix {
    fn from(position: GeoPoint) -> Self {
        Self::new(position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl Bounds {
    pub fn around<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for point in points {
            bounds.south_west.latitude = bounds.south_west.latitude.min(point.latitude);
            bounds.south_west.longitude =
                bounds.south_west.longitude.min(point.longitude);
            bounds.north_east.latitude = bounds.north_east.latitude.max(point.latitude);
            bounds.north_east.longitude =
                bounds.north_east.longitude.max(point.longitude);
        }
        Some(bounds)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.latitude + self.north_east.latitude) / 2.0,
            (self.south_west.longitude + self.north_east.longitude) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_out_of_range() {
        assert!(GeoPoint::new(90.0, -180.0).validate().is_ok());
        assert_eq!(
            GeoPoint::new(91.0, 0.0).validate(),
            Err(InvalidCoordinate {
                latitude: 91.0,
                longitude: 0.0
            })
        );
        assert!(GeoPoint::new(0.0, 180.5).validate().is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn bounds_cover_all_points() {
        let points = [
            GeoPoint::new(9.48, 77.51),
            GeoPoint::new(9.52, 77.40),
            GeoPoint::new(9.30, 77.60),
        ];
        let bounds = Bounds::around(&points).unwrap();
        assert_eq!(bounds.south_west, GeoPoint::new(9.30, 77.40));
        assert_eq!(bounds.north_east, GeoPoint::new(9.52, 77.60));
        assert!(Bounds::around(&[]).is_none());
    }
}
