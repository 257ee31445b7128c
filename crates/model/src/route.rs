use serde::{Deserialize, Serialize};
use utility::{
    geo,
    id::HasId,
    polyline::{self, PolylineError},
};

use crate::geo::{Bounds, GeoPoint, InvalidCoordinate};

/// Ordered path of a shipment. Halts are markers shown along the way and do
/// not take part in distance computations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    points: Vec<GeoPoint>,
    halts: Vec<GeoPoint>,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            halts: Vec::new(),
        }
    }

    pub fn with_halts(mut self, halts: Vec<GeoPoint>) -> Self {
        self.halts = halts;
        self
    }

    /// Builds a route from an encoded polyline, keeping the encoded order.
    pub fn from_polyline(encoded: &str) -> Result<Self, PolylineError> {
        let points = polyline::decode(encoded)?
            .into_iter()
            .map(GeoPoint::from)
            .collect();
        Ok(Self::new(points))
    }

    pub fn to_polyline(&self) -> String {
        polyline::encode(self.points.iter().map(GeoPoint::as_tuple))
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn halts(&self) -> &[GeoPoint] {
        &self.halts
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn origin(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    pub fn destination(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    /// Length of the path in meters.
    pub fn length_meters(&self) -> f64 {
        geo::path_length(self.points.iter().map(GeoPoint::as_tuple))
    }

    /// Bounding box of path and halts, used to frame the map.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(self.points.iter().chain(self.halts.iter()))
    }
}

/// A coordinate as the backend stores it: `lat`/`lon`, usually as strings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(with = "utility::serde::coordinate")]
    pub lat: f64,
    #[serde(with = "utility::serde::coordinate")]
    pub lon: f64,
}

impl Waypoint {
    pub fn to_point(self) -> Result<GeoPoint, InvalidCoordinate> {
        GeoPoint::new(self.lat, self.lon).validate()
    }
}

impl From<GeoPoint> for Waypoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.latitude,
            lon: point.longitude,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Halts {
    #[serde(default)]
    pub data: Vec<Waypoint>,
}

/// Route metadata of a shipment as served by `/api/routes/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub source: Waypoint,
    pub destination: Waypoint,
    pub current_location: Waypoint,
    #[serde(default)]
    pub halt: Halts,
}

impl HasId for RouteRecord {
    type IdType = u64;
}

impl RouteRecord {
    /// A new record starts with the tracked position at the source.
    pub fn new(source: GeoPoint, destination: GeoPoint, halts: &[GeoPoint]) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            current_location: source.into(),
            halt: Halts {
                data: halts.iter().copied().map(Waypoint::from).collect(),
            },
        }
    }

    pub fn source(&self) -> Result<GeoPoint, InvalidCoordinate> {
        self.source.to_point()
    }

    pub fn destination(&self) -> Result<GeoPoint, InvalidCoordinate> {
        self.destination.to_point()
    }

    pub fn current_location(&self) -> Result<GeoPoint, InvalidCoordinate> {
        self.current_location.to_point()
    }

    pub fn halts(&self) -> Result<Vec<GeoPoint>, InvalidCoordinate> {
        self.halt.data.iter().map(|halt| halt.to_point()).collect()
    }

    /// The route used when no road geometry is available: a direct path from
    /// source to destination, annotated with the halts.
    pub fn direct_route(&self) -> Result<Route, InvalidCoordinate> {
        Ok(Route::new(vec![self.source()?, self.destination()?])
            .with_halts(self.halts()?))
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;

    use super::*;
    use crate::WithId;

    #[test]
    fn route_from_polyline_keeps_order() {
        let route = Route::from_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(route.len(), 3);
        let origin = route.origin().unwrap();
        let destination = route.destination().unwrap();
        assert_float_absolute_eq!(origin.latitude, 38.5, 1e-9);
        assert_float_absolute_eq!(destination.longitude, -126.453, 1e-9);
        assert_eq!(route.to_polyline(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn halts_do_not_add_length() {
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)]);
        let with_halts = route.clone().with_halts(vec![GeoPoint::new(5.0, 5.0)]);
        assert_eq!(route.length_meters(), with_halts.length_meters());
        assert_eq!(with_halts.bounds().unwrap().north_east, GeoPoint::new(5.0, 5.0));
    }

    #[test]
    fn route_record_from_backend_json() {
        let json = r#"{
            "id": 12,
            "source": {"lat": "9.482616", "lon": "77.514253"},
            "destination": {"lat": 9.5, "lon": 77.6},
            "current_location": {"lat": "9.49", "lon": "77.55"},
            "halt": {"data": [{"lat": "9.485", "lon": "77.52"}]}
        }"#;
        let record: WithId<RouteRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.raw(), 12);
        assert_eq!(
            record.content.current_location().unwrap(),
            GeoPoint::new(9.49, 77.55)
        );

        let route = record.content.direct_route().unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.halts(), &[GeoPoint::new(9.485, 77.52)]);
    }

    #[test]
    fn route_record_without_halts() {
        let json = r#"{
            "source": {"lat": "1", "lon": "2"},
            "destination": {"lat": "3", "lon": "4"},
            "current_location": {"lat": "1", "lon": "2"}
        }"#;
        let record: RouteRecord = serde_json::from_str(json).unwrap();
        assert!(record.halts().unwrap().is_empty());
    }

    #[test]
    fn new_record_serializes_coordinates_as_strings() {
        let record = RouteRecord::new(
            GeoPoint::new(9.5, 77.25),
            GeoPoint::new(10.0, 78.0),
            &[GeoPoint::new(9.75, 77.5)],
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source"]["lat"], "9.5");
        assert_eq!(json["current_location"]["lon"], "77.25");
        assert_eq!(json["halt"]["data"][0]["lat"], "9.75");
    }

    #[test]
    fn out_of_range_record_is_rejected() {
        let json = r#"{
            "source": {"lat": "100", "lon": "2"},
            "destination": {"lat": "3", "lon": "4"},
            "current_location": {"lat": "1", "lon": "2"}
        }"#;
        let record: RouteRecord = serde_json::from_str(json).unwrap();
        assert!(record.direct_route().is_err());
    }
}
