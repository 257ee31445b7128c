use model::{
    geo::{GeoPoint, InvalidCoordinate},
    route::Route,
};
use serde::Deserialize;
use tracking::TrackingError;

/// A routing provider answer, either GeoJSON or an encoded polyline.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DirectionsResponse {
    GeoJson { features: Vec<Feature> },
    Encoded { routes: Vec<EncodedRoute> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub geometry: LineString,
    #[serde(default)]
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineString {
    pub coordinates: Vec<Position>,
}

/// A GeoJSON position, `[longitude, latitude]` optionally followed by an
/// elevation, which is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values[..] {
            [longitude, latitude, ..] => Ok(Self {
                longitude,
                latitude,
            }),
            _ => Err(format!(
                "a position needs longitude and latitude, got {} values",
                values.len()
            )),
        }
    }
}

impl Position {
    fn to_point(self) -> Result<GeoPoint, InvalidCoordinate> {
        GeoPoint::new(self.latitude, self.longitude).validate()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub segments: Vec<Summary>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodedRoute {
    pub geometry: String,
    #[serde(default)]
    pub summary: Summary,
}

/// Road geometry between two points and its length in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    pub route: Route,
    pub distance_meters: f64,
}

impl DirectionsResponse {
    /// The first route of the answer. `None` if the provider found no route.
    pub fn into_directions(self) -> Result<Option<Directions>, TrackingError> {
        match self {
            Self::GeoJson { features } => {
                let Some(feature) = features.into_iter().next() else {
                    return Ok(None);
                };
                let points = feature
                    .geometry
                    .coordinates
                    .into_iter()
                    .map(Position::to_point)
                    .collect::<Result<Vec<_>, _>>()?;
                let properties = feature.properties;
                let distance_meters = properties
                    .segments
                    .first()
                    .or(properties.summary.as_ref())
                    .map(|summary| summary.distance)
                    .unwrap_or_default();
                Ok(Some(Directions {
                    route: Route::new(points),
                    distance_meters,
                }))
            }
            Self::Encoded { routes } => {
                let Some(route) = routes.into_iter().next() else {
                    return Ok(None);
                };
                let points = Route::from_polyline(&route.geometry)?
                    .points()
                    .iter()
                    .map(|point| point.validate())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Directions {
                    route: Route::new(points),
                    distance_meters: route.summary.distance,
                }))
            }
        }
    }
}
