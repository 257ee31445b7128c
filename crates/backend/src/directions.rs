use std::env;

use model::geo::GeoPoint;

use crate::{
    client::{http_client, read_json},
    model::directions::{Directions, DirectionsResponse},
    ApiError, ApiResult,
};

pub const DEFAULT_DIRECTIONS_URL: &str =
    "https://api.openrouteservice.org/v2/directions/driving-car";

#[derive(Clone, Debug)]
pub struct DirectionsConfig {
    pub url: String,
    pub api_key: String,
    pub proxy: Option<String>,
}

impl DirectionsConfig {
    /// `None` without an api key, which disables road routing.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("DIRECTIONS_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())?;
        let url = env::var("DIRECTIONS_URL")
            .unwrap_or_else(|_| DEFAULT_DIRECTIONS_URL.to_owned());
        let proxy = env::var("BACKEND_PROXY").ok().filter(|p| !p.is_empty());
        Some(Self {
            url,
            api_key,
            proxy,
        })
    }
}

/// Client of the road routing provider.
#[derive(Clone, Debug)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    http: reqwest::Client,
}

fn position(point: &GeoPoint) -> String {
    format!("{},{}", point.longitude, point.latitude)
}

impl DirectionsClient {
    pub fn new(config: &DirectionsConfig) -> ApiResult<Self> {
        Ok(Self {
            config: config.clone(),
            http: http_client(config.proxy.as_deref())?,
        })
    }

    pub async fn route(&self, start: &GeoPoint, end: &GeoPoint) -> ApiResult<Directions> {
        let url = self.config.url.clone();
        log::debug!("GET '{url}' from {start} to {end}");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("start", position(start).as_str()),
                ("end", position(end).as_str()),
            ])
            .send()
            .await?;
        let answer: DirectionsResponse = read_json(response, url).await?;
        answer
            .into_directions()?
            .ok_or_else(|| ApiError::Unavailable(format!("road route from {start} to {end}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_longitude_first() {
        assert_eq!(position(&GeoPoint::new(9.5, 77.25)), "77.25,9.5");
    }
}
