use std::{env, time::Duration};

use serde::{de::DeserializeOwned, Serialize};

use crate::{ApiError, ApiResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub proxy: Option<String>,
}

impl BackendConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            proxy: None,
        }
    }

    pub fn from_env() -> Option<Self> {
        let base_url = env::var("BACKEND_URL").ok()?;
        let proxy = env::var("BACKEND_PROXY").ok().filter(|p| !p.is_empty());
        Some(Self { base_url, proxy })
    }
}

pub(crate) fn http_client(proxy: Option<&str>) -> ApiResult<reqwest::Client> {
    let builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
    let builder = match proxy {
        Some(proxy_url) => builder.proxy(reqwest::Proxy::all(proxy_url)?),
        None => builder,
    };
    Ok(builder.build()?)
}

/// Reads a JSON body from a successful response, or turns any other status
/// into `ApiError::InvalidResponse`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: String,
) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        let text = response.text().await?;
        return Ok(serde_json::from_str(&text)?);
    }
    log::debug!("request to '{url}' failed with {status}");
    match response.text().await {
        Ok(val) => Err(ApiError::InvalidResponse {
            status_code: status,
            url,
            response: Some(val),
        }),
        Err(_) => Err(ApiError::InvalidResponse {
            status_code: status,
            url,
            response: None,
        }),
    }
}

/// HTTP client for the marketplace backend. Cloning is cheap and shares the
/// connection pool.
#[derive(Clone, Debug)]
pub struct BackendClient {
    pub config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> ApiResult<Self> {
        if let Some(proxy_url) = &config.proxy {
            log::info!("Using proxy '{proxy_url}' for '{}'.", config.base_url);
        }
        Ok(Self {
            config: config.clone(),
            http: http_client(config.proxy.as_deref())?,
        })
    }

    /// Absolute url of an endpoint below `/api/`. Endpoints keep the trailing
    /// slash the backend expects.
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let url = self.url(endpoint);
        log::debug!("GET '{url}'");
        let response = self.http.get(&url).send().await?;
        read_json(response, url).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        log::debug!("POST '{url}'");
        let response = self.http.post(&url).json(body).send().await?;
        read_json(response, url).await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        log::debug!("PATCH '{url}'");
        let response = self.http.patch(&url).json(body).send().await?;
        read_json(response, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls() {
        let client = BackendClient::new(&BackendConfig::new("http://10.0.0.2:8000/")).unwrap();
        assert_eq!(client.url("shipment/"), "http://10.0.0.2:8000/api/shipment/");
        assert_eq!(client.url("/routes/4/"), "http://10.0.0.2:8000/api/routes/4/");
    }
}
