use std::error;
use std::fmt;
use std::sync::Arc;

use ::model::{geo::InvalidCoordinate, ValidationError};
use tracking::TrackingError;

pub mod auth;
pub mod client;
pub mod directions;
pub mod fleet;
pub mod marketplace;
pub mod model;
pub mod routes;
pub mod session;
pub mod shipments;
pub mod workflow;

pub use client::{BackendClient, BackendConfig};
pub use session::{Session, SessionManager};

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    /// The backend refused the request and told us why.
    Rejected(String),
    Validation(String),
    NotLoggedIn,
    Unavailable(String),
    Tracking(TrackingError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// The message the backend attached to a failed response, if any. The
    /// backend answers either `{"message": ".."}` or a map of field errors.
    pub fn backend_message(&self) -> Option<String> {
        match self {
            ApiError::Rejected(message) => Some(message.clone()),
            ApiError::InvalidResponse {
                response: Some(text),
                ..
            } => crate::model::auth::error_message(text),
            _ => None,
        }
    }

    /// Converts a failed response into `Rejected` when the backend explained
    /// itself.
    pub fn into_rejection(self) -> Self {
        match self.backend_message() {
            Some(message) => ApiError::Rejected(message),
            None => self,
        }
    }
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response({}) {}", status_code, url),
            },
            ApiError::Rejected(message) => write!(f, "{message}"),
            ApiError::Validation(message) => write!(f, "{message}"),
            ApiError::NotLoggedIn => write!(f, "Not logged in."),
            ApiError::Unavailable(what) => write!(f, "{what} is not available"),
            ApiError::Tracking(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::JsonError(Arc::new(e))
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<TrackingError> for ApiError {
    fn from(e: TrackingError) -> Self {
        ApiError::Tracking(e)
    }
}

impl From<InvalidCoordinate> for ApiError {
    fn from(e: InvalidCoordinate) -> Self {
        ApiError::Tracking(e.into())
    }
}
