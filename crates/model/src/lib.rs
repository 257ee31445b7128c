use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
pub use serde_with;
use utility::id::{HasId, Id};

pub mod fleet;
pub mod geo;
pub mod product;
pub mod progress;
pub mod route;
pub mod shipment;
pub mod user;

/// A backend record: the primary key next to the flattened content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "V: Serialize, V::IdType: Serialize",
    deserialize = "V: Deserialize<'de>, V::IdType: Deserialize<'de> + FromStr, \
                   <V::IdType as FromStr>::Err: fmt::Display"
))]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: fmt::Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: fmt::Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

/// User input rejected before it is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.message)
    }
}
