pub mod geo;
pub mod id;
pub mod polyline;
pub mod serde;
