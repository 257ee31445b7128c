pub mod auth;
pub mod directions;
