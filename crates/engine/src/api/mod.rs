//! API entry points.

pub mod http;

pub use http::routes;
