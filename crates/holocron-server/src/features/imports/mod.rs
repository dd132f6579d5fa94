//! Import trigger endpoint

pub mod routes;

pub use routes::imports_routes;
