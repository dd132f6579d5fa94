//! Character catalog endpoints

pub mod routes;

pub use routes::characters_routes;
