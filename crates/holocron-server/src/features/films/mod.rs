//! Film catalog endpoints

pub mod routes;

pub use routes::films_routes;
