//! Starship catalog endpoints

pub mod routes;

pub use routes::starships_routes;
