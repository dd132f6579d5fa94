//! Data ingestion subsystem
//!
//! One source today: the remote Star Wars catalog mirrored by the
//! [`swapi`] pipeline.

pub mod swapi;
