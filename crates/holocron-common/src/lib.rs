//! Holocron Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared infrastructure for the Holocron workspace. Today this is the
//! logging layer used by both the server and the one-shot import binary,
//! so the two produce identically shaped log output.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};
