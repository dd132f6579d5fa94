//! Shared utilities for feature modules

pub mod pagination;

pub use pagination::{ListEnvelope, PageNumber, PAGE_SIZE};
