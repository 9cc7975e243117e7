//! Common utilities module
//!
//! This module contains shared utilities used across the atlas pipeline.

pub mod error;

pub use error::{AtlasError, Result};
