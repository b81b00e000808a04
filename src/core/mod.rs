//! Core module - shared infrastructure for Telos
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Result, TelosError};
pub use types::*;
