//! Error types for router setup
//!
//! Runtime conditions (unknown devices, missed hits, abandoned clicks) are
//! handled inside the tracker and dispatcher. Only setup mistakes surface here.

use thiserror::Error;

use crate::event::DeviceId;

/// Errors surfaced to the caller of the router
#[derive(Debug, Error)]
pub enum RouterError {
    /// A tick was requested before a scene was attached
    #[error("no active scene attached to the input router")]
    NoActiveScene,

    /// The device table has no free slot left
    #[error("device table is full ({capacity} slots), cannot register device {device}")]
    DeviceTableFull { device: DeviceId, capacity: usize },

    /// A configuration value is outside its accepted range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration files or environment could not be loaded
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RouterError>;
