use thiserror::Error;

use super::config::ConfigError;
use super::environment::EnvironmentError;
use super::geometry::GeometryError;
use super::services::ServiceError;
use crate::core::flux::FluxError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Flux setup failed: {source}")]
    Flux {
        #[from]
        source: FluxError,
    },

    #[error("Geometry setup failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Environment resolution failed: {source}")]
    Environment {
        #[from]
        source: EnvironmentError,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),
}
