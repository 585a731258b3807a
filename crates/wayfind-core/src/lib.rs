//! Domain types and configuration shared by the wayfind crates.

pub mod app_config;
pub mod config;
pub mod location;
pub mod place;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, GroundingTool};
pub use config::{load_app_config, load_app_config_from_env};
pub use location::{decompose_location, group_by_region, LocationParts, RegionGroup};
pub use place::{
    new_place_id, AnalysisResult, Category, Citation, Coordinates, PlaceRecord, PriceLevel,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
