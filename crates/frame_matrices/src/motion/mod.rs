//! Motion vector support
//!
//! Tracks each object's model matrix across two consecutive fixed steps and
//! publishes previous, current, and inverse-current matrices to the object's
//! material for motion blur and temporal anti-aliasing passes.

pub mod config;
pub mod tracker;
pub mod system;

pub use config::{MotionVectorConfig, ParameterNames, SingularInversePolicy};
pub use tracker::{FrameMatrixTracker, FrameState, PublishedMatrices};
pub use system::MotionVectorSystem;

use crate::config::ConfigError;
use crate::scene::SceneError;

/// Motion tracking errors
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// The tracked object is not in the scene
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Invalid motion vector configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
