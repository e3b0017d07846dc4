//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the engine's fixed-step loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is created. Spawn scene nodes and attach
    /// motion trackers here; trackers read their initial transform on attach.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Advance game logic by one fixed step
    ///
    /// Runs before the motion vector system in the same step, so motion
    /// applied here is published on this step.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `step_secs` - Fixed step length in seconds
    fn fixed_update(&mut self, engine: &mut Engine, step_secs: f32) -> Result<(), AppError>;

    /// Cleanup the application
    ///
    /// Called once when the loop ends.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
