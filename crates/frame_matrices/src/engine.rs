//! Core engine implementation

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    application::Application,
    config::{Config, ConfigError},
    foundation::time::{FixedTimestep, Timer},
    motion::{MotionError, MotionVectorConfig, MotionVectorSystem},
    scene::SceneGraph,
};

/// Main engine struct
///
/// Owns the scene and the motion vector system and runs them on a fixed
/// timestep. Each fixed step runs application logic first, then ticks every
/// motion tracker.
pub struct Engine {
    /// Scene graph holding every tracked object
    pub scene: SceneGraph,

    /// Motion vector system publishing model matrices
    pub motion: MotionVectorSystem,

    /// Fixed-step accumulator
    fixed: FixedTimestep,

    /// Frame timing
    timer: Timer,

    /// Engine configuration
    config: EngineConfig,

    /// Fixed steps run since creation
    steps_run: u64,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        config.validate()?;
        let motion = MotionVectorSystem::from_config(config.motion.clone())?;
        let fixed = FixedTimestep::from_hz(config.fixed_timestep_hz, config.max_steps_per_frame)
            .ok_or_else(|| ConfigError::Invalid(format!("unusable fixed_timestep_hz {}", config.fixed_timestep_hz)))?;

        log::info!(
            "Fixed timestep: {:.2} Hz ({:.4}s per step)",
            config.fixed_timestep_hz,
            fixed.step_secs()
        );

        Ok(Self {
            scene: SceneGraph::new(),
            motion,
            fixed,
            timer: Timer::new(),
            config,
            steps_run: 0,
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    ///
    /// Blocks until the application calls [`Engine::request_exit`].
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        engine.timer.reset();
        let result = engine.run_loop(app);

        log::info!("Shutting down engine...");
        app.cleanup(&mut engine);

        result
    }

    fn run_loop<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        while self.running {
            self.timer.update();
            let delta = Duration::from_secs_f32(self.timer.delta_time());
            self.step(delta, app)?;

            let until_next_step = self.fixed.step().saturating_sub(self.fixed.remainder());
            std::thread::sleep(until_next_step);
        }
        Ok(())
    }

    /// Feed `delta` of elapsed time and run every fixed step that is due
    ///
    /// Returns the number of fixed steps run. Stops early when the
    /// application requests exit.
    pub fn step<T: Application>(&mut self, delta: Duration, app: &mut T) -> Result<u32, EngineError> {
        let due = self.fixed.advance(delta);
        let step_secs = self.fixed.step_secs();

        let mut ran = 0;
        for _ in 0..due {
            if !self.running {
                break;
            }
            app.fixed_update(self, step_secs)
                .map_err(|e| EngineError::ApplicationError(format!("App fixed update: {e}")))?;
            self.motion.run(&self.scene);
            self.steps_run += 1;
            ran += 1;
        }
        Ok(ran)
    }

    /// Request the engine to exit
    pub fn request_exit(&mut self) {
        self.running = false;
    }

    /// Whether the main loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Fixed steps run since creation
    pub fn total_steps(&self) -> u64 {
        self.steps_run
    }

    /// Fixed step length in seconds
    pub fn step_secs(&self) -> f32 {
        self.fixed.step_secs()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed simulation steps per second
    pub fixed_timestep_hz: f64,

    /// Cap on fixed steps run in one frame
    pub max_steps_per_frame: u32,

    /// Motion vector settings
    pub motion: MotionVectorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_hz: 50.0,
            max_steps_per_frame: 8,
            motion: MotionVectorConfig::default(),
        }
    }
}

impl Config for EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if FixedTimestep::step_for_hz(self.fixed_timestep_hz).is_none() {
            return Err(ConfigError::Invalid(format!(
                "fixed_timestep_hz must give a positive, representable step, got {}",
                self.fixed_timestep_hz
            )));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid("max_steps_per_frame must be at least 1".to_string()));
        }
        self.motion.validate()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Motion tracking error
    #[error("Motion error: {0}")]
    Motion(#[from] MotionError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}
