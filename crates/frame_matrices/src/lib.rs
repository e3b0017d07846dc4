//! # Frame Matrices
//!
//! Per-object model matrix history for motion vectors and temporal reprojection.
//!
//! ## Features
//!
//! - **Frame Matrix Tracker**: Two-frame history of an object's world transform
//! - **Material Parameters**: Named shader-parameter sink for the published matrices
//! - **Scene Graph**: Parent/child transforms producing local-to-world matrices
//! - **Fixed-Step Host**: Minimal engine loop driving trackers once per simulation step
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_matrices::prelude::*;
//!
//! let mut scene = SceneGraph::new();
//! let node = scene.spawn(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
//! let material = SharedMaterial::new("motion_blur");
//!
//! let mut tracker = FrameMatrixTracker::new(MotionVectorConfig::default());
//! tracker.initialize(&scene.object(node).unwrap());
//!
//! scene.translate(node, Vec3::new(0.5, 0.0, 0.0)).unwrap();
//! let mut sink = material.clone();
//! let published = tracker.tick(&scene.object(node).unwrap(), &mut sink);
//! assert_eq!(material.matrix("CurrentFrameModelMatrix"), Some(published.current));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod render;
pub mod motion;

mod application;
mod engine;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineConfig, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineConfig, EngineError,
        config::{Config, ConfigError},
        foundation::{
            math::{Vec3, Mat4, Quat, Transform},
            time::{Timer, FixedTimestep},
        },
        scene::{SceneGraph, SceneObject, NodeId, SceneError, WorldTransformSource},
        render::{Material, MaterialParameters, SharedMaterial, MotionMatrixUniforms},
        motion::{
            FrameMatrixTracker, FrameState, PublishedMatrices,
            MotionVectorConfig, ParameterNames, SingularInversePolicy,
            MotionVectorSystem, MotionError,
        },
    };
}
