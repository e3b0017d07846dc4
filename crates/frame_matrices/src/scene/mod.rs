//! Scene management system
//!
//! Holds the objects whose motion is tracked. Each node carries a local
//! transform relative to its parent; the world (local-to-world) matrix is the
//! product of the parent chain, root first.
//!
//! ## Architecture
//!
//! ```text
//! SceneGraph (local transforms)
//!      ↓  world_matrix()
//! WorldTransformSource
//!      ↓
//! FrameMatrixTracker → MaterialParameters
//! ```

mod scene_graph;

pub use scene_graph::{SceneGraph, SceneObject, NodeId};

use crate::foundation::math::{Mat4, Transform};

/// Read access to "this object's current world transform"
///
/// Implemented by scene objects, bare transforms, and plain matrices so that
/// trackers can be driven by any host.
pub trait WorldTransformSource {
    /// Local-to-world matrix at the time of the call
    fn world_matrix(&self) -> Mat4;
}

impl WorldTransformSource for Mat4 {
    fn world_matrix(&self) -> Mat4 {
        *self
    }
}

impl WorldTransformSource for Transform {
    fn world_matrix(&self) -> Mat4 {
        self.to_matrix()
    }
}

impl<T: WorldTransformSource + ?Sized> WorldTransformSource for &T {
    fn world_matrix(&self) -> Mat4 {
        (**self).world_matrix()
    }
}

/// Scene graph errors
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The node was never created or has been despawned
    #[error("Scene node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The requested parent was never created or has been despawned
    #[error("Parent node not found: {0:?}")]
    ParentNotFound(NodeId),
}
