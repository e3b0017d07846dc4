//! Motion vector system
//!
//! Owns one [`FrameMatrixTracker`] per tracked scene node and ticks them all
//! once per fixed step. Frame state is discarded when a node is detached or
//! despawned.

use slotmap::SecondaryMap;

use super::config::MotionVectorConfig;
use super::tracker::{FrameMatrixTracker, PublishedMatrices};
use super::MotionError;
use crate::config::Config;
use crate::render::SharedMaterial;
use crate::scene::{NodeId, SceneGraph};

#[derive(Debug)]
struct TrackedObject {
    tracker: FrameMatrixTracker,
    material: SharedMaterial,
    last_published: Option<PublishedMatrices>,
}

/// Drives the frame matrix trackers of every tracked scene node
#[derive(Debug, Default)]
pub struct MotionVectorSystem {
    config: MotionVectorConfig,
    tracked: SecondaryMap<NodeId, TrackedObject>,
}

impl MotionVectorSystem {
    /// Create a system whose trackers use `config`
    pub fn new(config: MotionVectorConfig) -> Self {
        Self {
            config,
            tracked: SecondaryMap::new(),
        }
    }

    /// Create a system after checking `config`
    pub fn from_config(config: MotionVectorConfig) -> Result<Self, MotionError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Start tracking `node`, publishing into `material`
    ///
    /// The tracker is initialized immediately from the node's current world
    /// transform. Attaching an already tracked node restarts its history.
    pub fn attach(
        &mut self,
        scene: &SceneGraph,
        node: NodeId,
        material: SharedMaterial,
    ) -> Result<(), MotionError> {
        let object = scene.object(node)?;

        let mut tracker = FrameMatrixTracker::new(self.config.clone());
        tracker.initialize(&object);

        let replaced = self
            .tracked
            .insert(node, TrackedObject {
                tracker,
                material,
                last_published: None,
            })
            .is_some();
        if replaced {
            log::debug!("Re-attached motion tracker to {node:?}, history restarted");
        } else {
            log::debug!("Attached motion tracker to {node:?}");
        }
        Ok(())
    }

    /// Stop tracking `node`; returns whether it was tracked
    pub fn detach(&mut self, node: NodeId) -> bool {
        self.tracked.remove(node).is_some()
    }

    /// Tick every tracker once; returns how many were ticked
    ///
    /// Trackers whose node no longer exists are dropped.
    pub fn run(&mut self, scene: &SceneGraph) -> usize {
        let before = self.tracked.len();
        self.tracked.retain(|node, _| scene.contains(node));
        let dropped = before - self.tracked.len();
        if dropped > 0 {
            log::debug!("Dropped {dropped} motion tracker(s) for despawned nodes");
        }

        let mut ticked = 0;
        for (node, tracked) in &mut self.tracked {
            let Ok(object) = scene.object(node) else {
                continue;
            };
            let published = tracked.tracker.tick(&object, &mut tracked.material);
            tracked.last_published = Some(published);
            ticked += 1;
        }

        log::trace!("Motion vector system ticked {ticked} tracker(s)");
        ticked
    }

    /// Whether `node` is tracked
    pub fn is_tracked(&self, node: NodeId) -> bool {
        self.tracked.contains_key(node)
    }

    /// Number of tracked nodes
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Tracker for a node
    pub fn tracker(&self, node: NodeId) -> Option<&FrameMatrixTracker> {
        self.tracked.get(node).map(|t| &t.tracker)
    }

    /// Material a node publishes into
    pub fn material(&self, node: NodeId) -> Option<&SharedMaterial> {
        self.tracked.get(node).map(|t| &t.material)
    }

    /// Matrices published for a node by the latest `run`
    pub fn published(&self, node: NodeId) -> Option<&PublishedMatrices> {
        self.tracked.get(node).and_then(|t| t.last_published.as_ref())
    }

    /// Configuration given to new trackers
    pub fn config(&self) -> &MotionVectorConfig {
        &self.config
    }
}
