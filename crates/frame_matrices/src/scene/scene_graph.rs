//! Transform hierarchy
//!
//! Nodes live in a slotmap so stale ids are detected instead of aliasing a
//! newer node. Despawning a node despawns its whole subtree, so every live
//! node's parent chain is live as well.

use slotmap::{new_key_type, SlotMap};

use super::{SceneError, WorldTransformSource};
use crate::foundation::math::{Mat4, Transform, Vec3};

new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeId;
}

#[derive(Debug, Clone)]
struct SceneNode {
    local: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parent/child hierarchy of local transforms
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
}

impl SceneGraph {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node
    pub fn spawn(&mut self, local: Transform) -> NodeId {
        self.nodes.insert(SceneNode {
            local,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Add a node under `parent`; `local` is relative to the parent
    pub fn spawn_child(&mut self, parent: NodeId, local: Transform) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::ParentNotFound(parent));
        }

        let child = self.nodes.insert(SceneNode {
            local,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child);
        }
        Ok(child)
    }

    /// Remove a node and its whole subtree; returns how many nodes were removed
    pub fn despawn(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))?.parent;
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }

        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
                removed += 1;
            }
        }

        log::trace!("Despawned {removed} scene node(s)");
        Ok(removed)
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Local transform of a node
    pub fn local(&self, id: NodeId) -> Result<&Transform, SceneError> {
        self.nodes
            .get(id)
            .map(|node| &node.local)
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Mutable local transform of a node
    pub fn local_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.nodes
            .get_mut(id)
            .map(|node| &mut node.local)
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Replace a node's local transform
    pub fn set_local(&mut self, id: NodeId, local: Transform) -> Result<(), SceneError> {
        *self.local_mut(id)? = local;
        Ok(())
    }

    /// Move a node by `offset` in its parent's space
    pub fn translate(&mut self, id: NodeId, offset: Vec3) -> Result<(), SceneError> {
        self.local_mut(id)?.position += offset;
        Ok(())
    }

    /// Parent of a node, `None` for roots
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        self.nodes
            .get(id)
            .map(|node| node.parent)
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Direct children of a node
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Local-to-world matrix: parent chain product, root first
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let node = self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))?;

        let mut matrix = node.local.to_matrix();
        let mut parent = node.parent;
        while let Some(parent_id) = parent {
            let parent_node = self
                .nodes
                .get(parent_id)
                .ok_or(SceneError::NodeNotFound(parent_id))?;
            matrix = parent_node.local.to_matrix() * matrix;
            parent = parent_node.parent;
        }
        Ok(matrix)
    }

    /// Borrowed view of a live node usable as a [`WorldTransformSource`]
    pub fn object(&self, id: NodeId) -> Result<SceneObject<'_>, SceneError> {
        if self.contains(id) {
            Ok(SceneObject { graph: self, node: id })
        } else {
            Err(SceneError::NodeNotFound(id))
        }
    }
}

/// A live node together with the graph that owns it
///
/// The shared borrow keeps the node alive for as long as the view exists.
#[derive(Debug, Clone, Copy)]
pub struct SceneObject<'a> {
    graph: &'a SceneGraph,
    node: NodeId,
}

impl SceneObject<'_> {
    /// Id of the viewed node
    pub fn id(&self) -> NodeId {
        self.node
    }
}

impl WorldTransformSource for SceneObject<'_> {
    fn world_matrix(&self) -> Mat4 {
        match self.graph.world_matrix(self.node) {
            Ok(world) => world,
            Err(e) => {
                log::warn!("Scene object {:?} has no world transform ({e}), using identity", self.node);
                Mat4::identity()
            }
        }
    }
}
