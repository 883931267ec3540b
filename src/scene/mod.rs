//! Scene graph consumed by the input router
//!
//! Nodes live in an index-addressed arena. Node 0 is always the root. Each
//! node may own one listener, may opt out of event handling, and may carry a
//! world-space shape that rays can hit.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use scene_input::scene::{Scene, Shape};
//!
//! let mut scene = Scene::new();
//! let panel = scene.add_child(scene.root(), "panel");
//! let button = scene.add_child(panel, "button");
//! scene.set_shape(button, Shape::cuboid(Vec3::new(0.0, 0.0, -2.0), Vec3::splat(0.1)));
//!
//! assert_eq!(scene.parent(button), Some(panel));
//! ```

mod shape;

use std::fmt;

use glam::Vec3;

use crate::event::{EventAction, SharedListener};

pub use hit_test::{HitTestResult, HitTester};
pub use shape::{Aabb, Shape};

/// Index of a node in the scene arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A single scene node
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listener: Option<SharedListener>,
    ignore_events: bool,
    shape: Option<Shape>,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            listener: None,
            ignore_events: false,
            shape: None,
        }
    }
}

/// Raw intersection of a ray with one node's shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub node: NodeId,
    pub distance: f32,
    pub position: Vec3,
}

/// Arena-backed scene graph
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    /// Creates a scene containing only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("root".to_string(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// Adds a node under `parent`
    ///
    /// # Panics
    /// Panics if `parent` does not belong to this scene.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        assert!(self.contains(parent), "parent {parent} is not in this scene");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.into(), Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Moves `node` under `new_parent`
    ///
    /// Returns false (and changes nothing) when the move would detach the
    /// root or create a cycle.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> bool {
        if !self.contains(node) || !self.contains(new_parent) || node == self.root() {
            return false;
        }
        if self.ancestors(new_parent).any(|ancestor| ancestor == node) {
            return false;
        }

        if let Some(old_parent) = self.nodes[node.0].parent {
            self.nodes[old_parent.0].children.retain(|child| *child != node);
        }
        self.nodes[node.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(node);
        true
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|n| n.name.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates `node` and its ancestors up to the root
    ///
    /// The walk stops after visiting as many nodes as the arena holds, so a
    /// corrupt parent chain cannot loop forever.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.contains(node).then_some(node);
        std::iter::successors(start, move |current| self.parent(*current)).take(self.nodes.len())
    }

    pub fn set_listener(&mut self, node: NodeId, listener: SharedListener) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.listener = Some(listener);
        }
    }

    pub fn clear_listener(&mut self, node: NodeId) -> Option<SharedListener> {
        self.nodes.get_mut(node.0).and_then(|n| n.listener.take())
    }

    pub fn listener(&self, node: NodeId) -> Option<SharedListener> {
        self.nodes.get(node.0).and_then(|n| n.listener.clone())
    }

    pub fn set_ignore_events(&mut self, node: NodeId, ignore: bool) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.ignore_events = ignore;
        }
    }

    pub fn ignores_events(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.ignore_events)
    }

    pub fn set_shape(&mut self, node: NodeId, shape: Shape) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.shape = Some(shape);
        }
    }

    pub fn shape(&self, node: NodeId) -> Option<Shape> {
        self.nodes.get(node.0).and_then(|n| n.shape)
    }

    /// First node, starting at `node` and walking up, whose listener has
    /// `action` enabled
    pub fn handler_for(&self, action: EventAction, node: NodeId) -> Option<NodeId> {
        self.ancestors(node).find(|candidate| {
            self.nodes[candidate.0]
                .listener
                .as_ref()
                .and_then(|listener| listener.try_borrow().ok().map(|l| l.is_enabled(action)))
                .unwrap_or(false)
        })
    }

    /// All shapes the ray passes through, in depth-first pre-order from the root
    ///
    /// `direction` must be normalized so distances are in world units.
    pub fn intersect(&self, origin: Vec3, direction: Vec3, bounds_only: bool) -> Vec<SceneHit> {
        let mut hits = Vec::new();
        let mut stack = vec![self.root()];

        while let Some(node) = stack.pop() {
            let n = &self.nodes[node.0];
            if let Some(shape) = n.shape
                && let Some(distance) = shape.ray_distance(origin, direction, bounds_only)
            {
                hits.push(SceneHit {
                    node,
                    distance,
                    position: origin + direction * distance,
                });
            }
            // Reverse so the first child is visited first
            stack.extend(n.children.iter().rev().copied());
        }

        hits
    }

    /// Nodes not reachable from the root through child links
    pub fn orphans(&self) -> Vec<NodeId> {
        let mut reached = vec![false; self.nodes.len()];
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut reached[node.0], true) {
                continue;
            }
            stack.extend(self.nodes[node.0].children.iter().copied());
        }
        reached
            .iter()
            .enumerate()
            .filter(|(_, r)| !**r)
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Number of nodes that own a listener
    pub fn listener_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.listener.is_some()).count()
    }

    /// Number of nodes with a shape
    pub fn shape_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.shape.is_some()).count()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listener_count())
            .field("shapes", &self.shape_count())
            .finish()
    }
}
