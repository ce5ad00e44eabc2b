//! Rendering boundary.
//!
//! Toplevels own a node in an external scene graph. The window manager only
//! creates, destroys, moves, resizes, shows, hides and raises nodes; pixel
//! composition is the collaborator's job.
//!
//! [`HeadlessScene`] keeps nodes in memory and logs every operation. The replay
//! CLI and the tests run against it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::geometry::Rect;
use crate::transport::SurfaceHandle;

/// Identifier of a node in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SceneNodeId(pub u64);

impl std::fmt::Display for SceneNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "node-{}", self.0) }
}

/// Errors reported by a scene.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    /// The scene could not allocate a node for the surface.
    #[error("failed to create scene node for surface {0}")]
    CreateFailed(SurfaceHandle),
}

/// The drawable-surface collaborator.
pub trait Scene: Send {
    /// Creates a node for `surface` at `geometry`. New nodes start hidden.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::CreateFailed`] if the node cannot be created.
    fn create_node(&mut self, surface: SurfaceHandle, geometry: Rect) -> Result<SceneNodeId, SceneError>;

    /// Releases a node. Unknown ids are ignored.
    fn destroy_node(&mut self, node: SceneNodeId);

    fn set_position(&mut self, node: SceneNodeId, x: i32, y: i32);

    fn set_size(&mut self, node: SceneNodeId, width: i32, height: i32);

    fn set_visible(&mut self, node: SceneNodeId, visible: bool);

    /// Moves a node above every other node.
    fn raise(&mut self, node: SceneNodeId);
}

/// One recorded scene call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum SceneOp {
    Create { node: SceneNodeId, surface: SurfaceHandle },
    Destroy { node: SceneNodeId },
    Position { node: SceneNodeId, x: i32, y: i32 },
    Size { node: SceneNodeId, width: i32, height: i32 },
    Visible { node: SceneNodeId, visible: bool },
    Raise { node: SceneNodeId },
}

/// State of a node in a [`HeadlessScene`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub surface: SurfaceHandle,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    nodes: HashMap<SceneNodeId, SceneNode>,
    stacking: Vec<SceneNodeId>,
    ops: Vec<SceneOp>,
    next_id: u64,
    refuse_creates: bool,
}

/// In-memory scene. Clones share the same state, so a test can keep one clone
/// for inspection while the window manager owns another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessScene {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Makes subsequent [`Scene::create_node`] calls fail (or succeed again).
    pub fn refuse_creates(&self, refuse: bool) { self.state.lock().refuse_creates = refuse; }

    /// Returns a snapshot of a node.
    #[must_use]
    pub fn node(&self, id: SceneNodeId) -> Option<SceneNode> { self.state.lock().nodes.get(&id).cloned() }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize { self.state.lock().nodes.len() }

    /// Node ids from bottom to top.
    #[must_use]
    pub fn stacking(&self) -> Vec<SceneNodeId> { self.state.lock().stacking.clone() }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> Vec<SceneOp> { self.state.lock().ops.clone() }
}

impl Scene for HeadlessScene {
    #[allow(clippy::cast_possible_truncation)]
    fn create_node(&mut self, surface: SurfaceHandle, geometry: Rect) -> Result<SceneNodeId, SceneError> {
        let mut state = self.state.lock();
        if state.refuse_creates {
            return Err(SceneError::CreateFailed(surface));
        }

        let id = SceneNodeId(state.next_id);
        state.next_id += 1;
        let (x, y, width, height) = geometry.to_pixels();
        state.nodes.insert(
            id,
            SceneNode {
                surface,
                x,
                y,
                width,
                height,
                visible: false,
            },
        );
        state.stacking.push(id);
        state.ops.push(SceneOp::Create { node: id, surface });
        Ok(id)
    }

    fn destroy_node(&mut self, node: SceneNodeId) {
        let mut state = self.state.lock();
        if state.nodes.remove(&node).is_some() {
            state.stacking.retain(|id| *id != node);
            state.ops.push(SceneOp::Destroy { node });
        }
    }

    fn set_position(&mut self, node: SceneNodeId, x: i32, y: i32) {
        let mut state = self.state.lock();
        if let Some(entry) = state.nodes.get_mut(&node) {
            entry.x = x;
            entry.y = y;
            state.ops.push(SceneOp::Position { node, x, y });
        }
    }

    fn set_size(&mut self, node: SceneNodeId, width: i32, height: i32) {
        let mut state = self.state.lock();
        if let Some(entry) = state.nodes.get_mut(&node) {
            entry.width = width;
            entry.height = height;
            state.ops.push(SceneOp::Size { node, width, height });
        }
    }

    fn set_visible(&mut self, node: SceneNodeId, visible: bool) {
        let mut state = self.state.lock();
        if let Some(entry) = state.nodes.get_mut(&node) {
            entry.visible = visible;
            state.ops.push(SceneOp::Visible { node, visible });
        }
    }

    fn raise(&mut self, node: SceneNodeId) {
        let mut state = self.state.lock();
        if state.nodes.contains_key(&node) {
            state.stacking.retain(|id| *id != node);
            state.stacking.push(node);
            state.ops.push(SceneOp::Raise { node });
        }
    }
}
