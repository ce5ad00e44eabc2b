//! The view tree.
//!
//! Views are stored in a table keyed by [`ViewId`]. A view's `superview` is a
//! back-reference into the same table; the parent's ordered `subviews` list is
//! the forward edge. Both sides are only ever changed together, by
//! [`ViewTree::add_subview`] and [`ViewTree::remove_from_superview`].
//!
//! Frames are expressed in the superview's coordinate space. Insertion order is
//! paint order: the last subview added is drawn last and therefore hit first.

use std::collections::HashMap;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::geometry::{Point, Rect};
use crate::responder::ResponderId;

/// Identifier of a view in a [`ViewTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    fn new() -> Self { Self(Uuid::now_v7()) }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { std::fmt::Display::fmt(&self.0, f) }
}

/// Subview list type alias. Most views have only a handful of children.
pub type SubviewList = SmallVec<[ViewId; 4]>;

/// Errors from editing the tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    /// The view id is not in the tree.
    #[error("unknown view {0}")]
    Unknown(ViewId),

    /// The child is the parent itself or one of its ancestors.
    #[error("view {child} cannot become a subview of its own descendant {parent}")]
    WouldCycle { parent: ViewId, child: ViewId },
}

/// Receives visible views during [`ViewTree::draw`].
///
/// Pixel composition happens behind this trait; the tree only decides what is
/// visible and where.
pub trait Painter {
    /// Paints `view` at `frame`, given in the root's coordinate space.
    fn paint(&mut self, view: ViewId, frame: Rect);
}

#[derive(Debug)]
struct ViewNode {
    superview: Option<ViewId>,
    subviews: SubviewList,
    frame: Rect,
    hidden: bool,
    responder: ResponderId,
}

/// Table of views and their parent/child relations.
#[derive(Debug, Default)]
pub struct ViewTree {
    nodes: HashMap<ViewId, ViewNode>,
}

impl ViewTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds a detached view that routes its input to `responder`.
    pub fn create(&mut self, frame: Rect, responder: ResponderId) -> ViewId {
        let id = ViewId::new();
        self.nodes.insert(
            id,
            ViewNode {
                superview: None,
                subviews: SubviewList::new(),
                frame,
                hidden: false,
                responder,
            },
        );
        id
    }

    /// Returns whether `id` is in the tree.
    #[must_use]
    pub fn contains(&self, id: ViewId) -> bool { self.nodes.contains_key(&id) }

    /// Number of views in the tree.
    #[must_use]
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Returns true if the tree has no views.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[must_use]
    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(&id).and_then(|node| node.superview)
    }

    /// Subviews of `id` in paint order. Empty for unknown ids.
    #[must_use]
    pub fn subviews(&self, id: ViewId) -> &[ViewId] {
        self.nodes.get(&id).map_or(&[] as &[ViewId], |node| node.subviews.as_slice())
    }

    #[must_use]
    pub fn frame(&self, id: ViewId) -> Option<Rect> { self.nodes.get(&id).map(|node| node.frame) }

    pub fn set_frame(&mut self, id: ViewId, frame: Rect) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.frame = frame;
        }
    }

    #[must_use]
    pub fn is_hidden(&self, id: ViewId) -> bool { self.nodes.get(&id).is_some_and(|node| node.hidden) }

    pub fn set_hidden(&mut self, id: ViewId, hidden: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.hidden = hidden;
        }
    }

    /// The responder that receives input targeted at `id`.
    #[must_use]
    pub fn responder(&self, id: ViewId) -> Option<ResponderId> {
        self.nodes.get(&id).map(|node| node.responder)
    }

    /// Returns whether `ancestor` is `id` or one of its superviews.
    #[must_use]
    pub fn is_descendant_of(&self, id: ViewId, ancestor: ViewId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.superview(current);
        }
        false
    }

    /// Appends `child` to `parent`'s subviews.
    ///
    /// A child that already has a superview is detached from it first, so it
    /// never appears in two lists. Re-adding to the same parent moves it to the
    /// front of the paint order.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Unknown`] for ids not in the tree and
    /// [`ViewError::WouldCycle`] if `parent` is `child` or lies below it. The tree
    /// is unchanged on error.
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> Result<(), ViewError> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(ViewError::Unknown(id));
            }
        }
        if self.is_descendant_of(parent, child) {
            tracing::error!(%parent, %child, "rejected cyclic subview");
            return Err(ViewError::WouldCycle { parent, child });
        }

        self.remove_from_superview(child);

        if let Some(node) = self.nodes.get_mut(&parent) {
            node.subviews.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.superview = Some(parent);
        }
        Ok(())
    }

    /// Detaches `child` from its superview. No-op without one.
    ///
    /// Returns the former superview.
    pub fn remove_from_superview(&mut self, child: ViewId) -> Option<ViewId> {
        let parent = self.nodes.get_mut(&child)?.superview.take()?;
        if let Some(node) = self.nodes.get_mut(&parent)
            && let Some(pos) = node.subviews.iter().position(|id| *id == child)
        {
            node.subviews.remove(pos);
        }
        Some(parent)
    }

    /// Removes `id` and its whole subtree from the tree.
    ///
    /// Returns the removed ids (root first) together with their responders, so
    /// the caller can release them.
    pub fn destroy(&mut self, id: ViewId) -> Vec<(ViewId, ResponderId)> {
        self.remove_from_superview(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.subviews.iter().rev().copied());
                removed.push((current, node.responder));
            }
        }
        removed
    }

    /// Visits every visible view below and including `root`.
    ///
    /// Hidden views are skipped together with their subtrees. Parents are
    /// painted before their children, siblings in insertion order.
    pub fn draw(&self, root: ViewId, painter: &mut dyn Painter) {
        self.draw_at(root, Point::default(), painter);
    }

    fn draw_at(&self, id: ViewId, origin: Point, painter: &mut dyn Painter) {
        let Some(node) = self.nodes.get(&id) else { return };
        if node.hidden {
            return;
        }

        let frame = node.frame.translate(origin.x, origin.y);
        painter.paint(id, frame);
        for child in &node.subviews {
            self.draw_at(*child, frame.origin(), painter);
        }
    }

    /// Returns the deepest visible view under `point`.
    ///
    /// `point` is in the coordinate space `root`'s frame is expressed in.
    /// Subviews are searched back to front, matching what the user sees.
    #[must_use]
    pub fn hit_test(&self, root: ViewId, point: Point) -> Option<ViewId> {
        let node = self.nodes.get(&root)?;
        if node.hidden || !node.frame.contains_point(point) {
            return None;
        }

        let local = point.offset(-node.frame.x, -node.frame.y);
        node.subviews
            .iter()
            .rev()
            .find_map(|child| self.hit_test(*child, local))
            .or(Some(root))
    }
}
