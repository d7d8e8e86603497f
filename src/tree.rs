//! Arena-based widget storage.
//!
//! The Tree owns every widget node of the GUI using a sparse-set layout with
//! generational indices:
//!
//! - **Generational Indices**: a [`WidgetId`] is an index plus a generation,
//!   so an id kept by a holder after its widget was deleted goes stale
//!   instead of silently pointing at whatever reuses the slot.
//!
//! - **Dense Storage**: nodes are stored contiguously and removed with
//!   swap-remove, the moved node's sparse entry being fixed up.
//!
//! - **Child Slots**: a node's children are an ordered list of optional
//!   slots. Slot order is the z-order as well as the focus order.
//!
//! Non-root rectangles are kept in the pixel space of their top-level
//! widget's drawing buffer, so child rectangles compose through every
//! ancestor. A top-level widget's own rectangle is always `(0, 0, w, h)`:
//! its screen position belongs to the scene.

use std::time::Duration;

use bitflags::bitflags;

use crate::altitude::{AltitudeAllocator, AltitudeChange};
use crate::compositor::CompositeStats;
use crate::config::GuiConfig;
use crate::error::{violation, Result, WidgetError};
use crate::geometry::{Color, Rect};
use crate::scene::{AnchorHandle, SceneAnchor};
use crate::surface::{PixelSurface, ResizeMode};
use crate::tooltip::TooltipSink;
use crate::widgets::{Event, Holder};

/// Unique identifier for a widget in the tree.
///
/// Uses a generational index design:
/// - `index`: position in the sparse array (reusable after removal)
/// - `generation`: version counter incremented each time the slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WidgetId {
    index: u32,
    generation: u32,
}

impl WidgetId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[cfg(test)]
    pub(crate) fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self::new(index, generation)
    }
}

bitflags! {
    /// Per-node state bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Drawing buffer changed since the node was last composited.
        const DIRTY    = 0b0001;
        /// Top-level widget shown by the scene.
        const VISIBLE  = 0b0010;
        /// Top-level widget waiting for its deletion tick.
        const DELETING = 0b0100;
        /// Root buffer changed outside a composite pass (a background was
        /// restored); the next tick must present it even if nothing is dirty.
        const PRESENT  = 0b1000;
    }
}

/// Which part of a node holds an in-progress pointer gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Capture {
    #[default]
    None,
    /// The node's own holder.
    SelfNode,
    /// The child in this slot, which forwards along its own capture.
    Child(usize),
}

/// Depth mode of a top-level widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Altitude {
    /// Floating: stacked above every other floating widget, and renumbered
    /// automatically as floating widgets open, raise and close.
    Automatic,
    /// Fixed depth inside the configured altitude domain.
    Explicit(u32),
}

/// Pixel buffers owned by a node.
pub(crate) enum Surfaces<S> {
    /// Routes coordinates and children only.
    Container,
    /// Top-level widget: its buffer is both its painting and the target
    /// every descendant is composited into.
    Root { draw: S },
    /// `draw` is painted by the holder, `save` keeps the root buffer pixels
    /// found under the node when it was composited. Both match the node's
    /// rectangle, except before the first placement: the rectangle is then
    /// empty and the buffers are 1x1 placeholders.
    Leaf { save: S, draw: S },
}

/// A widget of the tree.
pub struct WidgetNode<S: PixelSurface> {
    pub(crate) id: WidgetId,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) holder: Option<Box<dyn Holder<S>>>,
    pub(crate) tooltip: Option<String>,
    pub(crate) anchor: Option<AnchorHandle>,
    pub(crate) surfaces: Surfaces<S>,
    pub(crate) rect: Rect,
    /// Screen position of a top-level widget.
    pub(crate) origin: (i32, i32),
    pub(crate) altitude: i32,
    pub(crate) flags: NodeFlags,
    pub(crate) children: Vec<Option<WidgetId>>,
    pub(crate) focus: Option<usize>,
    pub(crate) capture: Capture,
    /// Where the node was last composited, while its background is held in
    /// the save buffer.
    pub(crate) last_composited: Option<Rect>,
}

impl<S: PixelSurface> WidgetNode<S> {
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Screen position of a top-level widget; `(0, 0)` for other widgets.
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn slots(&self) -> &[Option<WidgetId>] {
        &self.children
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn capture(&self) -> Capture {
        self.capture
    }

    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.surfaces, Surfaces::Container)
    }

    pub(crate) fn first_set_child(&self) -> Option<usize> {
        self.children.iter().position(Option::is_some)
    }

    /// Re-point focus and capture after slots were unset or dropped.
    pub(crate) fn settle_selection(&mut self) {
        if let Some(focus) = self.focus {
            if self.children.get(focus).map_or(true, Option::is_none) {
                self.focus = self.first_set_child();
            }
        }
        if let Capture::Child(slot) = self.capture {
            if self.children.get(slot).map_or(true, Option::is_none) {
                self.capture = Capture::None;
            }
        }
    }

    pub(crate) fn drawing_surface(&self) -> Option<&S> {
        match &self.surfaces {
            Surfaces::Container => None,
            Surfaces::Root { draw } | Surfaces::Leaf { draw, .. } => Some(draw),
        }
    }
}

/// Entry in the sparse map. The generation outlives the node so a reused
/// slot always gets a newer one.
struct SparseEntry {
    dense_index: Option<usize>,
    generation: u32,
}

/// The widget tree: arena, altitude bookkeeping and the link to the scene.
///
/// Event routing lives in [`router`](crate::router), compositing in
/// [`compositor`](crate::compositor).
pub struct Tree<S: PixelSurface> {
    dense: Vec<WidgetNode<S>>,
    sparse: Vec<SparseEntry>,
    free_indices: Vec<u32>,
    config: GuiConfig,
    pub(crate) altitudes: AltitudeAllocator,
    pub(crate) anchor: Box<dyn SceneAnchor<S>>,
    pub(crate) tooltip: Option<Box<dyn TooltipSink>>,
    pub(crate) stats: CompositeStats,
    /// Widgets deleted while their holder was out; the holder receives
    /// [`Event::Delete`] once its callback returns.
    pub(crate) late_deletes: Vec<WidgetId>,
}

impl<S: PixelSurface> Tree<S> {
    pub fn new(config: GuiConfig, anchor: impl SceneAnchor<S> + 'static) -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            altitudes: AltitudeAllocator::new(config.first_floating_level()),
            config,
            anchor: Box::new(anchor),
            tooltip: None,
            stats: CompositeStats::default(),
            late_deletes: Vec::new(),
        }
    }

    /// Send hover reports to `sink`.
    pub fn with_tooltip(mut self, sink: impl TooltipSink + 'static) -> Self {
        self.tooltip = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    /// Create a widget.
    ///
    /// Without a parent the widget is top-level: it gets a placeholder
    /// drawing buffer attached to the scene at the lowest altitude, and
    /// fades in. Top-level widgets always own a buffer, so `container` is
    /// ignored for them.
    ///
    /// With a parent the widget waits, with 1x1 placeholder buffers, until
    /// the parent puts it in one of its slots with [`Tree::set_child`].
    pub fn create(
        &mut self,
        parent: Option<WidgetId>,
        holder: Box<dyn Holder<S>>,
        tooltip: Option<&str>,
        container: bool,
    ) -> Result<WidgetId> {
        if let Some(parent) = parent {
            self.index_of(parent)?;
        }

        let id = self.allocate_id();
        let mut node = WidgetNode {
            id,
            parent,
            holder: Some(holder),
            tooltip: tooltip.map(str::to_owned),
            anchor: None,
            surfaces: Surfaces::Container,
            // Flat until placed, so the first `set_child` gives it the
            // whole parent.
            rect: Rect::new(0, 0, 0, 0),
            origin: (0, 0),
            altitude: 0,
            flags: NodeFlags::empty(),
            children: Vec::new(),
            focus: None,
            capture: Capture::None,
            last_composited: None,
        };

        if parent.is_some() {
            if !container {
                let mut draw = S::new(1, 1, true);
                draw.clear(self.config.clear_color);
                node.surfaces = Surfaces::Leaf {
                    save: S::new(1, 1, false),
                    draw,
                };
            }
        } else {
            let (width, height) = self.config.root_placeholder;
            let mut draw = S::new(width, height, true);
            draw.clear(self.config.clear_color);

            let handle = self.anchor.attach(id, &draw);
            self.anchor.set_altitude(handle, self.config.lowest_altitude);
            self.anchor
                .set_tint(handle, Color::rgba(255, 255, 255, 0), Duration::ZERO);
            self.anchor.set_tint(handle, Color::WHITE, self.config.fade_in);

            node.anchor = Some(handle);
            node.surfaces = Surfaces::Root { draw };
            node.rect = Rect::from_size(width, height);
            node.altitude = self.config.lowest_altitude as i32;
            node.flags = NodeFlags::VISIBLE | NodeFlags::DIRTY;
            log::debug!("top-level widget {:?} attached as {:?}", id, handle);
        }

        let dense_index = self.dense.len();
        self.dense.push(node);
        self.sparse[id.index as usize].dense_index = Some(dense_index);
        Ok(id)
    }

    /// Delete a widget.
    ///
    /// A child widget is deleted right away: [`Event::Delete`] is routed to
    /// it, its holder lets go, and it leaves its parent's slot. Its own
    /// children are not deleted; that is their holders' business. A holder
    /// that deletes its own widget from one of its callbacks gets
    /// [`Event::Delete`] once that callback returns.
    ///
    /// A top-level widget is only scheduled: the scene delivers
    /// [`Event::Delete`] on a later tick, which frees it.
    pub fn delete(&mut self, id: WidgetId) -> Result<()> {
        let index = self.index_of(id)?;
        if self.dense[index].parent.is_some() {
            self.dispatch(id, &Event::Delete);
            return Ok(());
        }

        let node = &mut self.dense[index];
        if node.flags.contains(NodeFlags::DELETING) {
            return Err(violation(WidgetError::AlreadyDeleting(id)));
        }
        node.flags.insert(NodeFlags::DELETING);
        if let Some(handle) = node.anchor {
            self.anchor.detach(handle);
        }
        log::debug!("top-level widget {:?} scheduled for deletion", id);
        Ok(())
    }

    /// Free a widget whose holder has already seen [`Event::Delete`].
    pub(crate) fn destroy(&mut self, id: WidgetId) {
        let Some(index) = self.dense_index(id) else {
            return;
        };

        match self.dense[index].parent {
            None => {
                let changes = self.altitudes.release(id);
                self.apply_altitude_changes(&changes);
                let node = &self.dense[index];
                if !node.flags.contains(NodeFlags::DELETING) {
                    if let Some(handle) = node.anchor {
                        self.anchor.detach(handle);
                    }
                }
                log::debug!("top-level widget {:?} deleted", id);
            }
            Some(parent) => match self.slot_of(parent, id) {
                Some(slot) => self.clear_slot(parent, slot),
                None => self.restore_subtree(id),
            },
        }

        self.remove(id);
    }

    /// Resize the child slot list, keeping the slots that still fit.
    pub fn set_child_count(&mut self, id: WidgetId, count: usize) -> Result<()> {
        let index = self.index_of(id)?;
        let dropped: Vec<WidgetId> = self.dense[index]
            .children
            .iter()
            .skip(count)
            .flatten()
            .copied()
            .collect();
        for child in dropped.into_iter().rev() {
            self.restore_subtree(child);
        }

        let node = &mut self.dense[index];
        node.children.resize(count, None);
        node.settle_selection();
        Ok(())
    }

    /// Put `child` (created with `id` as parent) in slot `index`, or empty
    /// the slot with `None`.
    ///
    /// The child keeps the part of its current rectangle that falls inside
    /// the parent, or takes the whole parent when nothing does, and always
    /// receives a [`Event::Resize`]. The first child set while no child
    /// has focus gets it.
    pub fn set_child(&mut self, id: WidgetId, index: usize, child: Option<WidgetId>) -> Result<()> {
        let parent_index = self.index_of(id)?;
        let count = self.dense[parent_index].children.len();
        if index >= count {
            return Err(violation(WidgetError::SlotOutOfRange {
                widget: id,
                index,
                count,
            }));
        }

        let Some(child) = child else {
            self.clear_slot(id, index);
            return Ok(());
        };

        let child_index = self.index_of(child)?;
        let child_parent = self.dense[child_index].parent;
        if child_parent != Some(id) {
            return Err(violation(WidgetError::ParentMismatch {
                child,
                expected: child_parent,
                actual: id,
            }));
        }

        if let Some(previous) = self.dense[parent_index].children[index] {
            if previous != child {
                self.clear_slot(id, index);
            }
        }
        if let Some(other) = self.slot_of(id, child) {
            if other != index {
                self.clear_slot(id, other);
            }
        }

        let (parent_rect, child_rect) = match (self.node(id), self.node(child)) {
            (Some(parent), Some(child)) => (parent.rect, child.rect),
            _ => return Ok(()),
        };
        let rect = fit_inside(child_rect, parent_rect);
        self.assign_rect(child, rect);

        if let Some(parent) = self.node_mut(id) {
            parent.children[index] = Some(child);
            if parent.focus.is_none() {
                parent.focus = Some(index);
            }
        }
        // Leaves that left the root buffer come back even at an unchanged
        // rectangle.
        for widget in self.subtree(child) {
            if let Some(node) = self.node_mut(widget) {
                if matches!(node.surfaces, Surfaces::Leaf { .. }) && node.last_composited.is_none() {
                    node.flags.insert(NodeFlags::DIRTY);
                }
            }
        }

        self.dispatch(
            child,
            &Event::Resize {
                width: rect.width,
                height: rect.height,
            },
        );
        Ok(())
    }

    /// Place the child in slot `index`.
    ///
    /// `rect` is relative to the parent's rectangle. It is clipped to the
    /// parent; a rectangle with nothing left inside the parent is replaced
    /// by the whole parent rectangle. The child receives a
    /// [`Event::Resize`] when its size changed.
    pub fn set_child_rect(&mut self, id: WidgetId, index: usize, rect: Rect) -> Result<()> {
        let child = self.slot(id, index)?;
        let Some(parent) = self.node(id) else {
            return Ok(());
        };

        let parent_rect = parent.rect;
        let rect = if parent.is_root() {
            rect
        } else {
            rect.offset(parent_rect.x, parent_rect.y)
        };
        let rect = fit_inside(rect, parent_rect);

        if self.assign_rect(child, rect) {
            self.dispatch(
                child,
                &Event::Resize {
                    width: rect.width,
                    height: rect.height,
                },
            );
        }
        Ok(())
    }

    /// Set the depth mode and the screen rectangle of a top-level widget.
    ///
    /// A size change reallocates (and clears) the drawing buffer, hands it
    /// to the scene again and delivers [`Event::Resize`].
    pub fn set_top_level(&mut self, id: WidgetId, altitude: Altitude, rect: Rect) -> Result<()> {
        self.set_altitude(id, altitude)?;
        if self.place_root(id, rect) {
            let (width, height) = self.node(id).map(|n| n.rect.size()).unwrap_or_default();
            self.dispatch(id, &Event::Resize { width, height });
        }
        Ok(())
    }

    /// Change the depth mode of a top-level widget.
    ///
    /// Leaving the floating set closes the gap: floating widgets opened
    /// after this one move down one level.
    pub fn set_altitude(&mut self, id: WidgetId, altitude: Altitude) -> Result<()> {
        let index = self.top_level_index(id)?;
        let handle = self.dense[index].anchor;

        match altitude {
            Altitude::Explicit(value) => {
                let (lowest, highest) = (self.config.lowest_altitude, self.config.highest_altitude);
                if value < lowest || value > highest {
                    return Err(violation(WidgetError::AltitudeOutOfRange {
                        altitude: value,
                        lowest,
                        highest,
                    }));
                }
                let changes = self.altitudes.release(id);
                self.dense[index].altitude = value as i32;
                if let Some(handle) = handle {
                    self.anchor.set_altitude(handle, value);
                }
                self.apply_altitude_changes(&changes);
            }
            Altitude::Automatic => {
                if self.altitudes.is_floating(id) {
                    return Ok(());
                }
                let level = self.altitudes.request_automatic(id);
                self.dense[index].altitude = level;
                if let Some(handle) = handle {
                    self.anchor.set_altitude(handle, level.unsigned_abs());
                }
            }
        }
        Ok(())
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        let index = self.top_level_index(id)?;
        let node = &mut self.dense[index];
        node.flags.set(NodeFlags::VISIBLE, visible);
        if let Some(handle) = node.anchor {
            self.anchor.set_visible(handle, visible);
        }
        Ok(())
    }

    /// Check if a widget exists.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn widget_count(&self) -> usize {
        self.dense.len()
    }

    pub fn node(&self, id: WidgetId) -> Option<&WidgetNode<S>> {
        self.dense_index(id).map(|i| &self.dense[i])
    }

    pub fn rect(&self, id: WidgetId) -> Option<Rect> {
        self.node(id).map(WidgetNode::rect)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id).and_then(WidgetNode::parent)
    }

    /// Set children, in slot order.
    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.node(id)
            .map(|n| n.children.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    pub fn child(&self, id: WidgetId, index: usize) -> Option<WidgetId> {
        self.node(id)
            .and_then(|n| n.children.get(index).copied())
            .flatten()
    }

    /// Number of slots, set or not.
    pub fn child_count(&self, id: WidgetId) -> usize {
        self.node(id).map_or(0, |n| n.children.len())
    }

    pub fn focus(&self, id: WidgetId) -> Option<usize> {
        self.node(id).and_then(WidgetNode::focus)
    }

    pub fn capture(&self, id: WidgetId) -> Capture {
        self.node(id).map(WidgetNode::capture).unwrap_or_default()
    }

    pub fn altitude(&self, id: WidgetId) -> Option<i32> {
        self.node(id)
            .filter(|n| n.is_root())
            .map(WidgetNode::altitude)
    }

    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.node(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::DIRTY))
    }

    pub fn is_root(&self, id: WidgetId) -> bool {
        self.node(id).is_some_and(WidgetNode::is_root)
    }

    pub fn is_container(&self, id: WidgetId) -> bool {
        self.node(id).is_some_and(WidgetNode::is_container)
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.node(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::VISIBLE))
    }

    pub fn tooltip(&self, id: WidgetId) -> Option<&str> {
        self.node(id).and_then(WidgetNode::tooltip)
    }

    pub fn anchor(&self, id: WidgetId) -> Option<AnchorHandle> {
        self.node(id).and_then(|n| n.anchor)
    }

    /// The buffer the widget's holder paints into.
    pub fn drawing_surface(&self, id: WidgetId) -> Option<&S> {
        self.node(id).and_then(WidgetNode::drawing_surface)
    }

    /// Mutable drawing buffer. Call [`Tree::mark_dirty`] after painting.
    pub fn drawing_surface_mut(&mut self, id: WidgetId) -> Option<&mut S> {
        match &mut self.node_mut(id)?.surfaces {
            Surfaces::Container => None,
            Surfaces::Root { draw } | Surfaces::Leaf { draw, .. } => Some(draw),
        }
    }

    /// Top-level widgets, including those waiting for their deletion tick.
    pub fn roots(&self) -> Vec<WidgetId> {
        self.dense
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.id)
            .collect()
    }

    /// Top-level widget a widget is drawn into, if every ancestor is alive.
    pub(crate) fn root_of(&self, id: WidgetId) -> Option<WidgetId> {
        let mut current = id;
        loop {
            match self.node(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode<S>> {
        let index = self.dense_index(id)?;
        Some(&mut self.dense[index])
    }

    /// Dense index of a live widget, or a logged [`WidgetError::UnknownWidget`].
    pub(crate) fn index_of(&self, id: WidgetId) -> Result<usize> {
        self.dense_index(id)
            .ok_or_else(|| violation(WidgetError::UnknownWidget(id)))
    }

    fn top_level_index(&self, id: WidgetId) -> Result<usize> {
        let index = self.index_of(id)?;
        if self.dense[index].is_root() {
            Ok(index)
        } else {
            Err(violation(WidgetError::NotTopLevel(id)))
        }
    }

    /// The child set in slot `index` of `id`.
    pub(crate) fn slot(&self, id: WidgetId, index: usize) -> Result<WidgetId> {
        let node = &self.dense[self.index_of(id)?];
        match node.children.get(index) {
            Some(Some(child)) => Ok(*child),
            Some(None) => Err(violation(WidgetError::EmptySlot { widget: id, index })),
            None => Err(violation(WidgetError::SlotOutOfRange {
                widget: id,
                index,
                count: node.children.len(),
            })),
        }
    }

    pub(crate) fn slot_of(&self, parent: WidgetId, child: WidgetId) -> Option<usize> {
        self.node(parent)?
            .children
            .iter()
            .position(|c| *c == Some(child))
    }

    /// Empty a slot: the child's subtree leaves the root buffer, focus and
    /// capture stop pointing at it.
    pub(crate) fn clear_slot(&mut self, parent: WidgetId, index: usize) {
        let Some(child) = self.child(parent, index) else {
            return;
        };
        self.restore_subtree(child);
        if let Some(node) = self.node_mut(parent) {
            node.children[index] = None;
            node.settle_selection();
        }
    }

    /// Give a non-root widget a new rectangle; returns whether its size
    /// changed.
    ///
    /// A leaf gives back the background under its previous rectangle first,
    /// and is marked dirty so it is composited again at the new place.
    pub(crate) fn assign_rect(&mut self, id: WidgetId, rect: Rect) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if node.rect == rect {
            return false;
        }
        if matches!(node.surfaces, Surfaces::Leaf { .. }) {
            self.restore_background(id);
        }

        let clear_color = self.config.clear_color;
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let resized = node.rect.size() != rect.size();
        node.rect = rect;
        if let Surfaces::Leaf { save, draw } = &mut node.surfaces {
            if resized {
                save.resize(rect.width, rect.height, ResizeMode::Discard);
                draw.resize(rect.width, rect.height, ResizeMode::Discard);
                draw.clear(clear_color);
            }
            node.flags.insert(NodeFlags::DIRTY);
        }
        resized
    }

    /// Move and size a top-level widget on screen; returns whether its size
    /// changed. Sizes are at least 1x1.
    fn place_root(&mut self, id: WidgetId, rect: Rect) -> bool {
        let clear_color = self.config.clear_color;
        let Some(index) = self.dense_index(id) else {
            return false;
        };

        let (width, height) = (rect.width.max(1), rect.height.max(1));
        let node = &mut self.dense[index];
        node.origin = (rect.x, rect.y);
        let resized = node.rect.size() != (width, height);
        if resized {
            node.rect = Rect::from_size(width, height);
            if let Surfaces::Root { draw } = &mut node.surfaces {
                draw.resize(width, height, ResizeMode::Discard);
                draw.clear(clear_color);
            }
            node.flags.insert(NodeFlags::DIRTY);
        }

        if let Some(handle) = self.dense[index].anchor {
            self.anchor.set_position(handle, rect.x, rect.y);
            if resized {
                if let Surfaces::Root { draw } = &self.dense[index].surfaces {
                    self.anchor.relink(handle, draw);
                }
            }
        }
        if resized {
            // Saved backgrounds refer to the discarded buffer.
            for descendant in self.subtree(id) {
                if let Some(node) = self.node_mut(descendant) {
                    node.last_composited = None;
                }
            }
        }
        resized
    }

    /// `id` and its set descendants, parents before children, in slot order.
    pub(crate) fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            order.push(current);
            stack.extend(node.children.iter().rev().flatten().copied());
        }
        order
    }

    pub(crate) fn apply_altitude_changes(&mut self, changes: &[AltitudeChange]) {
        for change in changes {
            let Some(index) = self.dense_index(change.widget) else {
                continue;
            };
            self.dense[index].altitude = change.altitude;
            if let Some(handle) = self.dense[index].anchor {
                self.anchor.set_altitude(handle, change.depth());
            }
        }
    }

    /// Run `f` with the holder of `id` taken out of its node.
    ///
    /// Returns `None` for an unknown widget, or when the holder is already
    /// out because `f` would re-enter a callback of the same widget.
    pub(crate) fn with_holder<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Holder<S>, &mut Self) -> R,
    ) -> Option<R> {
        let index = self.dense_index(id)?;
        let mut holder = self.dense[index].holder.take()?;

        let result = f(&mut *holder, self);

        match self.dense_index(id) {
            Some(index) => {
                self.dense[index].holder.get_or_insert(holder);
            }
            // Deleted by its own callback.
            None => {
                if let Some(pos) = self.late_deletes.iter().position(|&w| w == id) {
                    self.late_deletes.swap_remove(pos);
                    holder.on_down(self, id, &Event::Delete);
                }
            }
        }
        Some(result)
    }

    /// Get the dense array index for a WidgetId, validating generation.
    fn dense_index(&self, id: WidgetId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.dense_index)
    }

    fn allocate_id(&mut self) -> WidgetId {
        match self.free_indices.pop() {
            Some(index) => {
                let entry = &mut self.sparse[index as usize];
                entry.generation = entry.generation.wrapping_add(1);
                WidgetId::new(index, entry.generation)
            }
            None => {
                let index = self.sparse.len() as u32;
                self.sparse.push(SparseEntry {
                    dense_index: None,
                    generation: 0,
                });
                WidgetId::new(index, 0)
            }
        }
    }

    /// Drop a node from the arena with swap-remove.
    fn remove(&mut self, id: WidgetId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };

        let removed = self.dense.swap_remove(dense_index);
        if let Some(moved) = self.dense.get(dense_index) {
            self.sparse[moved.id.index as usize].dense_index = Some(dense_index);
        }
        self.sparse[id.index as usize].dense_index = None;
        self.free_indices.push(id.index);

        drop(removed);
    }
}

/// `rect` clipped to `parent`, or all of `parent` when nothing is left.
fn fit_inside(rect: Rect, parent: Rect) -> Rect {
    let clipped = rect.clip(&parent);
    if clipped.is_empty() {
        parent
    } else {
        clipped
    }
}
